//! The authored input, and checking it before anything is built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use geom::{Distance, Pt2D, EPSILON_DIST};

use crate::{Config, RoadSpecID, Site, Warning};

pub const MAX_LANES_PER_DIRECTION: i32 = 5;
/// Points farther than this from the origin along either axis, in meters, are skipped. Distances
/// between anything inside this box stay finite.
pub const MAX_COORDINATE: f64 = 1.0e7;

/// One road as drawn by the user. This is the only persisted input; everything else is derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSpec {
    /// The authored control points, in world-space meters.
    pub points: Vec<Pt2D>,
    /// Signed, so that malformed editor input is reported instead of failing to parse
    pub lanes_forward: i32,
    pub lanes_backward: i32,
    /// The fillet radius for every interior vertex without an override.
    #[serde(default)]
    pub default_radius: Distance,
    /// Keyed by the index of the authored point.
    #[serde(default)]
    pub point_radius_overrides: BTreeMap<usize, Distance>,
}

impl RoadSpec {
    pub fn new(points: Vec<Pt2D>, lanes_forward: i32, lanes_backward: i32) -> RoadSpec {
        RoadSpec {
            points,
            lanes_forward,
            lanes_backward,
            default_radius: Distance::ZERO,
            point_radius_overrides: BTreeMap::new(),
        }
    }

    pub fn with_default_radius(mut self, radius: Distance) -> RoadSpec {
        self.default_radius = radius;
        self
    }

    pub fn with_radius_override(mut self, idx: usize, radius: Distance) -> RoadSpec {
        self.point_radius_overrides.insert(idx, radius);
        self
    }

    /// Problems that exclude this spec from a rebuild entirely.
    pub fn find_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.points.len() < 2 {
            problems.push(format!(
                "needs at least 2 points, but has {}",
                self.points.len()
            ));
        }
        for (name, count) in [
            ("lanes_forward", self.lanes_forward),
            ("lanes_backward", self.lanes_backward),
        ] {
            if !(0..=MAX_LANES_PER_DIRECTION).contains(&count) {
                problems.push(format!(
                    "{} is {}, but must be between 0 and {}",
                    name, count, MAX_LANES_PER_DIRECTION
                ));
            }
        }
        if self.lanes_forward == 0 && self.lanes_backward == 0 {
            problems.push("has no lanes in either direction".to_string());
        }
        problems
    }
}

/// A RoadSpec that passed ingestion. Unusable points have been removed; each remaining point
/// remembers its authored index and carries its effective fillet radius.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidRoad {
    pub id: RoadSpecID,
    pub points: Vec<Pt2D>,
    pub authored_idx: Vec<usize>,
    /// Per point. Always zero for the two endpoints.
    pub radii: Vec<Distance>,
    pub lanes_forward: usize,
    pub lanes_backward: usize,
    pub half_width: Distance,
}

/// Validates every spec independently. Invalid ones are reported and skipped; the rest still
/// build.
pub fn ingest(specs: &[RoadSpec], cfg: &Config) -> (Vec<ValidRoad>, Vec<Warning>) {
    let mut roads = Vec::new();
    let mut warnings = Vec::new();
    for (idx, spec) in specs.iter().enumerate() {
        let id = RoadSpecID(idx);
        let problems = spec.find_problems();
        if !problems.is_empty() {
            warnings.push(Warning::invalid(id, problems.join("; ")));
            continue;
        }
        if let Some(road) = ingest_one(id, spec, cfg, &mut warnings) {
            roads.push(road);
        }
    }
    (roads, warnings)
}

/// Everything ingestion would complain about, without building anything.
pub fn validate_specs(specs: &[RoadSpec], cfg: &Config) -> Vec<Warning> {
    ingest(specs, cfg).1
}

fn ingest_one(
    id: RoadSpecID,
    spec: &RoadSpec,
    cfg: &Config,
    warnings: &mut Vec<Warning>,
) -> Option<ValidRoad> {
    let site = Site::Road(id);
    let last_authored = spec.points.len() - 1;

    // (authored index, point)
    let mut kept: Vec<(usize, Pt2D)> = Vec::new();
    for (idx, pt) in spec.points.iter().enumerate() {
        if !pt.is_finite() {
            warnings.push(Warning::degenerate(
                site,
                format!("point {} isn't finite, skipping it", idx),
            ));
            continue;
        }
        if pt.x().abs() > MAX_COORDINATE || pt.y().abs() > MAX_COORDINATE {
            warnings.push(Warning::degenerate(
                site,
                format!(
                    "point {} is more than {}m from the origin, skipping it",
                    idx, MAX_COORDINATE
                ),
            ));
            continue;
        }
        if let Some((_, prev)) = kept.last() {
            if prev.dist_to(*pt) < EPSILON_DIST {
                warnings.push(Warning::degenerate(
                    site,
                    format!("point {} repeats the previous point, skipping it", idx),
                ));
                // Keep the authored endpoint exactly, in favor of a repeated interior point
                if idx == last_authored && kept.len() > 1 {
                    kept.pop();
                    kept.push((idx, *pt));
                }
                continue;
            }
        }
        kept.push((idx, *pt));
    }
    if kept.len() < 2 {
        warnings.push(Warning::degenerate(
            site,
            "fewer than 2 usable points remain, skipping the road",
        ));
        return None;
    }

    for idx in spec.point_radius_overrides.keys() {
        let usable = kept[1..kept.len() - 1].iter().any(|(i, _)| i == idx);
        if !usable {
            warnings.push(Warning::degenerate(
                site,
                format!(
                    "radius override for point {} doesn't name a usable interior point",
                    idx
                ),
            ));
        }
    }

    let mut radii = Vec::new();
    for (pos, (idx, _)) in kept.iter().enumerate() {
        if pos == 0 || pos == kept.len() - 1 {
            radii.push(Distance::ZERO);
            continue;
        }
        let radius = spec
            .point_radius_overrides
            .get(idx)
            .cloned()
            .unwrap_or(spec.default_radius);
        if radius < Distance::ZERO {
            warnings.push(Warning::degenerate(
                site,
                format!("radius {} at point {} is negative, using 0", radius, idx),
            ));
            radii.push(Distance::ZERO);
        } else {
            radii.push(radius);
        }
    }

    // find_problems already checked the range
    let lanes_forward = spec.lanes_forward as usize;
    let lanes_backward = spec.lanes_backward as usize;
    let half_width = cfg.lane_width * ((lanes_forward + lanes_backward) as f64) / 2.0;

    let (authored_idx, points) = kept.into_iter().unzip();
    Some(ValidRoad {
        id,
        points,
        authored_idx,
        radii,
        lanes_forward,
        lanes_backward,
        half_width,
    })
}
