//! Rounding the corners of an authored polyline with tangent-arc-tangent fillets.

use serde::{Deserialize, Serialize};

use geom::{Distance, Fillet, PolyLine, Pt2D, NEAR_COLINEAR_DEGREES};

use crate::spec::ValidRoad;
use crate::{Config, RoadSpecID, Site, Warning};

/// The inside curb of a fillet follows a circle of radius `radius - half_width`. Any tighter and
/// the curb would fold over itself.
pub const MIN_INNER_CURB_RADIUS: Distance = Distance::const_meters(0.1);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Centerline {
    pub road: RoadSpecID,
    /// The whole sampled centerline. Starts and ends exactly at the authored endpoints.
    pub pts: PolyLine,
    pub arcs: Vec<CenterlineArc>,
    /// Authored indices of the vertices left sharp. The centerline is split into separate
    /// segments at these.
    pub sharp_corners: Vec<usize>,
    /// `pts` split at every sharp corner
    pub runs: Vec<PolyLine>,
}

/// One corner replaced by an arc.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CenterlineArc {
    /// Authored index of the vertex
    pub vertex: usize,
    pub fillet: Fillet,
    pub requested_radius: Distance,
    /// True if the radius was shrunk to fit between the neighboring vertices
    pub reduced: bool,
}

enum Corner {
    Straight,
    Sharp,
    Arc(CenterlineArc),
}

pub fn make_centerline(
    road: &ValidRoad,
    cfg: &Config,
    warnings: &mut Vec<Warning>,
) -> Option<Centerline> {
    let pts = &road.points;
    let mut arcs = Vec::new();
    let mut sharp_corners = Vec::new();
    let mut all_pts = vec![pts[0]];
    let mut runs: Vec<Vec<Pt2D>> = vec![vec![pts[0]]];

    for i in 1..pts.len() - 1 {
        match corner_at(road, i, warnings) {
            Corner::Straight => {
                all_pts.push(pts[i]);
                runs.last_mut().unwrap().push(pts[i]);
            }
            Corner::Sharp => {
                all_pts.push(pts[i]);
                runs.last_mut().unwrap().push(pts[i]);
                runs.push(vec![pts[i]]);
                sharp_corners.push(road.authored_idx[i]);
            }
            Corner::Arc(arc) => {
                let samples = arc
                    .fillet
                    .sample(cfg.max_sample_spacing, cfg.max_chord_error);
                all_pts.extend(samples.clone());
                runs.last_mut().unwrap().extend(samples);
                arcs.push(arc);
            }
        }
    }
    let last = *pts.last().unwrap();
    all_pts.push(last);
    runs.last_mut().unwrap().push(last);

    let site = Site::Road(road.id);
    let pts = match PolyLine::deduping_new(all_pts) {
        Ok(pl) => pl,
        Err(err) => {
            warnings.push(Warning::degenerate(
                site,
                format!("centerline collapsed: {}", err),
            ));
            return None;
        }
    };
    let mut run_polylines = Vec::new();
    for run in runs {
        match PolyLine::deduping_new(run) {
            Ok(pl) => run_polylines.push(pl),
            Err(err) => {
                warnings.push(Warning::degenerate(
                    site,
                    format!("part of the centerline collapsed: {}", err),
                ));
            }
        }
    }

    Some(Centerline {
        road: road.id,
        pts,
        arcs,
        sharp_corners,
        runs: run_polylines,
    })
}

fn corner_at(road: &ValidRoad, i: usize, warnings: &mut Vec<Warning>) -> Corner {
    let prev = road.points[i - 1];
    let pt = road.points[i];
    let next = road.points[i + 1];
    let incoming = prev.angle_to(pt);
    let outgoing = pt.angle_to(next);
    let turn = incoming.shortest_rotation_towards(outgoing).signed_degrees();
    if turn.abs() < NEAR_COLINEAR_DEGREES {
        return Corner::Straight;
    }

    let requested = road.radii[i];
    if requested == Distance::ZERO {
        return Corner::Sharp;
    }
    let vertex = road.authored_idx[i];
    let site = Site::Road(road.id);
    if turn.abs() > 180.0 - NEAR_COLINEAR_DEGREES {
        warnings.push(Warning::degenerate(
            site,
            format!("point {} doubles back on itself; leaving it sharp", vertex),
        ));
        return Corner::Sharp;
    }

    // Each neighboring corner may use up to half of the edge they share
    let max_tangent = prev.dist_to(pt).min(pt.dist_to(next)) / 2.0;
    let mut radius = requested;
    let mut reduced = false;
    if Fillet::tangent_length(incoming, outgoing, requested) > max_tangent {
        radius = Fillet::radius_for_tangent_length(incoming, outgoing, max_tangent);
        reduced = true;
    }

    let min_radius = road.half_width + MIN_INNER_CURB_RADIUS;
    if radius < min_radius {
        warnings.push(Warning::degenerate(
            site,
            format!(
                "radius {} at point {} would pinch the inside curb (needs at least {}); leaving \
                 it sharp",
                radius, vertex, min_radius
            ),
        ));
        return Corner::Sharp;
    }

    match Fillet::new(pt, incoming, outgoing, radius) {
        Some(fillet) => Corner::Arc(CenterlineArc {
            vertex,
            fillet,
            requested_radius: requested,
            reduced,
        }),
        None => Corner::Sharp,
    }
}
