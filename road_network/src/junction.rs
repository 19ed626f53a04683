//! Building the footprint of every node. This happens in two passes. The first works from the
//! untrimmed candidate pieces and decides how each corner is rounded and how much further each
//! mouth has to be cut back to make room. Then the pieces are built, and the second pass walks
//! the final piece ends to produce the footprint, so the two always share exact points.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use abstutil::wraparound_get;
use geom::{
    Angle, Distance, Fillet, InfiniteLine, Polygon, Pt2D, Ring, EPSILON_DIST,
    NEAR_COLINEAR_DEGREES,
};

use crate::corners::{CornerCondition, ResolveCorner, ResolvedCorner};
use crate::nodes::NodeShell;
use crate::trim::Interval;
use crate::{
    Config, CornerKind, JunctionCorner, JunctionSurface, Mouth, NodeID, Piece, PieceID, Segment,
    SegmentEnd, SegmentID, Site, Warning,
};

/// A piece end, seen from the node.
#[derive(Clone, Debug)]
struct MouthGeom {
    mouth: Mouth,
    /// Pointing away from the node, along the road
    outward: Angle,
    half_width: Distance,
    /// The curb points, as seen facing outward
    left: Pt2D,
    right: Pt2D,
    /// How much further this end may be cut back
    budget: Distance,
}

/// What the first pass decided for one corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedCorner {
    pub node: NodeID,
    /// Counter-clockwise: the corner runs from the left curb of the first face to the right curb
    /// of the second
    pub faces: (usize, usize),
    pub apex: Pt2D,
    pub requested: Distance,
    pub resolved: ResolvedCorner,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CornerPlan {
    pub node: NodeID,
    /// Faces, counter-clockwise around the node
    pub order: Vec<usize>,
    pub corners: BTreeMap<(usize, usize), PlannedCorner>,
    /// How much more to cut off each piece end, beyond the crossing trim
    pub extra_trim: BTreeMap<(PieceID, SegmentEnd), Distance>,
    pub warnings: Vec<Warning>,
}

/// The untrimmed pieces, before any junction has claimed part of them.
pub struct Candidates<'a> {
    pub segments: &'a BTreeMap<SegmentID, Segment>,
    pub kept: &'a BTreeMap<SegmentID, Vec<Interval>>,
    /// Every piece end opening into any node
    pub mouths: BTreeSet<(PieceID, SegmentEnd)>,
}

impl MouthGeom {
    fn midpoint(&self) -> Pt2D {
        Pt2D::new(
            (self.left.x() + self.right.x()) / 2.0,
            (self.left.y() + self.right.y()) / 2.0,
        )
    }
}

impl<'a> Candidates<'a> {
    fn mouth_geom(&self, mouth: &Mouth, cfg: &Config) -> Option<MouthGeom> {
        let segment = self.segments.get(&mouth.piece.segment)?;
        let range = self.kept.get(&mouth.piece.segment)?.get(mouth.piece.idx)?;
        let (t, other_end) = match mouth.end {
            SegmentEnd::Start => (range.start, SegmentEnd::End),
            SegmentEnd::End => (range.end, SegmentEnd::Start),
        };
        let (pt, angle) = segment.center.dist_along(segment.dist_at(t)).ok()?;

        let piece_length = segment.dist_at(range.end) - segment.dist_at(range.start);
        let mut budget = (piece_length - cfg.min_kept_piece_length).max(Distance::ZERO);
        if self.mouths.contains(&(mouth.piece, other_end)) {
            budget = budget / 2.0;
        }

        let outward = match mouth.end {
            SegmentEnd::Start => angle,
            SegmentEnd::End => angle.opposite(),
        };
        Some(MouthGeom {
            mouth: *mouth,
            outward,
            half_width: segment.half_width,
            left: pt.project_away(segment.half_width, outward.rotate_degs(90.0)),
            right: pt.project_away(segment.half_width, outward.rotate_degs(-90.0)),
            budget,
        })
    }
}

/// The first pass over one node.
pub fn plan_corners(
    shell: &NodeShell,
    candidates: &Candidates,
    cfg: &Config,
    strategy: &dyn ResolveCorner,
) -> CornerPlan {
    let mut mouths: Vec<MouthGeom> = shell
        .mouths
        .iter()
        .filter_map(|m| candidates.mouth_geom(m, cfg))
        .collect();
    sort_ccw(&mut mouths);

    let mut plan = CornerPlan {
        node: shell.id,
        order: mouths.iter().map(|m| m.mouth.face).collect(),
        corners: BTreeMap::new(),
        extra_trim: BTreeMap::new(),
        warnings: Vec::new(),
    };
    if mouths.len() < 2 {
        return plan;
    }

    for k in 0..mouths.len() {
        let a = &mouths[k];
        let b = wraparound_get(&mouths, (k as isize) + 1);
        let (apex, dist_a, dist_b) = match curb_apex(a, b) {
            Some(x) => x,
            None => continue,
        };

        let requested =
            Fillet::tangent_length(a.outward.opposite(), b.outward, cfg.junction_fillet_radius);
        let resolved = strategy.resolve(
            &condition(a, dist_a, requested),
            &condition(b, dist_b, requested),
        );
        if resolved.infeasible {
            plan.warnings.push(Warning::InfeasibleCorner {
                node: shell.id,
                faces: (resolved.faces[0].face, resolved.faces[1].face),
            });
        }

        // The fillet only ever uses the smaller of the two offsets, so neither face needs to
        // be cut back past it
        let shared = resolved.shared_offset();
        for (m, dist) in [(a, dist_a), (b, dist_b)] {
            let offset = resolved
                .offset(m.mouth.face)
                .unwrap_or(Distance::ZERO)
                .min(shared);
            if offset > dist {
                let extra = plan
                    .extra_trim
                    .entry((m.mouth.piece, m.mouth.end))
                    .or_insert(Distance::ZERO);
                *extra = (*extra).max(offset - dist);
            }
        }

        plan.corners.insert(
            (a.mouth.face, b.mouth.face),
            PlannedCorner {
                node: shell.id,
                faces: (a.mouth.face, b.mouth.face),
                apex,
                requested,
                resolved,
            },
        );
    }
    plan
}

fn condition(m: &MouthGeom, dist: Distance, requested: Distance) -> CornerCondition {
    CornerCondition {
        face: m.mouth.face,
        direction: m.outward,
        half_width: m.half_width,
        requested_offset: requested,
        max_offset: dist + m.budget,
    }
}

// Counter-clockwise from east, by the angle from the middle of all the mouths to the middle of
// each one. Parallel mouths, like both carriageways of a divided road, point the same way but
// still sit at different angles from the center. Exact ties go to the lower face.
fn sort_ccw(mouths: &mut [MouthGeom]) {
    let midpoints: Vec<Pt2D> = mouths.iter().map(|m| m.midpoint()).collect();
    let center = match Pt2D::center(&midpoints) {
        Some(pt) => pt,
        None => return,
    };
    mouths.sort_by(|a, b| {
        center
            .angle_to(a.midpoint())
            .normalized_degrees()
            .total_cmp(&center.angle_to(b.midpoint()).normalized_degrees())
            .then(a.mouth.face.cmp(&b.mouth.face))
    });
}

/// Where the left curb of one mouth meets the right curb of the next one counter-clockwise, and
/// how far behind each mouth that is. None when the curbs are parallel or meet out along one of
/// the roads; the corner is then joined straight across.
fn curb_apex(a: &MouthGeom, b: &MouthGeom) -> Option<(Pt2D, Distance, Distance)> {
    if a.outward.approx_parallel(b.outward, NEAR_COLINEAR_DEGREES) {
        return None;
    }
    let apex = InfiniteLine::from_pt_angle(a.left, a.outward)
        .intersection(&InfiniteLine::from_pt_angle(b.right, b.outward))?;
    let along_a = a.left.dist_along_direction(a.outward, apex);
    let along_b = b.right.dist_along_direction(b.outward, apex);
    let slack = EPSILON_DIST.inner_meters();
    if along_a > slack || along_b > slack {
        return None;
    }
    Some((
        apex,
        Distance::meters((-along_a).max(0.0)),
        Distance::meters((-along_b).max(0.0)),
    ))
}

/// The output of the second pass over one node.
pub struct BuiltJunction {
    /// Only the mouths whose piece survived, counter-clockwise
    pub mouths: Vec<Mouth>,
    pub surface: Option<JunctionSurface>,
    pub warnings: Vec<Warning>,
}

// What to try, in order, until the footprint is a simple ring
#[derive(Clone, Copy, PartialEq)]
enum Attempt {
    Full,
    WithoutFillets,
    WithoutApexes,
}

/// The second pass over one node, walking the final piece ends.
pub fn build_surface(
    shell: &NodeShell,
    plan: &CornerPlan,
    pieces: &BTreeMap<PieceID, Piece>,
    cfg: &Config,
) -> BuiltJunction {
    let mut warnings = Vec::new();
    let site = Site::Node(shell.id);

    let mut mouths: Vec<MouthGeom> = Vec::new();
    for face in &plan.order {
        if let Some(m) = shell.mouths.iter().find(|m| m.face == *face) {
            if let Some(piece) = pieces.get(&m.piece) {
                mouths.push(final_mouth_geom(m, piece));
            }
        }
    }
    let result_mouths: Vec<Mouth> = mouths.iter().map(|m| m.mouth).collect();
    if mouths.len() < 2 {
        warnings.push(Warning::degenerate(
            site,
            format!(
                "only {} road end(s) survived trimming, so there's no junction footprint",
                mouths.len()
            ),
        ));
        return BuiltJunction {
            mouths: result_mouths,
            surface: None,
            warnings,
        };
    }

    let mut corners = Vec::new();
    let mut arcs: Vec<Option<Vec<Pt2D>>> = Vec::new();
    for k in 0..mouths.len() {
        let a = &mouths[k];
        let b = wraparound_get(&mouths, (k as isize) + 1);
        let planned = plan.corners.get(&(a.mouth.face, b.mouth.face));
        let resolved = planned.map(|p| p.resolved.clone());

        let (apex, dist_a, dist_b) = match curb_apex(a, b) {
            Some(x) => x,
            None => {
                corners.push(JunctionCorner {
                    apex: None,
                    kind: CornerKind::Straight,
                    resolved,
                });
                arcs.push(None);
                continue;
            }
        };
        let tangent_length = planned
            .map(|p| p.resolved.shared_offset())
            .unwrap_or(Distance::ZERO)
            .min(dist_a)
            .min(dist_b);
        let fillet = if tangent_length > EPSILON_DIST {
            Fillet::with_tangent_length(apex, a.outward.opposite(), b.outward, tangent_length)
        } else {
            None
        };
        match fillet {
            Some(fillet) => {
                corners.push(JunctionCorner {
                    apex: Some(apex),
                    kind: CornerKind::Filleted {
                        radius: fillet.radius,
                        tangent_length,
                        center: fillet.center,
                    },
                    resolved,
                });
                arcs.push(Some(
                    fillet.sample(cfg.max_sample_spacing, cfg.max_chord_error),
                ));
            }
            None => {
                corners.push(JunctionCorner {
                    apex: Some(apex),
                    kind: CornerKind::Sharp,
                    resolved,
                });
                arcs.push(None);
            }
        }
    }

    for attempt in [
        Attempt::Full,
        Attempt::WithoutFillets,
        Attempt::WithoutApexes,
    ] {
        if attempt == Attempt::WithoutFillets && arcs.iter().all(|a| a.is_none()) {
            continue;
        }
        if attempt == Attempt::WithoutApexes && corners.iter().all(|c| c.apex.is_none()) {
            continue;
        }
        if let Some(polygon) = try_ring(walk(&mouths, &corners, &arcs, attempt)) {
            if attempt != Attempt::Full {
                simplify_corners(&mut corners, attempt);
            }
            return BuiltJunction {
                mouths: result_mouths,
                surface: Some(JunctionSurface { polygon, corners }),
                warnings,
            };
        }
        warnings.push(Warning::degenerate(site, failure_message(attempt)));
    }

    let mouth_pts: Vec<Pt2D> = mouths.iter().flat_map(|m| [m.right, m.left]).collect();
    let surface = match Polygon::convex_hull(&mouth_pts) {
        Ok(polygon) => {
            simplify_corners(&mut corners, Attempt::WithoutApexes);
            Some(JunctionSurface { polygon, corners })
        }
        Err(err) => {
            warnings.push(Warning::degenerate(
                site,
                format!("even the convex hull of the road ends failed: {}", err),
            ));
            None
        }
    };
    BuiltJunction {
        mouths: result_mouths,
        surface,
        warnings,
    }
}

// Polygons sharing an edge still report a sliver of overlap after rounding
const OVERLAP_AREA: f64 = 1e-3;

/// Cuts away any part of a footprint covering a Piece or a footprint built before it. A
/// footprint walked from its own mouths only shares edges with its neighbors and is left alone,
/// so this only changes the convex hull fallback and rings that cut across some unrelated road.
/// Nodes are handled in order, so the outcome doesn't depend on threading.
pub fn clip_overlaps(
    shells: &[NodeShell],
    built: &mut [BuiltJunction],
    pieces: &BTreeMap<PieceID, Piece>,
) {
    let mut done: Vec<Polygon> = Vec::new();
    for (shell, junction) in shells.iter().zip(built.iter_mut()) {
        let surface = match junction.surface.take() {
            Some(surface) => surface,
            None => continue,
        };

        let mut polygon = Some(surface.polygon.clone());
        let mut clipped = false;
        for obstacle in pieces.values().map(|p| &p.polygon).chain(done.iter()) {
            let current = match polygon {
                Some(ref p) => p,
                None => break,
            };
            if !current.get_bounds().overlaps(&obstacle.get_bounds())
                || current.intersection_area(obstacle) < OVERLAP_AREA
            {
                continue;
            }
            clipped = true;
            polygon = current
                .difference(obstacle)
                .into_iter()
                .max_by(|a, b| a.area().total_cmp(&b.area()));
        }

        if !clipped {
            done.push(surface.polygon.clone());
            junction.surface = Some(surface);
            continue;
        }
        let site = Site::Node(shell.id);
        match polygon.and_then(|p| try_ring(p.into_points())) {
            Some(polygon) => {
                junction.warnings.push(Warning::degenerate(
                    site,
                    "the footprint covered another road or junction, so it was cut back",
                ));
                // The corners no longer describe the footprint
                let mut corners = surface.corners;
                simplify_corners(&mut corners, Attempt::WithoutApexes);
                done.push(polygon.clone());
                junction.surface = Some(JunctionSurface { polygon, corners });
            }
            None => {
                junction.warnings.push(Warning::degenerate(
                    site,
                    "the footprint covered another road or junction, and nothing usable was left \
                     after cutting it back",
                ));
            }
        }
    }
}

fn final_mouth_geom(mouth: &Mouth, piece: &Piece) -> MouthGeom {
    // The curb points come straight from the piece, so the footprint shares them exactly
    let half_width = piece.left.first_pt().dist_to(piece.right.first_pt()) / 2.0;
    match mouth.end {
        SegmentEnd::Start => MouthGeom {
            mouth: *mouth,
            outward: piece.center.first_line().angle(),
            half_width,
            left: piece.left.first_pt(),
            right: piece.right.first_pt(),
            budget: Distance::ZERO,
        },
        // Facing back along the road, the piece's left curb is on the right
        SegmentEnd::End => MouthGeom {
            mouth: *mouth,
            outward: piece.center.last_line().angle().opposite(),
            half_width,
            left: piece.right.last_pt(),
            right: piece.left.last_pt(),
            budget: Distance::ZERO,
        },
    }
}

fn walk(
    mouths: &[MouthGeom],
    corners: &[JunctionCorner],
    arcs: &[Option<Vec<Pt2D>>],
    attempt: Attempt,
) -> Vec<Pt2D> {
    let mut pts = Vec::new();
    for ((m, corner), arc) in mouths.iter().zip(corners).zip(arcs) {
        pts.push(m.right);
        pts.push(m.left);
        match (attempt, arc, corner.apex) {
            (Attempt::Full, Some(arc), _) => pts.extend(arc.iter().cloned()),
            (Attempt::Full, None, Some(apex)) | (Attempt::WithoutFillets, _, Some(apex)) => {
                pts.push(apex)
            }
            _ => {}
        }
    }
    pts
}

fn try_ring(pts: Vec<Pt2D>) -> Option<Polygon> {
    let ring = Ring::deduping_new(pts).ok()?;
    if ring.is_simple() {
        Some(ring.into_polygon())
    } else {
        None
    }
}

fn simplify_corners(corners: &mut [JunctionCorner], attempt: Attempt) {
    for corner in corners {
        match attempt {
            Attempt::Full => {}
            Attempt::WithoutFillets => {
                if corner.apex.is_some() {
                    corner.kind = CornerKind::Sharp;
                }
            }
            Attempt::WithoutApexes => {
                corner.kind = CornerKind::Straight;
            }
        }
    }
}

fn failure_message(attempt: Attempt) -> &'static str {
    match attempt {
        Attempt::Full => "the rounded footprint isn't simple; trying sharp corners",
        Attempt::WithoutFillets => "the footprint with sharp corners isn't simple; trying \
                                    without corners",
        Attempt::WithoutApexes => "the footprint without corners isn't simple; using the \
                                   convex hull of the road ends",
    }
}
