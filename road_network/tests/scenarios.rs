mod common;

use std::f64::consts::PI;

use geom::{Distance, Pt2D, EPSILON_DIST};
use road_network::{
    rebuild, rebuild_with_strategy, Config, CornerCondition, CornerKind, FaceOffset,
    ResolveCorner, ResolvedCorner, RoadSpec, SegmentEnd, SegmentID, Site, RoadSpecID, Warning,
};

use common::{assert_fillets_are_tangent, assert_no_overlaps};

fn road(pts: &[(f64, f64)], lanes_forward: i32, lanes_backward: i32) -> RoadSpec {
    RoadSpec::new(
        pts.iter().map(|(x, y)| Pt2D::new(*x, *y)).collect(),
        lanes_forward,
        lanes_backward,
    )
}

fn plus(lanes: i32) -> Vec<RoadSpec> {
    vec![
        road(&[(-100.0, 0.0), (100.0, 0.0)], lanes, lanes),
        road(&[(0.0, -100.0), (0.0, 100.0)], lanes, lanes),
    ]
}

fn seg(road: usize, idx: usize) -> SegmentID {
    SegmentID {
        road: RoadSpecID(road),
        idx,
    }
}

#[test]
fn right_angle_crossing() {
    let result = rebuild(&plus(2), &Config::default()).unwrap();
    assert!(result.dropped_pieces.is_empty());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.segments.len(), 2);
    for segment in result.segments.values() {
        assert_eq!(segment.pieces.len(), 2);
        // Symmetric around the crossing
        let (p1, p2) = (&segment.pieces[0], &segment.pieces[1]);
        assert!((p1.length() - p2.length()).abs() < Distance::meters(0.01));
        assert!((p1.t1 + p2.t0 - 1.0).abs() < 1e-4);
    }

    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 4);
    assert_eq!(node.segments, vec![seg(0, 0), seg(1, 0)]);
    let surface = node.surface.as_ref().unwrap();
    assert!(surface.polygon.is_simple());
    assert_eq!(surface.corners.len(), 4);
    for corner in &surface.corners {
        assert!(matches!(corner.kind, CornerKind::Filleted { .. }));
    }

    // Every piece end at the node knows about it
    for segment in result.segments.values() {
        assert_eq!(segment.pieces[0].end_node, Some(node.id));
        assert_eq!(segment.pieces[0].start_node, None);
        assert_eq!(segment.pieces[1].node(SegmentEnd::Start), Some(node.id));
    }
}

#[test]
fn degree_four_footprint() {
    let mut cfg = Config::default();
    cfg.junction_fillet_radius = Distance::meters(2.0);
    let result = rebuild(&plus(2), &cfg).unwrap();

    // The roads are 14m wide. Rounding each corner with a 2m radius pushes every mouth out to
    // 9m from the center.
    let west = &result.segments[&seg(0, 0)].pieces[0];
    assert!(west.center.last_pt().approx_eq(Pt2D::new(-9.0, 0.0), EPSILON_DIST));
    let north = &result.segments[&seg(1, 0)].pieces[1];
    assert!(north.center.first_pt().approx_eq(Pt2D::new(0.0, 9.0), EPSILON_DIST));

    let surface = result.nodes.values().next().unwrap().surface.clone().unwrap();
    for corner in &surface.corners {
        match corner.kind {
            CornerKind::Filleted {
                radius,
                tangent_length,
                ..
            } => {
                assert!((radius - Distance::meters(2.0)).abs() < EPSILON_DIST);
                assert!((tangent_length - Distance::meters(2.0)).abs() < EPSILON_DIST);
            }
            _ => panic!("corner should be rounded: {:?}", corner),
        }
    }
    // An 18m square minus the four corners cut off by the arcs
    let expected = 18.0 * 18.0 - 4.0 * (4.0 - PI);
    assert!(
        (surface.polygon.area() - expected).abs() < 1.0,
        "area {} isn't close to {}",
        surface.polygon.area(),
        expected
    );
}

#[test]
fn rounded_turn() {
    let spec = road(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)], 1, 1)
        .with_default_radius(Distance::meters(8.0));
    let result = rebuild(&[spec], &Config::default()).unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(result.nodes.is_empty());
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[&seg(0, 0)].pieces.len(), 1);

    let centerline = &result.centerlines[0];
    assert_eq!(centerline.arcs.len(), 1);
    let arc = &centerline.arcs[0];
    assert_eq!(arc.vertex, 1);
    assert!((arc.fillet.sweep().signed_degrees() - 90.0).abs() < 1e-6);
    let corner = Pt2D::new(50.0, 0.0);
    assert!((corner.dist_to(arc.fillet.tangent_in) - Distance::meters(8.0)).abs() < EPSILON_DIST);
    assert!((corner.dist_to(arc.fillet.tangent_out) - Distance::meters(8.0)).abs() < EPSILON_DIST);
}

#[test]
fn tee_junction() {
    let result = rebuild(
        &[
            road(&[(-100.0, 0.0), (100.0, 0.0)], 1, 1),
            road(&[(0.0, 0.0), (0.0, 100.0)], 1, 1),
        ],
        &Config::default(),
    )
    .unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 3);
    assert_eq!(result.segments[&seg(1, 0)].pieces.len(), 1);

    let surface = node.surface.as_ref().unwrap();
    assert!(surface.polygon.is_simple());
    let filleted = surface
        .corners
        .iter()
        .filter(|c| matches!(c.kind, CornerKind::Filleted { .. }))
        .count();
    let straight = surface
        .corners
        .iter()
        .filter(|c| c.kind == CornerKind::Straight)
        .count();
    // Two rounded corners beside the stem, and the far side of the through road stays straight
    assert_eq!(filleted, 2);
    assert_eq!(straight, 1);
}

#[test]
fn sharp_corner_becomes_a_node() {
    let result = rebuild(
        &[road(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)], 1, 1)],
        &Config::default(),
    )
    .unwrap();
    assert_eq!(result.centerlines[0].sharp_corners, vec![1]);
    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 2);
    let surface = node.surface.as_ref().unwrap();
    assert!(surface.polygon.is_simple());
    // Both the inside and the outside of the bend are rounded
    assert!(surface
        .corners
        .iter()
        .all(|c| matches!(c.kind, CornerKind::Filleted { .. })));
}

#[test]
fn clustered_crossing() {
    let mut specs = Vec::new();
    for degrees in [0.0_f64, 60.0, 120.0] {
        let (sin, cos) = degrees.to_radians().sin_cos();
        specs.push(road(
            &[(-100.0 * cos, -100.0 * sin), (100.0 * cos, 100.0 * sin)],
            1,
            1,
        ));
    }
    let result = rebuild(&specs, &Config::default()).unwrap();
    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 6);
    assert_eq!(node.segments.len(), 3);
    assert!(result
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ClusteredCrossing { .. })));
    assert!(node.surface.as_ref().unwrap().polygon.is_simple());
    assert_no_overlaps(&result);
    assert_fillets_are_tangent(&result);
}

#[test]
fn invalid_roads_are_skipped() {
    let mut specs = plus(1);
    specs.insert(1, road(&[(0.0, 0.0)], 1, 1));
    specs.push(road(&[(0.0, 0.0), (10.0, 10.0)], 0, 0));
    let result = rebuild(&specs, &Config::default()).unwrap();

    let invalid: Vec<RoadSpecID> = result
        .warnings
        .iter()
        .filter_map(|w| match w {
            Warning::InvalidRoadSpec { road, .. } => Some(*road),
            _ => None,
        })
        .collect();
    assert_eq!(invalid, vec![RoadSpecID(1), RoadSpecID(3)]);
    // The valid roads keep their ids and still build normally
    assert_eq!(
        result.segments.keys().cloned().collect::<Vec<_>>(),
        vec![seg(0, 0), seg(2, 0)]
    );
    assert_eq!(result.nodes.len(), 1);
}

#[test]
fn junctions_disabled() {
    let mut cfg = Config::default();
    cfg.junctions_enabled = false;
    let result = rebuild(&plus(1), &cfg).unwrap();
    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 4);
    assert!(node.surface.is_none());

    // Pieces stop right where the crossing trim put them
    let west = &result.segments[&seg(0, 0)].pieces[0];
    assert!(west.center.last_pt().approx_eq(Pt2D::new(-3.675, 0.0), EPSILON_DIST));
}

#[test]
fn bad_config_is_an_error() {
    let mut cfg = Config::default();
    cfg.lane_width = Distance::ZERO;
    assert!(rebuild(&plus(1), &cfg).is_err());
}

// Never gives up any length, so every corner stays sharp.
struct NeverRound;

impl ResolveCorner for NeverRound {
    fn resolve(&self, a: &CornerCondition, b: &CornerCondition) -> ResolvedCorner {
        let (a, b) = if a.face <= b.face { (a, b) } else { (b, a) };
        ResolvedCorner {
            faces: [
                FaceOffset {
                    face: a.face,
                    offset: Distance::ZERO,
                },
                FaceOffset {
                    face: b.face,
                    offset: Distance::ZERO,
                },
            ],
            winner: None,
            infeasible: false,
        }
    }
}

#[test]
fn custom_strategy() {
    let result = rebuild_with_strategy(&plus(1), &Config::default(), &NeverRound).unwrap();
    let surface = result.nodes.values().next().unwrap().surface.clone().unwrap();
    assert!(surface
        .corners
        .iter()
        .all(|c| c.kind == CornerKind::Sharp));
    // No extra trimming happened
    let west = &result.segments[&seg(0, 0)].pieces[0];
    assert!(west.center.last_pt().approx_eq(Pt2D::new(-3.675, 0.0), EPSILON_DIST));
}

#[test]
fn trace_and_meshes() {
    let mut cfg = Config::default();
    cfg.record_trace = true;
    let result = rebuild(&plus(1), &cfg).unwrap();
    let trace = result.trace.as_ref().unwrap();
    assert_eq!(trace.strips.len(), 2);
    assert_eq!(trace.crossings.len(), 1);
    assert_eq!(trace.removals.len(), 2);
    assert_eq!(trace.corners.len(), 4);
    assert_eq!(trace.polygons().len(), 3);

    for piece in result.all_pieces() {
        let mesh = piece.mesh(cfg.texture_scale);
        assert!(mesh.num_triangles() >= 2);
        for (pos, uv) in mesh.positions.iter().zip(&mesh.uvs) {
            assert_eq!(uv[0], pos[0] / cfg.texture_scale);
            assert_eq!(uv[1], pos[1] / cfg.texture_scale);
        }
    }
    let surface = result.nodes.values().next().unwrap().surface.clone().unwrap();
    let mesh = surface.mesh(cfg.texture_scale);
    assert_eq!(mesh.normals.len(), mesh.positions.len());
    assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
}

fn is_degenerate(w: &Warning) -> bool {
    matches!(w, Warning::DegenerateGeometry { .. })
}

// Two parallel carriageways along the y axis, `spacing` apart, crossed through the origin by a
// road at some angle to them.
fn divided_road(spacing: f64, degrees: f64) -> Vec<RoadSpec> {
    let (sin, cos) = (90.0 - degrees).to_radians().sin_cos();
    let half = spacing / 2.0;
    vec![
        road(&[(-half, -100.0), (-half, 100.0)], 1, 1),
        road(&[(half, -100.0), (half, 100.0)], 1, 1),
        road(&[(-100.0 * cos, -100.0 * sin), (100.0 * cos, 100.0 * sin)], 1, 1),
    ]
}

#[test]
fn divided_road_crossing() {
    // The inner curbs are only half a meter apart, so both crossings form one node
    let result = rebuild(&divided_road(7.5, 90.0), &Config::default()).unwrap();
    assert_eq!(result.nodes.len(), 1);
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 6);
    assert!(
        !result.warnings.iter().any(is_degenerate),
        "{:?}",
        result.warnings
    );
    let surface = node.surface.as_ref().unwrap();
    assert!(surface.polygon.is_simple());

    // Counter-clockwise from the east: the crossing road, then both northbound carriageways
    // from east to west
    let order: Vec<(SegmentID, SegmentEnd)> = node
        .mouths
        .iter()
        .map(|m| (m.piece.segment, m.end))
        .collect();
    assert_eq!(
        order,
        vec![
            (seg(2, 0), SegmentEnd::Start),
            (seg(1, 0), SegmentEnd::Start),
            (seg(0, 0), SegmentEnd::Start),
            (seg(2, 0), SegmentEnd::End),
            (seg(0, 0), SegmentEnd::End),
            (seg(1, 0), SegmentEnd::End),
        ]
    );
    // The carriageways are joined straight across the median
    assert_eq!(surface.corners[1].kind, CornerKind::Straight);
    assert_eq!(surface.corners[4].kind, CornerKind::Straight);

    assert_no_overlaps(&result);
    assert_fillets_are_tangent(&result);
}

#[test]
fn oblique_divided_road_crossings() {
    for spacing in [7.5, 9.0, 12.0] {
        for degrees in [30.0, 45.0, 60.0, 75.0] {
            let result = rebuild(&divided_road(spacing, degrees), &Config::default()).unwrap();
            for node in result.nodes.values() {
                if let Some(ref surface) = node.surface {
                    assert!(
                        surface.polygon.is_simple(),
                        "spacing {}, angle {}: {} isn't simple",
                        spacing,
                        degrees,
                        node.id
                    );
                }
            }
            assert_no_overlaps(&result);
            assert_fillets_are_tangent(&result);
        }
    }
}

#[test]
fn crossings_along_a_curve_keep_every_piece() {
    // A wide road bends through a 30m arc centered on (70, 30). A narrow road crosses it along a
    // radius, swept around the arc, so the trims land everywhere between the arc's samples.
    let cfg = Config::default();
    for step in 0..200 {
        let degrees = -85.0 + 0.4 * (step as f64);
        let (sin, cos) = degrees.to_radians().sin_cos();
        let specs = vec![
            road(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)], 2, 2)
                .with_default_radius(Distance::meters(30.0)),
            road(&[(70.0, 30.0), (70.0 + 60.0 * cos, 30.0 + 60.0 * sin)], 1, 1),
        ];
        let result = rebuild(&specs, &cfg).unwrap();
        for w in &result.warnings {
            if let Warning::DegenerateGeometry { problem, .. } = w {
                assert!(
                    !problem.contains("couldn't be built"),
                    "at {} degrees: {}",
                    degrees,
                    w
                );
            }
        }
        // Only slivers shorter than the minimum are ever dropped
        for dropped in &result.dropped_pieces {
            assert!(dropped.length < cfg.min_kept_piece_length);
        }
        assert_eq!(result.segments[&seg(0, 0)].pieces.len(), 2);
        assert_no_overlaps(&result);
    }
}

#[test]
fn far_away_points_are_skipped() {
    let mut specs = plus(1);
    specs.push(road(&[(0.0, 0.0), (1e200, 0.0)], 1, 1));
    specs.push(road(&[(-50.0, 50.0), (1e200, 1e200), (50.0, 50.0)], 1, 1));
    let result = rebuild(&specs, &Config::default()).unwrap();
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        Warning::DegenerateGeometry {
            site: Site::Road(RoadSpecID(2)),
            ..
        }
    )));
    // The second far road still builds from the points it has left
    assert_eq!(
        result.segments.keys().cloned().collect::<Vec<_>>(),
        vec![seg(0, 0), seg(1, 0), seg(3, 0)]
    );
    assert_eq!(road_network::validate_specs(&specs, &Config::default()).len(), 3);
}

#[test]
fn short_stem_only_trims_what_the_arc_needs() {
    // The stem keeps 2.3m past the crossing trim. Its face wins both corners, but can only give
    // up 1.5m from the apex at (3.5, +/-3.5) before dropping below the minimum piece length.
    let result = rebuild(
        &[
            road(&[(0.0, 0.0), (6.0, 0.0)], 1, 1),
            road(&[(0.0, -100.0), (0.0, 100.0)], 1, 1),
        ],
        &Config::default(),
    )
    .unwrap();
    let node = result.nodes.values().next().unwrap();
    assert_eq!(node.degree(), 3);
    let surface = node.surface.as_ref().unwrap();
    for corner in &surface.corners {
        let resolved = match corner.resolved {
            Some(ref r) => r,
            None => continue,
        };
        assert_eq!(resolved.winner, Some(1));
        assert!((resolved.shared_offset() - Distance::meters(1.5)).abs() < EPSILON_DIST);
    }

    // The through road is cut back only as far as the arc reaches, not the full 3m it was
    // offered
    let south = &result.segments[&seg(1, 0)].pieces[0];
    let north = &result.segments[&seg(1, 0)].pieces[1];
    assert!(south.center.last_pt().approx_eq(Pt2D::new(0.0, -5.0), EPSILON_DIST));
    assert!(north.center.first_pt().approx_eq(Pt2D::new(0.0, 5.0), EPSILON_DIST));
    let stem = &result.segments[&seg(0, 0)].pieces[0];
    assert!(stem.center.first_pt().approx_eq(Pt2D::new(5.0, 0.0), EPSILON_DIST));
    assert_fillets_are_tangent(&result);
}
