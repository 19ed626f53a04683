mod common;

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use geom::{Distance, Pt2D, EPSILON_DIST};
use road_network::{rebuild, Config, RoadSpec};

use common::{assert_fillets_are_tangent, assert_no_overlaps};

fn road(pts: &[(f64, f64)], lanes_forward: i32, lanes_backward: i32) -> RoadSpec {
    RoadSpec::new(
        pts.iter().map(|(x, y)| Pt2D::new(*x, *y)).collect(),
        lanes_forward,
        lanes_backward,
    )
}

/// Three horizontal and three vertical roads, 60m apart, with mixed widths.
fn grid() -> Vec<RoadSpec> {
    let mut specs = Vec::new();
    for i in 0..3 {
        let offset = 60.0 * (i as f64);
        specs.push(road(&[(-30.0, offset), (150.0, offset)], 1, 1 + i));
        specs.push(road(&[(offset, -30.0), (offset, 150.0)], 2, 1));
    }
    specs
}

fn random_network(seed: u64) -> Vec<RoadSpec> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut specs = Vec::new();
    for _ in 0..8 {
        let num_pts = rng.gen_range(2..5);
        let pts: Vec<(f64, f64)> = (0..num_pts)
            .map(|_| (rng.gen_range(0.0..300.0), rng.gen_range(0.0..300.0)))
            .collect();
        specs.push(
            road(&pts, rng.gen_range(0..3), rng.gen_range(1..3))
                .with_default_radius(Distance::meters(rng.gen_range(0.0..20.0))),
        );
    }
    specs
}

#[test]
fn deterministic() {
    for specs in [grid(), random_network(42)] {
        let cfg = Config::default();
        let first = serde_json::to_string(&rebuild(&specs, &cfg).unwrap()).unwrap();
        let second = serde_json::to_string(&rebuild(&specs, &cfg).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn parallel_matches_sequential() {
    let _ = env_logger::builder().is_test(true).try_init();
    for specs in [grid(), random_network(7)] {
        let mut cfg = Config::default();
        let sequential = rebuild(&specs, &cfg).unwrap();
        cfg.parallel = true;
        let parallel = rebuild(&specs, &cfg).unwrap();
        assert_eq!(sequential, parallel);
    }
}

#[test]
fn no_overlaps() {
    let result = rebuild(&grid(), &Config::default()).unwrap();
    assert_eq!(result.nodes.len(), 9);
    assert!(result.dropped_pieces.is_empty());
    assert_no_overlaps(&result);
    assert_fillets_are_tangent(&result);
}

#[test]
fn width_is_preserved() {
    let result = rebuild(&grid(), &Config::default()).unwrap();
    for segment in result.segments.values() {
        let width = segment.width();
        for piece in &segment.pieces {
            for (left, right) in [
                (piece.left.first_pt(), piece.right.first_pt()),
                (piece.left.last_pt(), piece.right.last_pt()),
            ] {
                assert!((left.dist_to(right) - width).abs() < EPSILON_DIST);
            }
            for pt in piece.left.points().iter().chain(piece.right.points()) {
                let dist = piece.center.dist_to_pt(*pt);
                assert!((dist - segment.half_width).abs() < EPSILON_DIST);
            }
        }
    }
}

#[test]
fn fillets_are_tangent() {
    let spec = road(
        &[(0.0, 0.0), (80.0, 0.0), (120.0, 60.0), (60.0, 120.0)],
        2,
        2,
    )
    .with_default_radius(Distance::meters(15.0))
    .with_radius_override(2, Distance::meters(25.0));
    let result = rebuild(&[spec], &Config::default()).unwrap();
    let centerline = &result.centerlines[0];
    assert_eq!(centerline.arcs.len(), 2);
    for arc in &centerline.arcs {
        let f = &arc.fillet;
        // The radius meets each line at a right angle
        assert!(f.center.dist_along_direction(f.incoming, f.tangent_in).abs() < 1e-3);
        assert!(f.center.dist_along_direction(f.outgoing, f.tangent_out).abs() < 1e-3);
        assert!(f.direction_at(0.0).approx_eq(f.incoming, 1e-3));
        assert!(f.direction_at(1.0).approx_eq(f.outgoing, 1e-3));
        // Samples stay on the circle
        let pts = f.sample(Distance::meters(1.0), Distance::meters(0.05));
        for pt in &pts {
            assert!((f.center.dist_to(*pt) - f.radius).abs() < EPSILON_DIST);
        }
        for pair in pts.windows(2) {
            assert!(pair[0].dist_to(pair[1]) <= Distance::meters(1.0) + EPSILON_DIST);
        }
    }
    assert_eq!(centerline.arcs[1].requested_radius, Distance::meters(25.0));
}

#[test]
fn random_networks() {
    for seed in 0..20 {
        let specs = random_network(seed);
        let result = rebuild(&specs, &Config::default()).unwrap();
        for piece in result.all_pieces() {
            assert!(piece
                .polygon
                .points()
                .iter()
                .all(|pt| pt.x().is_finite() && pt.y().is_finite()));
            assert!(piece.t0 < piece.t1);
            assert!(piece.length() > Distance::ZERO);
        }
        for node in result.nodes.values() {
            if let Some(ref surface) = node.surface {
                assert!(
                    surface.polygon.is_simple(),
                    "seed {}: {} isn't simple",
                    seed,
                    node.id
                );
            }
        }
        assert_no_overlaps(&result);
        assert_fillets_are_tangent(&result);
    }
}
