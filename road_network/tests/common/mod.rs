use geom::{Angle, Distance, Polygon, Pt2D, EPSILON_DIST};
use road_network::{CornerKind, Mouth, RoadNetworkResult, SegmentEnd};

// Shared edges still report a sliver of overlap after rounding every point
const SLIVER_AREA: f64 = 0.05;

/// Every Piece and junction footprint, labelled for failure messages.
pub fn all_surfaces(result: &RoadNetworkResult) -> Vec<(String, Polygon)> {
    let mut polygons: Vec<(String, Polygon)> = result
        .all_pieces()
        .map(|p| (p.id.to_string(), p.polygon.clone()))
        .collect();
    for node in result.nodes.values() {
        if let Some(ref surface) = node.surface {
            polygons.push((node.id.to_string(), surface.polygon.clone()));
        }
    }
    polygons
}

pub fn assert_no_overlaps(result: &RoadNetworkResult) {
    let polygons = all_surfaces(result);
    for (i, (name1, p1)) in polygons.iter().enumerate() {
        for (name2, p2) in &polygons[i + 1..] {
            if !p1.get_bounds().overlaps(&p2.get_bounds()) {
                continue;
            }
            let area = p1.intersection_area(p2);
            assert!(area < SLIVER_AREA, "{} and {} overlap by {}", name1, name2, area);
        }
    }
}

// The left curb line of a mouth as seen facing out of the node, then the right one
fn curb_lines(result: &RoadNetworkResult, mouth: &Mouth) -> ((Pt2D, Angle), (Pt2D, Angle)) {
    let piece = result.piece(mouth.piece).unwrap();
    match mouth.end {
        SegmentEnd::Start => {
            let angle = piece.center.first_line().angle();
            ((piece.left.first_pt(), angle), (piece.right.first_pt(), angle))
        }
        SegmentEnd::End => {
            let angle = piece.center.last_line().angle();
            ((piece.right.last_pt(), angle), (piece.left.last_pt(), angle))
        }
    }
}

/// Each rounded junction corner is a circle touching both curbs, meeting them on the footprint
/// at `tangent_length` from the apex.
pub fn assert_fillets_are_tangent(result: &RoadNetworkResult) {
    for node in result.nodes.values() {
        let surface = match node.surface {
            Some(ref surface) => surface,
            None => continue,
        };
        for (k, corner) in surface.corners.iter().enumerate() {
            let (radius, tangent_length, center) = match corner.kind {
                CornerKind::Filleted {
                    radius,
                    tangent_length,
                    center,
                } => (radius, tangent_length, center),
                _ => continue,
            };
            let apex = corner.apex.unwrap();
            let a = curb_lines(result, &node.mouths[k]).0;
            let b = curb_lines(result, &node.mouths[(k + 1) % node.mouths.len()]).1;
            for (pt, angle) in [a, b] {
                let across = pt.dist_along_direction(angle.rotate_degs(90.0), center).abs();
                assert!(
                    (across - radius.inner_meters()).abs() < 1e-3,
                    "{} corner {}: arc is {}m from the curb, but its radius is {}",
                    node.id,
                    k,
                    across,
                    radius
                );
                let foot = pt.project_away(
                    Distance::meters(pt.dist_along_direction(angle, center)),
                    angle,
                );
                assert!((foot.dist_to(apex) - tangent_length).abs() < EPSILON_DIST);
                assert!(
                    surface
                        .polygon
                        .points()
                        .iter()
                        .any(|p| p.approx_eq(foot, EPSILON_DIST)),
                    "{} corner {}: the arc doesn't meet the curb at {}",
                    node.id,
                    k,
                    foot
                );
            }
        }
    }
}
