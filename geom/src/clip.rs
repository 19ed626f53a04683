//! Plain routines on open vertex lists (the first point is NOT repeated at the end), used where
//! building a validated `Ring` would be wasteful: strip overlap polygons are tiny, convex, and
//! thrown away right after being measured.

use crate::Pt2D;

/// Shoelace formula. Positive for counter-clockwise vertex lists.
pub fn signed_area(pts: &[Pt2D]) -> f64 {
    let mut sum = 0.0;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        sum += a.x() * b.y() - b.x() * a.y();
    }
    sum / 2.0
}

/// The area-weighted centroid of a polygon. Returns None when the area is (nearly) zero.
pub fn polygon_centroid(pts: &[Pt2D]) -> Option<Pt2D> {
    let area = signed_area(pts);
    if area.abs() < 1e-12 {
        return None;
    }
    // Relative to the first point, to keep precision for polygons far from the origin
    let origin = pts[0];
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..pts.len() {
        let (ax, ay) = (pts[i].x() - origin.x(), pts[i].y() - origin.y());
        let b = pts[(i + 1) % pts.len()];
        let (bx, by) = (b.x() - origin.x(), b.y() - origin.y());
        let cross = ax * by - bx * ay;
        cx += (ax + bx) * cross;
        cy += (ay + by) * cross;
    }
    let factor = 1.0 / (6.0 * area);
    Some(Pt2D::new(
        origin.x() + cx * factor,
        origin.y() + cy * factor,
    ))
}

/// Sutherland-Hodgman: clips `subject` against the convex polygon `clip`. Either may be wound
/// either way. The result is empty when they don't overlap.
pub fn clip_convex(subject: &[Pt2D], clip: &[Pt2D]) -> Vec<Pt2D> {
    if subject.len() < 3 || clip.len() < 3 {
        return Vec::new();
    }
    let mut clip = clip.to_vec();
    if signed_area(&clip) < 0.0 {
        clip.reverse();
    }

    let mut output = subject.to_vec();
    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);

        for j in 0..input.len() {
            let current = input[j];
            let prev = input[(j + input.len() - 1) % input.len()];
            let current_inside = side(a, b, current) >= 0.0;
            let prev_inside = side(a, b, prev) >= 0.0;

            if current_inside {
                if !prev_inside {
                    output.push(edge_crossing(a, b, prev, current));
                }
                output.push(current);
            } else if prev_inside {
                output.push(edge_crossing(a, b, prev, current));
            }
        }
    }

    output.dedup();
    while output.len() > 1 && output[0] == *output.last().unwrap() {
        output.pop();
    }
    if output.len() < 3 {
        return Vec::new();
    }
    output
}

// Positive when pt is left of the directed line a -> b.
fn side(a: Pt2D, b: Pt2D, pt: Pt2D) -> f64 {
    (b.x() - a.x()) * (pt.y() - a.y()) - (b.y() - a.y()) * (pt.x() - a.x())
}

// Where the segment p1 -> p2 crosses the infinite line a -> b. Only called when p1 and p2 sit on
// different sides, so the denominator can't vanish.
fn edge_crossing(a: Pt2D, b: Pt2D, p1: Pt2D, p2: Pt2D) -> Pt2D {
    let s1 = side(a, b, p1);
    let s2 = side(a, b, p2);
    let t = s1 / (s1 - s2);
    Pt2D::new(
        p1.x() + t * (p2.x() - p1.x()),
        p1.y() + t * (p2.y() - p1.y()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Pt2D> {
        vec![
            Pt2D::new(x, y),
            Pt2D::new(x + size, y),
            Pt2D::new(x + size, y + size),
            Pt2D::new(x, y + size),
        ]
    }

    #[test]
    fn overlapping_squares() {
        let a = square(0.0, 0.0, 10.0);
        let mut b = square(5.0, 5.0, 10.0);
        // Winding of the clip polygon doesn't matter
        b.reverse();
        let result = clip_convex(&a, &b);
        assert!((signed_area(&result).abs() - 25.0).abs() < 1e-9);
        assert_eq!(polygon_centroid(&result), Some(Pt2D::new(7.5, 7.5)));
    }

    #[test]
    fn disjoint() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(3.0, 0.0, 1.0);
        assert!(clip_convex(&a, &b).is_empty());
        assert_eq!(polygon_centroid(&[]), None);
    }
}
