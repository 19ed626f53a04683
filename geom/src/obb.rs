use serde::{Deserialize, Serialize};

use crate::{Angle, Bounds, Distance, Line, Polygon, Pt2D, Ring};

/// A rectangle aligned to some direction instead of the world axes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Pt2D,
    pub angle: Angle,
    pub half_length: Distance,
    pub half_width: Distance,
}

impl OrientedBox {
    /// The strip covering a line, thickened by `half_width` on each side.
    pub fn from_line(line: &Line, half_width: Distance) -> OrientedBox {
        OrientedBox {
            center: line.middle(),
            angle: line.angle(),
            half_length: line.length() / 2.0,
            half_width,
        }
    }

    /// Grows the box on every side.
    pub fn expanded(&self, margin: Distance) -> OrientedBox {
        OrientedBox {
            center: self.center,
            angle: self.angle,
            half_length: self.half_length + margin,
            half_width: self.half_width + margin,
        }
    }

    /// Counter-clockwise, starting from the back-right corner.
    pub fn corners(&self) -> [Pt2D; 4] {
        let (ux, uy) = self.angle.unit_vector();
        let (vx, vy) = (-uy, ux);
        let hl = self.half_length.inner_meters();
        let hw = self.half_width.inner_meters();
        let c = self.center;
        let corner = |along: f64, side: f64| {
            Pt2D::new(
                c.x() + ux * along + vx * side,
                c.y() + uy * along + vy * side,
            )
        };
        [
            corner(-hl, -hw),
            corner(hl, -hw),
            corner(hl, hw),
            corner(-hl, hw),
        ]
    }

    /// How far along the box's direction, from its back edge, a point projects.
    pub fn project(&self, pt: Pt2D) -> f64 {
        self.center.dist_along_direction(self.angle, pt) + self.half_length.inner_meters()
    }

    /// The largest gap between the two boxes over the four candidate separating axes. Positive
    /// means the boxes are apart by at least that much; zero or negative means they overlap
    /// (the magnitude is the shallowest penetration depth).
    pub fn separation(&self, other: &OrientedBox) -> f64 {
        let mine = self.corners();
        let theirs = other.corners();
        let mut best = f64::MIN;
        for angle in [
            self.angle,
            self.angle.rotate_degs(90.0),
            other.angle,
            other.angle.rotate_degs(90.0),
        ] {
            let (min1, max1) = project_all(&mine, angle);
            let (min2, max2) = project_all(&theirs, angle);
            let gap = (min2 - max1).max(min1 - max2);
            best = best.max(gap);
        }
        best
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.corners())
    }

    pub fn to_polygon(&self) -> Polygon {
        let mut pts = self.corners().to_vec();
        pts.push(pts[0]);
        match Ring::new(pts.clone()) {
            Ok(ring) => ring.into_polygon(),
            Err(_) => Polygon::buggy_new(pts),
        }
    }
}

fn project_all(pts: &[Pt2D], axis: Angle) -> (f64, f64) {
    let (ux, uy) = axis.unit_vector();
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for pt in pts {
        let proj = pt.x() * ux + pt.y() * uy;
        min = min.min(proj);
        max = max.max(proj);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(x1: f64, y1: f64, x2: f64, y2: f64, half_width: f64) -> OrientedBox {
        OrientedBox::from_line(
            &Line::must_new(Pt2D::new(x1, y1), Pt2D::new(x2, y2)),
            Distance::meters(half_width),
        )
    }

    #[test]
    fn sat() {
        let horizontal = strip(0.0, 0.0, 20.0, 0.0, 2.0);
        let vertical = strip(10.0, -10.0, 10.0, 10.0, 2.0);
        assert!(horizontal.separation(&vertical) < 0.0);

        // Parallel strips 5m apart between centerlines, each 2m half-wide: a 1m gap
        let parallel = strip(0.0, 5.0, 20.0, 5.0, 2.0);
        assert!((horizontal.separation(&parallel) - 1.0).abs() < 1e-6);

        // A diagonal strip whose AABB overlaps the horizontal one, but the box doesn't
        let diagonal = strip(15.0, 10.0, 30.0, -5.0, 0.5);
        assert!(horizontal.separation(&diagonal) > 0.0);
        assert!(horizontal.get_bounds().overlaps(&diagonal.get_bounds()));
    }

    #[test]
    fn corners_and_projection() {
        let s = strip(0.0, 0.0, 10.0, 0.0, 1.0);
        assert_eq!(
            s.corners(),
            [
                Pt2D::new(0.0, -1.0),
                Pt2D::new(10.0, -1.0),
                Pt2D::new(10.0, 1.0),
                Pt2D::new(0.0, 1.0)
            ]
        );
        assert!((s.project(Pt2D::new(3.0, 0.7)) - 3.0).abs() < 1e-9);
        assert!((s.to_polygon().area() - 20.0).abs() < 1e-6);
    }
}
