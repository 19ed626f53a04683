use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt2D, EPSILON_DIST};

/// A line segment.
#[derive(PartialEq, Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Creates a line segment between two points, which must not be the same
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Result<Line> {
        if pt1.raw_dist_to(pt2) < EPSILON_DIST.inner_meters() {
            bail!("Line from {:?} to {:?} too small", pt1, pt2);
        }
        Ok(Line(pt1, pt2))
    }

    /// Equivalent to `Line::new(pt1, pt2).unwrap()`. Use this to effectively document an
    /// assertion at the call-site.
    pub fn must_new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line::new(pt1, pt2).unwrap()
    }

    /// Returns an infinite line passing through this line's two points.
    pub fn infinite(&self) -> InfiniteLine {
        InfiniteLine(self.0, self.1)
    }

    /// Returns the first point in this line segment.
    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    /// Returns the second point in this line segment.
    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    /// Returns the two points in this line segment.
    pub fn points(&self) -> Vec<Pt2D> {
        vec![self.0, self.1]
    }

    /// Returns the length of this line segment.
    pub fn length(&self) -> Distance {
        self.pt1().dist_to(self.pt2())
    }

    /// Returns the angle of this line segment.
    pub fn angle(&self) -> Angle {
        self.pt1().angle_to(self.pt2())
    }

    /// Flips the order of points in this line.
    pub fn reversed(&self) -> Line {
        Line(self.pt2(), self.pt1())
    }

    /// Shifts this line segment to the left, preserving its direction. Left means
    /// counter-clockwise from the line's direction.
    pub fn shift_left(&self, width: Distance) -> Line {
        self.shift_either_direction(width)
    }

    pub fn shift_right(&self, width: Distance) -> Line {
        self.shift_either_direction(-width)
    }

    /// Shifts to the left for positive widths, right for negative.
    pub fn shift_either_direction(&self, width: Distance) -> Line {
        let angle = self.angle().rotate_degs(90.0);
        Line(
            self.pt1().project_away(width, angle),
            self.pt2().project_away(width, angle),
        )
    }

    /// Returns the point where this line segment intersects another, if any. Touching at an
    /// endpoint counts. For colinear overlapping segments, returns one of the shared endpoints.
    pub fn intersection(&self, other: &Line) -> Option<Pt2D> {
        if !self.intersects(other) {
            return None;
        }
        if let Some(pt) = self.infinite().intersection(&other.infinite()) {
            return Some(pt);
        }
        // Colinear and overlapping
        for pt in [other.pt1(), other.pt2(), self.pt1(), self.pt2()] {
            if self.contains_colinear_pt(pt) && other.contains_colinear_pt(pt) {
                return Some(pt);
            }
        }
        None
    }

    /// True if the two segments share any point. Touching counts.
    pub fn intersects(&self, other: &Line) -> bool {
        let o1 = orientation(self.pt1(), self.pt2(), other.pt1());
        let o2 = orientation(self.pt1(), self.pt2(), other.pt2());
        let o3 = orientation(other.pt1(), other.pt2(), self.pt1());
        let o4 = orientation(other.pt1(), other.pt2(), self.pt2());

        if o1 * o2 < 0 && o3 * o4 < 0 {
            return true;
        }
        (o1 == 0 && self.contains_colinear_pt(other.pt1()))
            || (o2 == 0 && self.contains_colinear_pt(other.pt2()))
            || (o3 == 0 && other.contains_colinear_pt(self.pt1()))
            || (o4 == 0 && other.contains_colinear_pt(self.pt2()))
    }

    /// True only if the interiors of the two segments cross; touching at endpoints or running
    /// along each other doesn't count.
    pub fn crosses(&self, other: &Line) -> bool {
        let o1 = orientation(self.pt1(), self.pt2(), other.pt1());
        let o2 = orientation(self.pt1(), self.pt2(), other.pt2());
        let o3 = orientation(other.pt1(), other.pt2(), self.pt1());
        let o4 = orientation(other.pt1(), other.pt2(), self.pt2());
        o1 * o2 < 0 && o3 * o4 < 0
    }

    fn contains_colinear_pt(&self, pt: Pt2D) -> bool {
        pt.x() >= self.pt1().x().min(self.pt2().x())
            && pt.x() <= self.pt1().x().max(self.pt2().x())
            && pt.y() >= self.pt1().y().min(self.pt2().y())
            && pt.y() <= self.pt1().y().max(self.pt2().y())
    }

    /// Returns a point along the line segment, unless the distance exceeds the segment's
    /// length.
    pub fn dist_along(&self, dist: Distance) -> Result<Pt2D> {
        let len = self.length();
        if dist < Distance::ZERO || dist > len {
            bail!("dist_along {} is out of bounds for {}", dist, self);
        }
        Ok(self.unbounded_dist_along(dist))
    }

    /// Returns a point along the infinite line, possibly beyond either end.
    pub fn unbounded_dist_along(&self, dist: Distance) -> Pt2D {
        let len = self.length();
        let percent = dist / len;
        self.unbounded_percent_along(percent)
    }

    fn unbounded_percent_along(&self, percent: f64) -> Pt2D {
        Pt2D::new(
            self.pt1().x() + percent * (self.pt2().x() - self.pt1().x()),
            self.pt1().y() + percent * (self.pt2().y() - self.pt1().y()),
        )
    }

    /// Returns the midpoint of the segment.
    pub fn middle(&self) -> Pt2D {
        self.unbounded_percent_along(0.5)
    }

    /// Projects a point onto the line segment's direction, returning how far along from `pt1`
    /// it lands. May be negative or exceed the length.
    pub fn project_dist(&self, pt: Pt2D) -> f64 {
        self.pt1().dist_along_direction(self.angle(), pt)
    }

    /// The shortest distance from the point to any part of the segment.
    pub fn dist_to_pt(&self, pt: Pt2D) -> Distance {
        let along = self
            .project_dist(pt)
            .clamp(0.0, self.length().inner_meters());
        let closest = self.pt1().project_away(Distance::meters(along), self.angle());
        closest.dist_to(pt)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Line::new(")?;
        writeln!(f, "  Pt2D::new({}, {}),", self.0.x(), self.0.y())?;
        writeln!(f, "  Pt2D::new({}, {}),", self.1.x(), self.1.y())?;
        write!(f, ")")
    }
}

/// An infinite line through two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfiniteLine(Pt2D, Pt2D);

impl InfiniteLine {
    /// Creates an infinite line through a point, pointing some direction.
    pub fn from_pt_angle(pt: Pt2D, angle: Angle) -> InfiniteLine {
        InfiniteLine(pt, pt.project_away(Distance::meters(1.0), angle))
    }

    /// Fails for parallel lines.
    // https://stackoverflow.com/a/565282 by way of
    // https://github.com/ucarion/line_intersection/blob/master/src/lib.rs
    pub fn intersection(&self, other: &InfiniteLine) -> Option<Pt2D> {
        #![allow(clippy::suspicious_operation_groupings)]
        let p = self.0;
        let q = other.0;
        let r_x = self.1.x() - self.0.x();
        let r_y = self.1.y() - self.0.y();
        let s_x = other.1.x() - other.0.x();
        let s_y = other.1.y() - other.0.y();

        let r_cross_s = r_x * s_y - r_y * s_x;
        let r_len = (r_x * r_x + r_y * r_y).sqrt();
        let s_len = (s_x * s_x + s_y * s_y).sqrt();
        // Near-parallel lines put the intersection absurdly far away
        if r_cross_s.abs() <= 1e-9 * r_len * s_len {
            return None;
        }

        let q_minus_p_x = q.x() - p.x();
        let q_minus_p_y = q.y() - p.y();
        let t = (q_minus_p_x * s_y - q_minus_p_y * s_x) / r_cross_s;
        let pt = Pt2D::new(p.x() + t * r_x, p.y() + t * r_y);
        if pt.is_finite() {
            Some(pt)
        } else {
            None
        }
    }
}

/// Sign of the turn a -> b -> c: 1 for left, -1 for right, 0 for (nearly) colinear.
pub(crate) fn orientation(a: Pt2D, b: Pt2D, c: Pt2D) -> i8 {
    let cross = (b.x() - a.x()) * (c.y() - a.y()) - (b.y() - a.y()) * (c.x() - a.x());
    if cross.abs() < 1e-10 {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_intersection() {
        let l1 = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        let l2 = Line::must_new(Pt2D::new(5.0, -5.0), Pt2D::new(5.0, 5.0));
        assert_eq!(l1.intersection(&l2), Some(Pt2D::new(5.0, 0.0)));
        assert!(l1.crosses(&l2));

        // Touching at an endpoint intersects, but doesn't cross
        let l3 = Line::must_new(Pt2D::new(10.0, 0.0), Pt2D::new(10.0, 5.0));
        assert!(l1.intersects(&l3));
        assert!(!l1.crosses(&l3));

        let l4 = Line::must_new(Pt2D::new(0.0, 1.0), Pt2D::new(10.0, 1.0));
        assert_eq!(l1.intersection(&l4), None);
        assert!(l1.infinite().intersection(&l4.infinite()).is_none());
    }

    #[test]
    fn shifting() {
        let l = Line::must_new(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0));
        let left = l.shift_left(Distance::meters(2.0));
        assert!(left.pt1().approx_eq(Pt2D::new(0.0, 2.0), EPSILON_DIST));
        let right = l.shift_right(Distance::meters(2.0));
        assert!(right.pt2().approx_eq(Pt2D::new(10.0, -2.0), EPSILON_DIST));
        assert_eq!(l.dist_to_pt(Pt2D::new(12.0, 0.0)), Distance::meters(2.0));
    }
}
