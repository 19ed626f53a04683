use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{trim_f64, Angle, Distance, EPSILON_DIST};

/// This represents world-space in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    /// Doesn't reject non-finite values; ingestion code checks `is_finite` and decides what to
    /// do with bad input.
    pub fn new(x: f64, y: f64) -> Pt2D {
        Pt2D {
            x: trim_f64(x),
            y: trim_f64(y),
        }
    }

    pub fn zero() -> Pt2D {
        Pt2D::new(0.0, 0.0)
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Equality within some threshold distance.
    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }

    pub fn project_away(self, dist: Distance, theta: Angle) -> Pt2D {
        let (sin, cos) = theta.normalized_radians().sin_cos();
        Pt2D::new(
            self.x() + dist.inner_meters() * cos,
            self.y() + dist.inner_meters() * sin,
        )
    }

    pub fn raw_dist_to(self, to: Pt2D) -> f64 {
        ((self.x() - to.x()).powi(2) + (self.y() - to.y()).powi(2)).sqrt()
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(self.raw_dist_to(to))
    }

    pub fn angle_to(self, to: Pt2D) -> Angle {
        Angle::new_rads((to.y() - self.y()).atan2(to.x() - self.x()))
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x() + dx, self.y() + dy)
    }

    /// How far along `theta` from this point is `other`? Negative means behind.
    pub fn dist_along_direction(self, theta: Angle, other: Pt2D) -> f64 {
        let (sin, cos) = theta.normalized_radians().sin_cos();
        (other.x() - self.x()) * cos + (other.y() - self.y()) * sin
    }

    /// The average of all the points. Returns None for an empty list.
    pub fn center(pts: &[Pt2D]) -> Option<Pt2D> {
        if pts.is_empty() {
            return None;
        }
        let mut x = 0.0;
        let mut y = 0.0;
        for pt in pts {
            x += pt.x();
            y += pt.y();
        }
        let len = pts.len() as f64;
        Some(Pt2D::new(x / len, y / len))
    }

    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D {
            x_nan: NotNan::new(self.x()).unwrap(),
            y_nan: NotNan::new(self.y()).unwrap(),
        }
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x(), self.y())
    }
}

impl From<Pt2D> for geo::Coordinate {
    fn from(pt: Pt2D) -> Self {
        geo::Coordinate { x: pt.x, y: pt.y }
    }
}

impl From<Pt2D> for geo::Point {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

impl From<geo::Coordinate> for Pt2D {
    fn from(coord: geo::Coordinate) -> Self {
        Pt2D::new(coord.x, coord.y)
    }
}

/// This isn't opinionated about what the (x, y) represents. Use `Pt2D` instead.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashablePt2D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
}

/// True if two points are close enough to be the same vertex.
pub(crate) fn same_vertex(pt1: Pt2D, pt2: Pt2D) -> bool {
    pt1.approx_eq(pt2, EPSILON_DIST)
}
