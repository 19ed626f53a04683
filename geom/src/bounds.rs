use aabb_quadtree::geom::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// Represents a rectangular boundary of `Pt2D` points.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// A boundary including no points.
    pub fn new() -> Bounds {
        Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    /// Create a boundary covering some points.
    pub fn from(pts: &[Pt2D]) -> Bounds {
        let mut b = Bounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    /// Update the boundary to include this point.
    pub fn update(&mut self, pt: Pt2D) {
        self.min_x = self.min_x.min(pt.x());
        self.max_x = self.max_x.max(pt.x());
        self.min_y = self.min_y.min(pt.y());
        self.max_y = self.max_y.max(pt.y());
    }

    /// Expand the boundary to include another.
    pub fn union(&mut self, other: Bounds) {
        self.update(Pt2D::new(other.min_x, other.min_y));
        self.update(Pt2D::new(other.max_x, other.max_y));
    }

    /// Grow the boundary by some distance on every side.
    pub fn expanded(&self, by: Distance) -> Bounds {
        let by = by.inner_meters();
        Bounds {
            min_x: self.min_x - by,
            min_y: self.min_y - by,
            max_x: self.max_x + by,
            max_y: self.max_y + by,
        }
    }

    /// True if the point is within the boundary.
    pub fn contains(&self, pt: Pt2D) -> bool {
        pt.x() >= self.min_x && pt.x() <= self.max_x && pt.y() >= self.min_y && pt.y() <= self.max_y
    }

    /// True if the two boundaries share any area or touch.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Converts the boundary to the format used by `aabb_quadtree`. The f32 rounding is
    /// conservative: the rectangle always covers the original boundary.
    pub fn as_bbox(&self) -> Rect {
        Rect {
            top_left: Point {
                x: next_down(self.min_x),
                y: next_down(self.min_y),
            },
            bottom_right: Point {
                x: next_up(self.max_x),
                y: next_up(self.max_y),
            },
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Pt2D {
        Pt2D::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

fn next_down(x: f64) -> f32 {
    let y = x as f32;
    if (y as f64) > x {
        y - y.abs().max(1.0) * f32::EPSILON
    } else {
        y
    }
}

fn next_up(x: f64) -> f32 {
    let y = x as f32;
    if (y as f64) < x {
        y + y.abs().max(1.0) * f32::EPSILON
    } else {
        y
    }
}
