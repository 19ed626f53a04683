//! `geom` is the 2D geometry layer underneath the road network engine. Everything is in
//! world-space meters, with +X east and +Y north (Cartesian, not screen-space).
//!
//! Most types trim their floating point values to a fixed precision on construction, so that
//! the same input always produces exactly the same output, and serializing results is
//! idempotent.

#[macro_use]
extern crate anyhow;

mod angle;
mod bounds;
mod box_index;
mod clip;
mod distance;
mod fillet;
mod line;
mod obb;
mod polygon;
mod polyline;
mod pt;
mod ring;
mod tessellation;

pub use crate::angle::Angle;
pub use crate::bounds::Bounds;
pub use crate::box_index::BoxIndex;
pub use crate::clip::{clip_convex, polygon_centroid, signed_area};
pub use crate::distance::Distance;
pub use crate::fillet::{Fillet, NEAR_COLINEAR_DEGREES};
pub use crate::line::{InfiniteLine, Line};
pub use crate::obb::OrientedBox;
pub use crate::polygon::Polygon;
pub use crate::polyline::PolyLine;
pub use crate::pt::{HashablePt2D, Pt2D};
pub use crate::ring::Ring;
pub use crate::tessellation::{Tessellation, Triangle};

/// About 0.4 inches... which is quite tiny on the scale of things. :)
pub const EPSILON_DIST: Distance = Distance::const_meters(0.01);

/// Reduce the precision of an f64. This helps ensure serialization is idempotent (everything is
/// exactly the same before and after saving/loading). Ideally we'd use some kind of proper
/// fixed-precision type instead of f64.
pub fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

