//! Turns authored road polylines into road surfaces: every road is rounded at its corners, cut
//! into pieces wherever it crosses something, and the gaps are filled with junction footprints.
//! Nothing overlaps and nothing is left open, and the same input always produces the same output.
//!
//! `rebuild` is the only entry point. Everything it returns is derived from the RoadSpecs and is
//! thrown away and recomputed on every call.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod centerline;
mod config;
pub mod corners;
mod junction;
mod make;
mod mesh;
mod nodes;
mod objects;
mod spec;
mod trace;
pub mod trim;
mod warnings;

pub use crate::centerline::{Centerline, CenterlineArc, MIN_INNER_CURB_RADIUS};
pub use crate::config::Config;
pub use crate::corners::{
    Conservative, CornerCondition, CornerStrategy, FaceOffset, OddWins, ResolveCorner,
    ResolvedCorner,
};
pub use crate::junction::PlannedCorner;
pub use crate::make::{rebuild, rebuild_with_strategy, RoadNetworkResult};
pub use crate::mesh::Mesh;
pub use crate::objects::{
    CornerKind, DroppedPiece, JunctionCorner, JunctionSurface, Mouth, Node, NodeID, Piece, PieceID,
    RoadSpecID, Segment, SegmentEnd, SegmentID,
};
pub use crate::spec::{validate_specs, RoadSpec, MAX_COORDINATE, MAX_LANES_PER_DIRECTION};
pub use crate::trace::Trace;
pub use crate::warnings::{Site, Warning};
