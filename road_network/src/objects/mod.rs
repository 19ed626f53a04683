//! Everything `rebuild` derives from the input. Objects refer to each other only through ids,
//! never references; the result owns them all in maps keyed by id.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::node::{CornerKind, JunctionCorner, JunctionSurface, Mouth, Node};
pub use self::segment::{DroppedPiece, Piece, Segment};

mod node;
mod segment;

/// The position of a `RoadSpec` in the input list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadSpecID(pub usize);

impl fmt::Display for RoadSpecID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Road #{}", self.0)
    }
}

/// One run of a road's centerline between sharp corners. Most roads have exactly one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentID {
    pub road: RoadSpecID,
    pub idx: usize,
}

impl fmt::Display for SegmentID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Segment #{}/{}", self.road.0, self.idx)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceID {
    pub segment: SegmentID,
    pub idx: usize,
}

impl fmt::Display for PieceID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Piece #{}/{}/{}",
            self.segment.road.0, self.segment.idx, self.idx
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeID(pub usize);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Node #{}", self.0)
    }
}

/// Which end of a Piece (or Segment), following the direction the road was authored in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentEnd {
    Start,
    End,
}
