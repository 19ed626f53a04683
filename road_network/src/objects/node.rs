use serde::{Deserialize, Serialize};

use geom::{Distance, Polygon, Pt2D};

use crate::corners::ResolvedCorner;
use crate::{NodeID, PieceID, SegmentEnd, SegmentID};

/// Where a group of connected removal gaps joins the Pieces around it. Every Node has at least
/// two mouths.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeID,
    /// Counter-clockwise around the middle of the mouths, starting from east. With junctions
    /// disabled, ordered by face instead.
    pub mouths: Vec<Mouth>,
    /// Every segment with a gap belonging to this node, including ones with no surviving mouth.
    pub segments: Vec<SegmentID>,
    /// None when junctions are disabled, or when even the fallbacks couldn't produce a valid
    /// polygon clear of every Piece and earlier footprint.
    pub surface: Option<JunctionSurface>,
}

impl Node {
    pub fn degree(&self) -> usize {
        self.mouths.len()
    }
}

/// One Piece end opening into a Node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mouth {
    pub piece: PieceID,
    pub end: SegmentEnd,
    /// Stable 1-based index, used to break ties when resolving corners
    pub face: usize,
}

/// The merged footprint of everything meeting at a Node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JunctionSurface {
    /// Counter-clockwise, simple, and closed
    pub polygon: Polygon,
    /// One per pair of adjacent mouths, in the same order as the node's mouths. Corner `i` sits
    /// between mouth `i` and mouth `i + 1`.
    pub corners: Vec<JunctionCorner>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JunctionCorner {
    /// Where the two curb lines meet, if they meet behind both mouths
    pub apex: Option<Pt2D>,
    pub kind: CornerKind,
    pub resolved: Option<ResolvedCorner>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum CornerKind {
    /// Rounded with an arc of this radius, starting and ending `tangent_length` from the apex
    Filleted {
        radius: Distance,
        tangent_length: Distance,
        center: Pt2D,
    },
    /// The curbs meet at the apex.
    Sharp,
    /// The curbs are joined directly, without passing through an apex.
    Straight,
}
