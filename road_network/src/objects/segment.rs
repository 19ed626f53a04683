use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::{Distance, PolyLine, Polygon};

use crate::{NodeID, PieceID, SegmentEnd, SegmentID};

/// A maximal run of a road's centerline without sharp corners: straight edges and gentle fillet
/// arcs only. Crossing trimming cuts it into Pieces.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: SegmentID,
    /// The untrimmed centerline, in the direction the road was authored.
    pub center: PolyLine,
    pub half_width: Distance,
    pub lanes_forward: usize,
    pub lanes_backward: usize,
    /// Ordered along the segment. Empty only if everything was dropped, in which case the
    /// segment itself doesn't appear in the result.
    pub pieces: Vec<Piece>,
}

impl Segment {
    pub fn width(&self) -> Distance {
        self.half_width * 2.0
    }

    pub fn length(&self) -> Distance {
        self.center.length()
    }

    /// The distance along the centerline at some normalized parameter.
    pub fn dist_at(&self, t: f64) -> Distance {
        self.length() * t.clamp(0.0, 1.0)
    }
}

/// A surviving, drivable sub-range `[t0, t1]` of a Segment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Piece {
    pub id: PieceID,
    pub t0: f64,
    pub t1: f64,
    pub center: PolyLine,
    /// The curbs, running the same direction as `center`. Left is counter-clockwise from the
    /// direction of travel.
    pub left: PolyLine,
    pub right: PolyLine,
    /// The asphalt
    pub polygon: Polygon,
    pub start_node: Option<NodeID>,
    pub end_node: Option<NodeID>,
}

impl Piece {
    /// Slices the segment between two distances and thickens the result.
    pub(crate) fn new(
        id: PieceID,
        segment: &Segment,
        start: Distance,
        end: Distance,
    ) -> Result<Piece> {
        let center = segment.center.maybe_exact_slice(start, end)?;
        let left = center.shift_left(segment.half_width)?;
        let right = center.shift_right(segment.half_width)?;
        let polygon = Polygon::from_sides(&left, &right)?;
        let length = segment.length();
        Ok(Piece {
            id,
            t0: start / length,
            t1: end / length,
            center,
            left,
            right,
            polygon,
            start_node: None,
            end_node: None,
        })
    }

    pub fn length(&self) -> Distance {
        self.center.length()
    }

    pub fn node(&self, end: SegmentEnd) -> Option<NodeID> {
        match end {
            SegmentEnd::Start => self.start_node,
            SegmentEnd::End => self.end_node,
        }
    }
}

/// A sub-range too short to keep. Only reported for diagnostics; never part of the surface.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DroppedPiece {
    pub segment: SegmentID,
    pub t0: f64,
    pub t1: f64,
    pub length: Distance,
}
