use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use abstutil::{deserialize_btreemap, serialize_btreemap};
use geom::{Polygon, Pt2D};

use crate::junction::PlannedCorner;
use crate::trim::{Crossing, Interval, Strip, StripOverlap};
use crate::SegmentID;

/// Intermediate geometry from one rebuild, for debugging. Nothing reads this back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub strips: Vec<Strip>,
    pub overlaps: Vec<StripOverlap>,
    pub crossings: Vec<Crossing>,
    /// Per segment, the merged gaps
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    pub removals: BTreeMap<SegmentID, Vec<Interval>>,
    pub corners: Vec<PlannedCorner>,
}

impl Trace {
    /// Every strip and overlap as a polygon, for dumping to GeoJSON.
    pub fn polygons(&self) -> Vec<(&'static str, Polygon)> {
        let mut result = Vec::new();
        for strip in &self.strips {
            result.push(("strip", strip.obb.to_polygon()));
        }
        for overlap in &self.overlaps {
            if overlap.polygon.len() >= 3 {
                result.push(("overlap", Polygon::buggy_new(overlap.polygon.clone())));
            }
        }
        result
    }

    pub fn apexes(&self) -> Vec<Pt2D> {
        self.corners.iter().map(|c| c.apex).collect()
    }
}
