//! The narrow phase: strips are one oriented box per centerline edge, and overlapping strips from
//! two segments mark where they cross.

use serde::{Deserialize, Serialize};

use geom::{clip_convex, polygon_centroid, signed_area, Distance, OrientedBox, Pt2D};

use super::intervals::Interval;
use crate::{Segment, SegmentID};

/// The area covered by one edge of a segment's centerline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    pub segment: SegmentID,
    pub edge: usize,
    pub obb: OrientedBox,
    /// How far along the segment the edge begins
    pub start: Distance,
    pub length: Distance,
}

pub fn segment_strips(segment: &Segment) -> Vec<Strip> {
    let mut strips = Vec::new();
    let mut start = Distance::ZERO;
    for (edge, line) in segment.center.lines().enumerate() {
        strips.push(Strip {
            segment: segment.id,
            edge,
            obb: OrientedBox::from_line(&line, segment.half_width),
            start,
            length: line.length(),
        });
        start += line.length();
    }
    strips
}

impl Strip {
    // Where a point lands along the whole segment, normalized.
    fn t_of(&self, pt: Pt2D, segment_length: Distance) -> f64 {
        let along = self
            .obb
            .project(pt)
            .clamp(0.0, self.length.inner_meters());
        ((self.start.inner_meters() + along) / segment_length.inner_meters()).clamp(0.0, 1.0)
    }
}

/// The region where two strips (grown by the crossing threshold) overlap, measured along both
/// segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StripOverlap {
    pub polygon: Vec<Pt2D>,
    pub area: f64,
    /// The extent of the overlap along each segment
    pub range1: Interval,
    pub range2: Interval,
    /// Where the overlap's centroid lands along each segment
    pub center1: f64,
    pub center2: f64,
}

/// Returns None when the strips are further apart than `threshold`.
pub fn overlap(
    s1: &Strip,
    len1: Distance,
    s2: &Strip,
    len2: Distance,
    threshold: Distance,
) -> Option<StripOverlap> {
    if !s1
        .obb
        .get_bounds()
        .expanded(threshold)
        .overlaps(&s2.obb.get_bounds())
    {
        return None;
    }
    if s1.obb.separation(&s2.obb) >= threshold.inner_meters() {
        return None;
    }

    // Grow each side by half, so strips exactly `threshold` apart just barely touch
    let half = threshold / 2.0;
    let polygon = clip_convex(
        &s1.obb.expanded(half).corners(),
        &s2.obb.expanded(half).corners(),
    );
    if polygon.len() < 3 {
        return None;
    }
    let area = signed_area(&polygon).abs();
    let centroid = polygon_centroid(&polygon).or_else(|| Pt2D::center(&polygon))?;

    let range = |strip: &Strip, len: Distance| {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for pt in &polygon {
            let t = strip.t_of(*pt, len);
            min = min.min(t);
            max = max.max(t);
        }
        Interval::new(min, max)
    };
    let range1 = range(s1, len1);
    let range2 = range(s2, len2);
    let center1 = s1.t_of(centroid, len1);
    let center2 = s2.t_of(centroid, len2);

    Some(StripOverlap {
        polygon,
        area,
        range1,
        range2,
        center1,
        center2,
    })
}
