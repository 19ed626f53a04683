//! Finding where segments cross, and cutting them into pieces around the crossings.

mod intervals;
mod strips;

use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use abstutil::Timer;
use geom::{BoxIndex, Bounds, Distance};

pub use self::intervals::{Interval, IntervalSet};
pub use self::strips::{segment_strips, Strip, StripOverlap};
use crate::make::map_all;
use crate::{Config, DroppedPiece, Segment, SegmentID};

/// Where two segments (or two far-apart parts of one segment) cross.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub segments: (SegmentID, SegmentID),
    /// What to remove from each segment, centered on `t_cross`
    pub intervals: (Interval, Interval),
    pub t_cross: (f64, f64),
    pub area: f64,
}

/// Everything the narrow phase found.
pub struct Crossings {
    pub crossings: Vec<Crossing>,
    pub overlaps: Vec<StripOverlap>,
}

/// Segments are visited in id order, so the result doesn't depend on how the narrow phase is
/// scheduled.
pub fn find_crossings(
    segments: &BTreeMap<SegmentID, Segment>,
    strips: &BTreeMap<SegmentID, Vec<Strip>>,
    cfg: &Config,
    timer: &mut Timer,
) -> Crossings {
    let threshold = cfg.crossing_threshold();
    let mut crossings = Vec::new();
    let mut overlaps = Vec::new();
    if segments.is_empty() {
        return Crossings {
            crossings,
            overlaps,
        };
    }

    timer.start("broad phase");
    let expanded_bounds =
        |seg: &Segment| seg.center.get_bounds().expanded(seg.half_width + threshold);
    let mut world = Bounds::new();
    for seg in segments.values() {
        world.union(expanded_bounds(seg));
    }
    let mut index = BoxIndex::new(&world);
    for (id, seg) in segments {
        index.add(*id, expanded_bounds(seg));
    }
    let mut pairs = Vec::new();
    for (id, seg) in segments {
        for other in index.query(&expanded_bounds(seg)) {
            if other >= *id {
                pairs.push((*id, other));
            }
        }
    }
    timer.stop("broad phase");

    let narrow_phase = |(id1, id2): (SegmentID, SegmentID)| {
        crossings_between(
            &segments[&id1],
            &strips[&id1],
            &segments[&id2],
            &strips[&id2],
            threshold,
        )
    };
    for (mut c, mut o) in map_all(timer, cfg, "narrow phase", pairs, narrow_phase) {
        crossings.append(&mut c);
        overlaps.append(&mut o);
    }
    Crossings {
        crossings,
        overlaps,
    }
}

fn crossings_between(
    seg1: &Segment,
    strips1: &[Strip],
    seg2: &Segment,
    strips2: &[Strip],
    threshold: Distance,
) -> (Vec<Crossing>, Vec<StripOverlap>) {
    let same_segment = seg1.id == seg2.id;
    let (len1, len2) = (seg1.length(), seg2.length());

    let mut overlaps = Vec::new();
    for s1 in strips1 {
        for s2 in strips2 {
            if same_segment {
                // A segment can loop back over itself, but neighboring edges always overlap a
                // little. Only count edges far apart along the centerline.
                if s2.edge <= s1.edge
                    || s2.start - (s1.start + s1.length) <= seg1.half_width * 4.0
                {
                    continue;
                }
            }
            if let Some(o) = strips::overlap(s1, len1, s2, len2, threshold) {
                overlaps.push(o);
            }
        }
    }
    if overlaps.is_empty() {
        return (Vec::new(), overlaps);
    }

    // Overlaps touching along either segment are part of the same crossing
    let mut uf = UnionFind::new(overlaps.len());
    for i in 0..overlaps.len() {
        for j in (i + 1)..overlaps.len() {
            if overlaps[i].range1.overlaps(&overlaps[j].range1)
                || overlaps[i].range2.overlaps(&overlaps[j].range2)
            {
                uf.union(i, j);
            }
        }
    }
    let mut clusters: BTreeMap<usize, Vec<&StripOverlap>> = BTreeMap::new();
    for (idx, o) in overlaps.iter().enumerate() {
        clusters.entry(uf.find(idx)).or_default().push(o);
    }

    let mut crossings: Vec<Crossing> = clusters
        .into_values()
        .map(|cluster| make_crossing(seg1.id, seg2.id, cluster))
        .collect();
    crossings.sort_by(|a, b| {
        a.intervals
            .0
            .start
            .total_cmp(&b.intervals.0.start)
            .then(a.intervals.1.start.total_cmp(&b.intervals.1.start))
    });
    (crossings, overlaps)
}

fn make_crossing(id1: SegmentID, id2: SegmentID, cluster: Vec<&StripOverlap>) -> Crossing {
    let mut range1 = cluster[0].range1;
    let mut range2 = cluster[0].range2;
    let mut area = 0.0;
    let mut weighted1 = 0.0;
    let mut weighted2 = 0.0;
    for o in &cluster {
        range1 = range1.union(&o.range1);
        range2 = range2.union(&o.range2);
        area += o.area;
        weighted1 += o.area * o.center1;
        weighted2 += o.area * o.center2;
    }
    let t_cross = if area > 0.0 {
        (weighted1 / area, weighted2 / area)
    } else {
        (range1.middle(), range2.middle())
    };
    Crossing {
        segments: (id1, id2),
        intervals: (range1.centered_on(t_cross.0), range2.centered_on(t_cross.1)),
        t_cross,
        area,
    }
}

/// How each segment gets cut up.
#[derive(Clone, Debug, Default)]
pub struct Cuts {
    /// Per segment, sorted and disjoint. Dropped pieces are already folded into their neighbors.
    pub gaps: BTreeMap<SegmentID, Vec<Interval>>,
    /// Per segment, what survives. Segments where nothing survives have no entry.
    pub kept: BTreeMap<SegmentID, Vec<Interval>>,
    pub dropped: Vec<DroppedPiece>,
}

pub fn cut_segments(
    segments: &BTreeMap<SegmentID, Segment>,
    crossings: &[Crossing],
    cfg: &Config,
) -> Cuts {
    let mut removals: BTreeMap<SegmentID, IntervalSet> = BTreeMap::new();
    for c in crossings {
        removals
            .entry(c.segments.0)
            .or_default()
            .add(c.intervals.0);
        removals
            .entry(c.segments.1)
            .or_default()
            .add(c.intervals.1);
    }

    let mut cuts = Cuts::default();
    for (id, seg) in segments {
        let mut set = removals.remove(id).unwrap_or_default();
        let is_short =
            |range: &Interval| seg.length() * range.length() < cfg.min_kept_piece_length;

        let mut short = Vec::new();
        for candidate in set.complement() {
            if is_short(&candidate) {
                cuts.dropped.push(DroppedPiece {
                    segment: *id,
                    t0: candidate.start,
                    t1: candidate.end,
                    length: seg.length() * candidate.length(),
                });
                short.push(candidate);
            }
        }
        if set.is_empty() {
            // Nothing crosses this segment. If it's too short anyway, it just vanishes.
            if short.is_empty() {
                cuts.kept.insert(*id, vec![Interval::new(0.0, 1.0)]);
            }
            continue;
        }
        // A dropped piece joins the gaps on either side of it
        for range in short {
            set.add(range);
        }

        let kept = set.complement();
        if !kept.is_empty() {
            cuts.kept.insert(*id, kept);
        }
        cuts.gaps.insert(*id, set.intervals().clone());
    }
    cuts
}
