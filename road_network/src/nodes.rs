//! Grouping connected gaps into nodes.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

use abstutil::MultiMap;

use crate::trim::{Crossing, Cuts, Interval};
use crate::{Mouth, NodeID, PieceID, SegmentEnd, SegmentID, Site, Warning};

/// A gap is one merged removal interval on one segment.
type GapID = (SegmentID, usize);

/// Everything about a node known before its junction is built.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShell {
    pub id: NodeID,
    pub gaps: Vec<(SegmentID, Interval)>,
    /// Sorted by face
    pub mouths: Vec<Mouth>,
    pub segments: Vec<SegmentID>,
}

impl NodeShell {
    pub fn mouth(&self, piece: PieceID, end: SegmentEnd) -> Option<&Mouth> {
        self.mouths.iter().find(|m| m.piece == piece && m.end == end)
    }
}

pub fn group_gaps(cuts: &Cuts, crossings: &[Crossing], warnings: &mut Vec<Warning>) -> Vec<NodeShell> {
    let mut all_gaps: Vec<GapID> = Vec::new();
    let mut lookup: BTreeMap<GapID, usize> = BTreeMap::new();
    for (seg, gaps) in &cuts.gaps {
        for idx in 0..gaps.len() {
            lookup.insert((*seg, idx), all_gaps.len());
            all_gaps.push((*seg, idx));
        }
    }
    let find_gap = |seg: SegmentID, t: f64| -> Option<usize> {
        let idx = cuts.gaps.get(&seg)?.iter().position(|g| g.contains(t))?;
        lookup.get(&(seg, idx)).cloned()
    };

    let mut uf = UnionFind::new(all_gaps.len());
    for c in crossings {
        if let (Some(g1), Some(g2)) = (
            find_gap(c.segments.0, c.t_cross.0),
            find_gap(c.segments.1, c.t_cross.1),
        ) {
            uf.union(g1, g2);
        }
    }

    // Which gap every piece end opens into
    let mut mouths_per_gap: MultiMap<usize, (PieceID, SegmentEnd)> = MultiMap::new();
    for (seg, kept) in &cuts.kept {
        for (idx, range) in kept.iter().enumerate() {
            let piece = PieceID {
                segment: *seg,
                idx,
            };
            if range.start > 0.0 {
                if let Some(g) = find_gap(*seg, range.start) {
                    mouths_per_gap.insert(g, (piece, SegmentEnd::Start));
                }
            }
            if range.end < 1.0 {
                if let Some(g) = find_gap(*seg, range.end) {
                    mouths_per_gap.insert(g, (piece, SegmentEnd::End));
                }
            }
        }
    }

    // all_gaps is already sorted by (segment, position along it), so the smallest member of each
    // component gives a stable order
    let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..all_gaps.len() {
        components.entry(uf.find(idx)).or_default().push(idx);
    }
    let mut components: Vec<Vec<usize>> = components.into_values().collect();
    components.sort_by_key(|members| members[0]);

    let mut nodes = Vec::new();
    for members in components {
        let mut ends: Vec<(PieceID, SegmentEnd)> = members
            .iter()
            .flat_map(|g| mouths_per_gap.get(*g).iter().cloned())
            .collect();
        let segments: BTreeSet<SegmentID> = members.iter().map(|g| all_gaps[*g].0).collect();
        if ends.len() < 2 {
            let (seg, _) = all_gaps[members[0]];
            warnings.push(Warning::degenerate(
                Site::Segment(seg),
                format!(
                    "a crossing leaves {} road end(s) behind, so no junction is built there",
                    ends.len()
                ),
            ));
            continue;
        }

        // Faces follow authoring order: road, then segment, then piece, then end
        ends.sort();
        let id = NodeID(nodes.len());
        let mouths = ends
            .into_iter()
            .enumerate()
            .map(|(idx, (piece, end))| Mouth {
                piece,
                end,
                face: idx + 1,
            })
            .collect();

        let gaps: Vec<(SegmentID, Interval)> = members
            .iter()
            .map(|g| {
                let (seg, idx) = all_gaps[*g];
                (seg, cuts.gaps[&seg][idx])
            })
            .collect();
        let crossed_midspan: BTreeSet<SegmentID> = gaps
            .iter()
            .filter(|(_, gap)| gap.start > 0.0 && gap.end < 1.0)
            .map(|(seg, _)| *seg)
            .collect();
        if segments.len() >= 3 && crossed_midspan.len() >= 2 {
            warnings.push(Warning::ClusteredCrossing {
                node: id,
                segments: segments.iter().cloned().collect(),
            });
        }

        nodes.push(NodeShell {
            id,
            gaps,
            mouths,
            segments: segments.into_iter().collect(),
        });
    }
    nodes
}
