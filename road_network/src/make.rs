//! The whole rebuild, start to finish.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use abstutil::{deserialize_btreemap, serialize_btreemap, Timer};
use geom::Distance;

use crate::centerline::{make_centerline, Centerline};
use crate::corners::ResolveCorner;
use crate::junction::{
    build_surface, clip_overlaps, plan_corners, BuiltJunction, Candidates, CornerPlan,
};
use crate::nodes::{group_gaps, NodeShell};
use crate::spec::{ingest, RoadSpec};
use crate::trace::Trace;
use crate::trim::{cut_segments, find_crossings, segment_strips, Strip};
use crate::{
    Config, DroppedPiece, Node, NodeID, Piece, PieceID, Segment, SegmentEnd, SegmentID, Site,
    Warning,
};

/// Everything derived from one set of RoadSpecs. Rebuilt from scratch every time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadNetworkResult {
    /// Only segments with at least one surviving piece
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    pub segments: BTreeMap<SegmentID, Segment>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    pub nodes: BTreeMap<NodeID, Node>,
    /// One per usable RoadSpec, before any trimming
    pub centerlines: Vec<Centerline>,
    pub dropped_pieces: Vec<DroppedPiece>,
    pub warnings: Vec<Warning>,
    /// Only when `Config::record_trace` is set
    pub trace: Option<Trace>,
}

impl RoadNetworkResult {
    pub fn piece(&self, id: PieceID) -> Option<&Piece> {
        self.segments
            .get(&id.segment)?
            .pieces
            .iter()
            .find(|p| p.id == id)
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.segments.values().flat_map(|s| s.pieces.iter())
    }
}

/// Rebuilds the whole network, resolving junction corners with `cfg.corner_strategy`.
///
/// Problems with the road data never fail this; they're reported as warnings and the affected
/// part is simplified. Only a malformed `Config` is an error.
pub fn rebuild(specs: &[RoadSpec], cfg: &Config) -> Result<RoadNetworkResult> {
    rebuild_with_strategy(specs, cfg, &cfg.corner_strategy)
}

/// Like `rebuild`, but with any rule for resolving junction corners.
pub fn rebuild_with_strategy(
    specs: &[RoadSpec],
    cfg: &Config,
    strategy: &dyn ResolveCorner,
) -> Result<RoadNetworkResult> {
    cfg.validate()?;
    let mut timer = Timer::new("rebuild road network");

    timer.start("ingest road specs");
    let (roads, mut warnings) = ingest(specs, cfg);
    timer.stop("ingest road specs");

    timer.start("fillet centerlines");
    let mut centerlines = Vec::new();
    let mut segments: BTreeMap<SegmentID, Segment> = BTreeMap::new();
    for road in &roads {
        let centerline = match make_centerline(road, cfg, &mut warnings) {
            Some(c) => c,
            None => continue,
        };
        for (idx, run) in centerline.runs.iter().enumerate() {
            let id = SegmentID { road: road.id, idx };
            segments.insert(
                id,
                Segment {
                    id,
                    center: run.clone(),
                    half_width: road.half_width,
                    lanes_forward: road.lanes_forward,
                    lanes_backward: road.lanes_backward,
                    pieces: Vec::new(),
                },
            );
        }
        centerlines.push(centerline);
    }
    timer.stop("fillet centerlines");

    timer.start("trim crossings");
    let strips: BTreeMap<SegmentID, Vec<Strip>> = segments
        .iter()
        .map(|(id, s)| (*id, segment_strips(s)))
        .collect();
    let found = find_crossings(&segments, &strips, cfg, &mut timer);
    let cuts = cut_segments(&segments, &found.crossings, cfg);
    timer.stop("trim crossings");

    timer.start("group nodes");
    let shells = group_gaps(&cuts, &found.crossings, &mut warnings);
    timer.stop("group nodes");

    let plans: Vec<CornerPlan> = if cfg.junctions_enabled {
        let candidates = Candidates {
            segments: &segments,
            kept: &cuts.kept,
            mouths: shells
                .iter()
                .flat_map(|n| n.mouths.iter().map(|m| (m.piece, m.end)))
                .collect(),
        };
        let requests: Vec<&NodeShell> = shells.iter().collect();
        map_all(
            &mut timer,
            cfg,
            "plan junction corners",
            requests,
            |shell| plan_corners(shell, &candidates, cfg, strategy),
        )
    } else {
        Vec::new()
    };
    // Every piece end belongs to at most one node, so there's no overlap between plans
    let mut extra_trim: BTreeMap<(PieceID, SegmentEnd), Distance> = BTreeMap::new();
    for plan in &plans {
        extra_trim.extend(plan.extra_trim.clone());
        warnings.extend(plan.warnings.clone());
    }

    timer.start("build pieces");
    let mut dropped_pieces = cuts.dropped.clone();
    let mut pieces: BTreeMap<PieceID, Piece> = BTreeMap::new();
    for (seg_id, kept) in &cuts.kept {
        let segment = &segments[seg_id];
        for (idx, range) in kept.iter().enumerate() {
            let id = PieceID {
                segment: *seg_id,
                idx,
            };
            let extra = |end| {
                extra_trim
                    .get(&(id, end))
                    .cloned()
                    .unwrap_or(Distance::ZERO)
            };
            let start = segment.dist_at(range.start) + extra(SegmentEnd::Start);
            let end = segment.dist_at(range.end) - extra(SegmentEnd::End);
            match Piece::new(id, segment, start, end) {
                Ok(piece) => {
                    pieces.insert(id, piece);
                }
                Err(err) => {
                    warnings.push(Warning::degenerate(
                        Site::Segment(*seg_id),
                        format!("{} couldn't be built, dropping it: {}", id, err),
                    ));
                    dropped_pieces.push(DroppedPiece {
                        segment: *seg_id,
                        t0: range.start,
                        t1: range.end,
                        length: (end - start).max(Distance::ZERO),
                    });
                }
            }
        }
    }
    dropped_pieces.sort_by(|a, b| a.segment.cmp(&b.segment).then(a.t0.total_cmp(&b.t0)));
    timer.stop("build pieces");

    let mut built: Vec<BuiltJunction> = if cfg.junctions_enabled {
        let requests: Vec<(&NodeShell, &CornerPlan)> = shells.iter().zip(plans.iter()).collect();
        map_all(
            &mut timer,
            cfg,
            "build junctions",
            requests,
            |(shell, plan)| build_surface(shell, plan, &pieces, cfg),
        )
    } else {
        shells
            .iter()
            .map(|shell| BuiltJunction {
                mouths: shell
                    .mouths
                    .iter()
                    .filter(|m| pieces.contains_key(&m.piece))
                    .cloned()
                    .collect(),
                surface: None,
                warnings: Vec::new(),
            })
            .collect()
    };
    if cfg.junctions_enabled {
        timer.start("clip junctions");
        clip_overlaps(&shells, &mut built, &pieces);
        timer.stop("clip junctions");
    }

    let mut nodes = BTreeMap::new();
    for (shell, junction) in shells.iter().zip(built) {
        warnings.extend(junction.warnings);
        for mouth in &junction.mouths {
            if let Some(piece) = pieces.get_mut(&mouth.piece) {
                match mouth.end {
                    SegmentEnd::Start => piece.start_node = Some(shell.id),
                    SegmentEnd::End => piece.end_node = Some(shell.id),
                }
            }
        }
        nodes.insert(
            shell.id,
            Node {
                id: shell.id,
                mouths: junction.mouths,
                segments: shell.segments.clone(),
                surface: junction.surface,
            },
        );
    }

    let trace = if cfg.record_trace {
        Some(Trace {
            strips: strips.into_values().flatten().collect(),
            overlaps: found.overlaps,
            crossings: found.crossings,
            removals: cuts.gaps.clone(),
            corners: plans
                .iter()
                .flat_map(|p| p.corners.values().cloned())
                .collect(),
        })
    } else {
        None
    };

    for piece in pieces.into_values() {
        if let Some(segment) = segments.get_mut(&piece.id.segment) {
            segment.pieces.push(piece);
        }
    }
    segments.retain(|_, s| !s.pieces.is_empty());

    for w in &warnings {
        timer.warn(w.to_string());
    }
    info!(
        "Rebuilt {} roads into {} segments and {} nodes",
        roads.len(),
        segments.len(),
        nodes.len()
    );

    Ok(RoadNetworkResult {
        segments,
        nodes,
        centerlines,
        dropped_pieces,
        warnings,
        trace,
    })
}

/// Runs on a thread pool if the config asks for it. Either way the results come back in request
/// order.
pub(crate) fn map_all<I, O, F>(
    timer: &mut Timer,
    cfg: &Config,
    name: &str,
    requests: Vec<I>,
    cb: F,
) -> Vec<O>
where
    I: Send,
    O: Send,
    F: Fn(I) -> O + Sync,
{
    if cfg.parallel {
        timer.parallelize(name, requests, cb)
    } else {
        timer.sequential(name, requests, cb)
    }
}
