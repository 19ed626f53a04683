use std::fmt;

use serde::{Deserialize, Serialize};

use abstutil::plain_list_names;

use crate::{NodeID, RoadSpecID, SegmentID};

/// Problems that don't stop a rebuild. The affected part falls back to the simplest valid
/// geometry and the rest of the network builds normally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Warning {
    /// The RoadSpec was excluded from the rebuild.
    InvalidRoadSpec { road: RoadSpecID, problem: String },
    /// Some input or intermediate geometry was unusable and got simplified.
    DegenerateGeometry { site: Site, problem: String },
    /// Neither face of a junction corner could give up any length, so the corner stays sharp.
    InfeasibleCorner { node: NodeID, faces: (usize, usize) },
    /// Three or more segments meet in one node, with at least two crossed mid-span. Trimming
    /// handled it pairwise, but it's worth reviewing.
    ClusteredCrossing {
        node: NodeID,
        segments: Vec<SegmentID>,
    },
}

/// What a `DegenerateGeometry` warning is about
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Site {
    Road(RoadSpecID),
    Segment(SegmentID),
    Node(NodeID),
}

impl Warning {
    pub fn degenerate<S: Into<String>>(site: Site, problem: S) -> Warning {
        Warning::DegenerateGeometry {
            site,
            problem: problem.into(),
        }
    }

    pub fn invalid<S: Into<String>>(road: RoadSpecID, problem: S) -> Warning {
        Warning::InvalidRoadSpec {
            road,
            problem: problem.into(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Site::Road(r) => write!(f, "{}", r),
            Site::Segment(s) => write!(f, "{}", s),
            Site::Node(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::InvalidRoadSpec { road, problem } => {
                write!(f, "{} is invalid and was skipped: {}", road, problem)
            }
            Warning::DegenerateGeometry { site, problem } => {
                write!(f, "Degenerate geometry at {}: {}", site, problem)
            }
            Warning::InfeasibleCorner { node, faces } => write!(
                f,
                "Corner between faces {} and {} of {} can't be rounded",
                faces.0, faces.1, node
            ),
            Warning::ClusteredCrossing { node, segments } => write!(
                f,
                "{} is a clustered crossing of {}",
                node,
                plain_list_names(segments.iter().map(|s| s.to_string()).collect())
            ),
        }
    }
}
