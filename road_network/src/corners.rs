//! Deciding how much each face gives up at a junction corner. The junction builder only talks to
//! the `ResolveCorner` trait, so the rule can be swapped without touching any geometry code.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use geom::{Angle, Distance};

/// What one face (a mouth of a node) wants at a corner it shares with its neighbor.
#[derive(Clone, Debug, PartialEq)]
pub struct CornerCondition {
    /// Stable 1-based index of the face, assigned from authoring order
    pub face: usize,
    /// Pointing out of the node, along the face's road
    pub direction: Angle,
    pub half_width: Distance,
    /// How far from the corner's apex the face would like the rounding to start
    pub requested_offset: Distance,
    /// The most the face can give up, after which its road would become too short
    pub max_offset: Distance,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceOffset {
    pub face: usize,
    pub offset: Distance,
}

/// The outcome at one corner. The faces are always sorted by index, so the result doesn't depend
/// on which condition was passed first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCorner {
    pub faces: [FaceOffset; 2],
    /// The face whose request was honored, if the rule picks one
    pub winner: Option<usize>,
    /// Some length was requested, but neither face could give up any. The corner stays sharp.
    pub infeasible: bool,
}

impl ResolvedCorner {
    fn new(
        a: FaceOffset,
        b: FaceOffset,
        winner: Option<usize>,
        requested: Distance,
    ) -> ResolvedCorner {
        let infeasible =
            requested > Distance::ZERO && a.offset == Distance::ZERO && b.offset == Distance::ZERO;
        let faces = if a.face <= b.face { [a, b] } else { [b, a] };
        ResolvedCorner {
            faces,
            winner,
            infeasible,
        }
    }

    /// How far from the apex this face's tangent point sits.
    pub fn offset(&self, face: usize) -> Option<Distance> {
        self.faces.iter().find(|f| f.face == face).map(|f| f.offset)
    }

    /// A circular arc needs the same tangent length on both sides.
    pub fn shared_offset(&self) -> Distance {
        self.faces[0].offset.min(self.faces[1].offset)
    }
}

pub trait ResolveCorner: Send + Sync {
    /// Must be symmetric: `resolve(a, b) == resolve(b, a)`.
    fn resolve(&self, a: &CornerCondition, b: &CornerCondition) -> ResolvedCorner;
}

/// The odd-indexed face wins; between two odd or two even faces, the lower index wins. Both faces
/// aim for the winner's request. Each is clamped only by its own bound, so the loser absorbs any
/// shortfall on its side first, and the winner is only cut when its own bound can't hold the
/// request.
pub struct OddWins;

impl ResolveCorner for OddWins {
    fn resolve(&self, a: &CornerCondition, b: &CornerCondition) -> ResolvedCorner {
        let (winner, loser) = if odd_wins_order(a, b) == Ordering::Less {
            (a, b)
        } else {
            (b, a)
        };

        let target = winner.requested_offset.max(Distance::ZERO);
        let loser_offset = target.min(loser.max_offset.max(Distance::ZERO));
        let winner_offset = target.min(winner.max_offset.max(Distance::ZERO));

        ResolvedCorner::new(
            FaceOffset {
                face: winner.face,
                offset: winner_offset,
            },
            FaceOffset {
                face: loser.face,
                offset: loser_offset,
            },
            Some(winner.face),
            target,
        )
    }
}

// Less means a wins.
fn odd_wins_order(a: &CornerCondition, b: &CornerCondition) -> Ordering {
    let a_odd = a.face % 2 == 1;
    let b_odd = b.face % 2 == 1;
    if a_odd != b_odd {
        return if a_odd {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    a.face
        .cmp(&b.face)
        .then_with(|| b.requested_offset.cmp(&a.requested_offset))
        .then_with(|| b.max_offset.cmp(&a.max_offset))
}

/// Both faces settle for the smaller request, limited by the tighter bound. Nobody wins.
pub struct Conservative;

impl ResolveCorner for Conservative {
    fn resolve(&self, a: &CornerCondition, b: &CornerCondition) -> ResolvedCorner {
        let target = a
            .requested_offset
            .min(b.requested_offset)
            .max(Distance::ZERO);
        let bound = a.max_offset.min(b.max_offset).max(Distance::ZERO);
        let offset = target.min(bound);
        ResolvedCorner::new(
            FaceOffset {
                face: a.face,
                offset,
            },
            FaceOffset {
                face: b.face,
                offset,
            },
            None,
            target,
        )
    }
}

/// Picks one of the built-in rules by value, for `Config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerStrategy {
    OddWins,
    Conservative,
}

impl ResolveCorner for CornerStrategy {
    fn resolve(&self, a: &CornerCondition, b: &CornerCondition) -> ResolvedCorner {
        match self {
            CornerStrategy::OddWins => OddWins.resolve(a, b),
            CornerStrategy::Conservative => Conservative.resolve(a, b),
        }
    }
}
