use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt2D};

/// Turns smaller than this (in degrees) are treated as going straight; no arc is inserted.
pub const NEAR_COLINEAR_DEGREES: f64 = 0.5;

/// A tangent-arc-tangent rounding of a corner: a circular arc tangent to the incoming line at
/// `tangent_in` and to the outgoing line at `tangent_out`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fillet {
    pub corner: Pt2D,
    pub center: Pt2D,
    pub radius: Distance,
    pub tangent_in: Pt2D,
    pub tangent_out: Pt2D,
    /// Direction of travel arriving at the corner
    pub incoming: Angle,
    /// Direction of travel leaving the corner
    pub outgoing: Angle,
    // From the center to tangent_in
    start_angle: Angle,
    // Positive is counter-clockwise, matching a left turn
    sweep: Angle,
}

impl Fillet {
    /// Rounds the corner with a circle of some radius. Returns None if the corner is nearly
    /// straight, reverses direction, or the radius isn't positive.
    pub fn new(corner: Pt2D, incoming: Angle, outgoing: Angle, radius: Distance) -> Option<Fillet> {
        let turn = Fillet::turn(incoming, outgoing)?;
        if radius <= Distance::ZERO {
            return None;
        }
        let tangent_length = radius * (turn.signed_radians().abs() / 2.0).tan();
        Some(Fillet::build(corner, incoming, outgoing, turn, radius, tangent_length))
    }

    /// Rounds the corner so the arc starts and ends some distance from the corner.
    pub fn with_tangent_length(
        corner: Pt2D,
        incoming: Angle,
        outgoing: Angle,
        tangent_length: Distance,
    ) -> Option<Fillet> {
        let turn = Fillet::turn(incoming, outgoing)?;
        if tangent_length <= Distance::ZERO {
            return None;
        }
        let radius = tangent_length / (turn.signed_radians().abs() / 2.0).tan();
        if radius.is_tiny() {
            return None;
        }
        Some(Fillet::build(corner, incoming, outgoing, turn, radius, tangent_length))
    }

    /// How far from the corner the arc meets each line, for a circle of some radius.
    pub fn tangent_length(incoming: Angle, outgoing: Angle, radius: Distance) -> Distance {
        match Fillet::turn(incoming, outgoing) {
            Some(turn) => radius * (turn.signed_radians().abs() / 2.0).tan(),
            None => Distance::ZERO,
        }
    }

    /// The radius whose tangent points sit some distance from the corner.
    pub fn radius_for_tangent_length(
        incoming: Angle,
        outgoing: Angle,
        tangent_length: Distance,
    ) -> Distance {
        match Fillet::turn(incoming, outgoing) {
            Some(turn) => tangent_length / (turn.signed_radians().abs() / 2.0).tan(),
            None => Distance::ZERO,
        }
    }

    // The signed turn, or None when no arc makes sense.
    fn turn(incoming: Angle, outgoing: Angle) -> Option<Angle> {
        let turn = incoming.shortest_rotation_towards(outgoing);
        let degrees = turn.signed_degrees().abs();
        if degrees < NEAR_COLINEAR_DEGREES || degrees > 180.0 - NEAR_COLINEAR_DEGREES {
            return None;
        }
        Some(turn)
    }

    fn build(
        corner: Pt2D,
        incoming: Angle,
        outgoing: Angle,
        turn: Angle,
        radius: Distance,
        tangent_length: Distance,
    ) -> Fillet {
        let tangent_in = corner.project_away(tangent_length, incoming.opposite());
        let tangent_out = corner.project_away(tangent_length, outgoing);
        let to_center = if turn.signed_radians() > 0.0 {
            incoming.rotate_degs(90.0)
        } else {
            incoming.rotate_degs(-90.0)
        };
        let center = tangent_in.project_away(radius, to_center);
        Fillet {
            corner,
            center,
            radius,
            tangent_in,
            tangent_out,
            incoming,
            outgoing,
            start_angle: to_center.opposite(),
            sweep: turn,
        }
    }

    /// The signed turn swept by the arc. Positive means left.
    pub fn sweep(&self) -> Angle {
        self.sweep
    }

    pub fn arc_length(&self) -> Distance {
        self.radius * self.sweep.signed_radians().abs()
    }

    /// The direction of travel along the arc, some fraction of the way from `tangent_in`.
    pub fn direction_at(&self, fraction: f64) -> Angle {
        self.incoming.rotate_rads(self.sweep.signed_radians() * fraction)
    }

    /// Samples the arc at uniform arc-length steps, no longer than `max_step` and short enough
    /// that no chord strays more than `max_chord_error` from the true circle. The first and last
    /// points are exactly the tangent points.
    pub fn sample(&self, max_step: Distance, max_chord_error: Distance) -> Vec<Pt2D> {
        let r = self.radius.inner_meters();
        let max_angle = if max_chord_error.inner_meters() >= r {
            PI
        } else {
            2.0 * (1.0 - max_chord_error.inner_meters() / r).acos()
        };
        let step = max_step.inner_meters().min(r * max_angle);
        let arc_length = self.arc_length().inner_meters();
        let num_steps = if step > 0.0 {
            ((arc_length / step).ceil() as usize).max(1)
        } else {
            1
        };

        let mut pts = vec![self.tangent_in];
        for i in 1..num_steps {
            let fraction = (i as f64) / (num_steps as f64);
            let angle = self
                .start_angle
                .rotate_rads(self.sweep.signed_radians() * fraction);
            pts.push(self.center.project_away(self.radius, angle));
        }
        pts.push(self.tangent_out);
        pts
    }
}
