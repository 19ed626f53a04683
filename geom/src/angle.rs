use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle, stored in radians. Not trimmed, since fillet construction needs the full precision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    /// Create an angle in radians.
    pub fn new_rads(rads: f64) -> Angle {
        Angle(rads)
    }

    /// Create an angle in degrees.
    pub fn degrees(degs: f64) -> Angle {
        Angle::new_rads(degs.to_radians())
    }

    /// Returns [0, 2pi)
    pub fn normalized_radians(self) -> f64 {
        let rads = self.0 % (2.0 * PI);
        if rads < 0.0 {
            rads + 2.0 * PI
        } else {
            rads
        }
    }

    /// Returns [0, 360)
    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// Invert the direction of this angle.
    pub fn opposite(self) -> Angle {
        Angle(self.0 + PI)
    }

    pub fn rotate_degs(self, degrees: f64) -> Angle {
        Angle(self.0 + degrees.to_radians())
    }

    pub fn rotate_rads(self, rads: f64) -> Angle {
        Angle(self.0 + rads)
    }

    /// The signed rotation from this angle to `other`, in (-pi, pi]. Positive means turning
    /// counter-clockwise (left).
    pub fn shortest_rotation_towards(self, other: Angle) -> Angle {
        let mut delta = other.normalized_radians() - self.normalized_radians();
        if delta > PI {
            delta -= 2.0 * PI;
        } else if delta <= -PI {
            delta += 2.0 * PI;
        }
        Angle(delta)
    }

    /// The raw value in radians, without normalizing. Mostly meaningful for the result of
    /// `shortest_rotation_towards`.
    pub fn signed_radians(self) -> f64 {
        self.0
    }

    pub fn signed_degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// True if the two angles point the same way, within some tolerance in degrees.
    pub fn approx_eq(self, other: Angle, within_degrees: f64) -> bool {
        self.shortest_rotation_towards(other).0.abs().to_degrees() <= within_degrees
    }

    /// True if the two angles are parallel or anti-parallel, within some tolerance in degrees.
    pub fn approx_parallel(self, other: Angle, within_degrees: f64) -> bool {
        self.approx_eq(other, within_degrees) || self.opposite().approx_eq(other, within_degrees)
    }

    /// (cos, sin), the unit vector pointing this way.
    pub fn unit_vector(self) -> (f64, f64) {
        let (sin, cos) = self.0.sin_cos();
        (cos, sin)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_rotation() {
        let east = Angle::degrees(0.0);
        let north = Angle::degrees(90.0);
        assert!((east.shortest_rotation_towards(north).signed_degrees() - 90.0).abs() < 1e-9);
        assert!((north.shortest_rotation_towards(east).signed_degrees() + 90.0).abs() < 1e-9);
        // Wraparound
        let a = Angle::degrees(350.0);
        let b = Angle::degrees(10.0);
        assert!((a.shortest_rotation_towards(b).signed_degrees() - 20.0).abs() < 1e-9);
        assert!(Angle::degrees(-90.0).approx_eq(Angle::degrees(270.0), 1e-6));
        assert!(east.approx_parallel(Angle::degrees(180.2), 0.5));
    }
}
