//! Double-precision vector helpers.
//!
//! The crate uses [`glam::DVec3`] as its 3D vector. The operations glam only
//! offers in an unguarded form (or not at all) are provided by
//! [`Vector3Ext`].

use glam::DVec3;

use crate::{math, MathError};

/// The double-precision 3D vector used throughout the crate.
pub type Vector3Double = DVec3;

/// The axis every inclination is measured against.
///
/// Orbits with an angular momentum along `+UP` have an inclination of zero.
pub const UP: DVec3 = DVec3::Y;

/// The fixed node direction used when the node line is undefined,
/// i.e. for equatorial orbits.
pub const REFERENCE_AXIS: DVec3 = DVec3::X;

/// Guarded vector operations.
pub trait Vector3Ext {
    /// Divides every component by `divisor`, returning the zero vector when the
    /// divisor is exactly zero.
    fn safe_div(self, divisor: f64) -> Self;

    /// Returns the unit vector in the same direction, or the zero vector
    /// if this vector has zero length.
    fn safe_normalize(self) -> Self;

    /// Gets the angle, in `(-π, π]`, that rotates `self` onto `to` about `axis`.
    ///
    /// The angle is positive for a right-handed rotation about `axis`.
    fn signed_angle(self, to: Self, axis: Self) -> f64;

    /// Gets the unsigned angle between two vectors, in `[0, π]`.
    ///
    /// Zero-length vectors make the angle π/2 instead of NaN.
    fn try_angle_between(self, other: Self) -> Result<f64, MathError>;
}

impl Vector3Ext for DVec3 {
    #[inline]
    fn safe_div(self, divisor: f64) -> DVec3 {
        if divisor == 0.0 {
            DVec3::ZERO
        } else {
            self / divisor
        }
    }

    #[inline]
    fn safe_normalize(self) -> DVec3 {
        self.safe_div(self.length())
    }

    fn signed_angle(self, to: DVec3, axis: DVec3) -> f64 {
        let sin_part = axis.safe_normalize().dot(self.cross(to));
        let cos_part = self.dot(to);
        sin_part.atan2(cos_part)
    }

    fn try_angle_between(self, other: DVec3) -> Result<f64, MathError> {
        let denominator = self.length() * other.length();
        math::acos(math::safe_div(self.dot(other), denominator))
    }
}
