use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{math, MathError};

/// The classical orbital elements of a trajectory, plus the derived values
/// the owning orbit needs every frame.
///
/// Angles are in radians. Distances and times use whatever units the
/// gravitational parameter of the central body was expressed in.
///
/// An `OrbitalElements` value on its own is plain data. It only becomes
/// consistent once an orbit variant has completed it (see
/// [`Orbit::create`][crate::Orbit::create]); until then the derived fields
/// and the [`cache`][Self::cache] are zeroed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OrbitalElements {
    /// The semi-major axis.
    /// Positive for elliptic orbits, negative for hyperbolic trajectories.
    pub semimajor_axis: f64,

    /// The eccentricity.
    /// e < 1: ellipse
    /// e = 1: parabola (unsupported)
    /// e > 1: hyperbola
    pub eccentricity: f64,

    /// The inclination against the reference plane, in `[0, π]`.
    pub inclination: f64,

    /// The longitude of the ascending node, in `[0, 2π)`.
    pub lon_asc_node: f64,

    /// The argument of periapsis, in `[0, 2π)`.
    pub arg_periapsis: f64,

    /// The true anomaly, in `[0, 2π)`.
    pub true_anomaly: f64,

    /// The mean anomaly.
    ///
    /// In `[0, 2π)` for elliptic orbits. For hyperbolic trajectories this is
    /// the hyperbolic mean anomaly `e sinh H - H`, which is unbounded and
    /// signed (negative before periapsis). It is the one angle here that is
    /// never normalized: it keeps growing with time, so wrapping it into
    /// `[0, 2π)` would move the body.
    pub mean_anomaly: f64,

    /// The eccentric anomaly (elliptic, in `[0, 2π)`) or the hyperbolic
    /// anomaly (hyperbolic, signed).
    pub anomaly: f64,

    /// The semi-minor axis.
    /// Positive for both families: hyperbolic trajectories use `-a sqrt(e^2 - 1)`.
    pub semiminor_axis: f64,

    /// The mean motion, in radians per unit time.
    pub mean_motion: f64,

    /// The semi-latus rectum.
    /// Negative for hyperbolic trajectories.
    pub semi_latus_rectum: f64,

    /// The time until the next periapsis passage.
    /// Negative once a hyperbolic trajectory has passed its periapsis.
    pub time_to_periapsis: f64,

    /// The orbital period. Infinite for hyperbolic trajectories.
    pub period: f64,

    /// Values derived from the elements above. Never persisted.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cache: ElementCache,
}

// -------- MEMO --------
// When updating this struct, please review the following methods:
// `EllipticOrbit::complete()`
// `HyperbolicOrbit::complete()`
// `ElementCache::from_orientation()`
/// Values derived from an element set.
///
/// These are always recomputed together with the elements that produced
/// them, and never read before the owning orbit populated them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementCache {
    /// The constant of the half-angle substitution between true anomaly and
    /// eccentric (or hyperbolic) anomaly.
    /// `sqrt((1 + e) / (1 - e))` for ellipses, `sqrt((e + 1) / (e - 1))`
    /// for hyperbolas.
    pub true_anomaly_constant: f64,

    /// The reciprocal of the mean motion: `sqrt(|a|^3 / GM)`.
    pub period_constant: f64,

    /// The specific angular momentum vector, `v × r`.
    pub ang_momentum: DVec3,

    /// The eccentricity vector, pointing at periapsis.
    pub ecc_vec: DVec3,

    /// Sine and cosine of the inclination.
    pub sin_cos_inclination: (f64, f64),

    /// Sine and cosine of the longitude of the ascending node.
    pub sin_cos_lon_asc_node: (f64, f64),
}

impl ElementCache {
    /// Starts a cache from the orientation angles of an element set.
    ///
    /// The family-specific fields are left zeroed for the orbit variant
    /// to fill in.
    pub(crate) fn from_orientation(inclination: f64, lon_asc_node: f64) -> Result<Self, MathError> {
        Ok(Self {
            sin_cos_inclination: (math::sin(inclination)?, math::cos(inclination)?),
            sin_cos_lon_asc_node: (math::sin(lon_asc_node)?, math::cos(lon_asc_node)?),
            ..Default::default()
        })
    }

    /// The direction of the ascending node.
    #[inline]
    pub fn node_direction(&self) -> DVec3 {
        let (sin_lan, cos_lan) = self.sin_cos_lon_asc_node;
        DVec3::new(cos_lan, 0.0, sin_lan)
    }

    /// The unit normal of the orbital plane, along the angular momentum.
    #[inline]
    pub fn plane_normal(&self) -> DVec3 {
        let (sin_inc, cos_inc) = self.sin_cos_inclination;
        let (sin_lan, cos_lan) = self.sin_cos_lon_asc_node;
        DVec3::new(sin_inc * sin_lan, cos_inc, -sin_inc * cos_lan)
    }

    /// The in-plane unit vector 90° past the ascending node, in the direction
    /// of motion.
    #[inline]
    pub fn transverse_node_direction(&self) -> DVec3 {
        self.node_direction().cross(self.plane_normal())
    }
}
