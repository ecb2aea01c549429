use core::f64::consts::TAU;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::{self, normalize_angle, safe_div};
use crate::vector::{Vector3Ext, REFERENCE_AXIS, UP};
use crate::{MathError, OrbitalElements};

/// Below this eccentricity an orbit is treated as circular and the
/// periapsis direction falls back to the ascending node.
pub(crate) const CIRCULAR_EPSILON: f64 = 1e-10;

/// Below this ratio of node-vector length to angular-momentum length the
/// orbit is treated as equatorial.
pub(crate) const EQUATORIAL_EPSILON: f64 = 1e-12;

/// A position and velocity relative to a central body, at one instant.
///
/// State vectors can be turned into an orbit, see
/// [`KeplerianOrbit::from_state_vectors`][crate::KeplerianOrbit::from_state_vectors].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateVectors {
    /// The position relative to the central body.
    pub position: DVec3,
    /// The velocity relative to the central body.
    pub velocity: DVec3,
}

impl StateVectors {
    /// Creates a new pair of state vectors.
    pub fn new(position: DVec3, velocity: DVec3) -> Self {
        Self { position, velocity }
    }

    /// Re-expresses these state vectors relative to another frame, given that
    /// frame's own state vectors in the current one.
    ///
    /// # Example
    /// ```
    /// use glam::DVec3;
    /// use patched_conics::StateVectors;
    ///
    /// let craft = StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 2.0));
    /// let moon = StateVectors::new(DVec3::new(8.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 1.5));
    ///
    /// let relative = craft.relative_to(&moon);
    /// assert_eq!(relative.position, DVec3::new(2.0, 0.0, 0.0));
    /// assert_eq!(relative.velocity, DVec3::new(0.0, 0.0, 0.5));
    /// ```
    #[must_use]
    pub fn relative_to(&self, frame: &StateVectors) -> StateVectors {
        StateVectors {
            position: self.position - frame.position,
            velocity: self.velocity - frame.velocity,
        }
    }

    /// The inverse of [`relative_to`][Self::relative_to]: given the state
    /// vectors of the current frame's origin in an outer frame, re-expresses
    /// these state vectors in that outer frame.
    #[must_use]
    pub fn in_outer_frame(&self, origin: &StateVectors) -> StateVectors {
        StateVectors {
            position: self.position + origin.position,
            velocity: self.velocity + origin.velocity,
        }
    }

    /// Converts the state vectors into the shape, orientation and true anomaly
    /// of the trajectory they lie on.
    ///
    /// # Mu
    /// Mu is the gravitational parameter of the central body, equal to `GM`.
    ///
    /// # Output
    /// Only the base elements are filled in: `semimajor_axis`,
    /// `eccentricity`, `inclination`, `lon_asc_node`, `arg_periapsis` and
    /// `true_anomaly`. The family-specific quantities are completed by the
    /// orbit variant the elements are handed to.
    ///
    /// # Degenerate geometry
    /// - Equatorial orbits (no node line) use [`REFERENCE_AXIS`] as their node.
    /// - Circular orbits (no periapsis direction) use the node as their periapsis,
    ///   making the true anomaly the argument of latitude.
    /// - Vanishing magnitudes are divided through with [`safe_div`] and
    ///   produce zeroes rather than NaNs.
    ///
    /// # Parabolic Support
    /// The resulting eccentricity may be exactly 1, in which case no orbit
    /// variant will accept the elements.
    pub fn to_elements(&self, mu: f64) -> Result<OrbitalElements, MathError> {
        let position = self.position;
        let velocity = self.velocity;
        let altitude = position.length();
        let speed_sq = velocity.length_squared();

        // Step 1: Specific angular momentum
        let ang_momentum = velocity.cross(position);
        let ang_momentum_len = ang_momentum.length();

        // Step 2: Eccentricity
        let ecc_vec = ang_momentum.cross(velocity).safe_div(mu) - position.safe_div(altitude);
        let eccentricity = ecc_vec.length();

        // Step 3: Semi-major axis, from the vis-viva equation
        let semimajor_axis = safe_div(mu * altitude, 2.0 * mu - speed_sq * altitude);

        // Step 4: Inclination
        let inclination = math::acos(safe_div(ang_momentum.y, ang_momentum_len))?;

        // Step 5: Longitude of the ascending node
        let node = -UP.cross(ang_momentum);
        let equatorial = node.length() <= EQUATORIAL_EPSILON * ang_momentum_len;
        let node = if equatorial { REFERENCE_AXIS } else { node };
        let node_len = node.length();

        let lon_asc_node = {
            let tmp = math::acos(safe_div(node.x, node_len))?;
            if node.z >= 0.0 {
                tmp
            } else {
                TAU - tmp
            }
        };

        // The direction of motion is a right-handed rotation about -h
        let motion_axis = -ang_momentum;

        // Step 6: Argument of periapsis
        let circular = eccentricity < CIRCULAR_EPSILON;
        let arg_periapsis = if circular {
            0.0
        } else if equatorial {
            node.signed_angle(ecc_vec, motion_axis)
        } else {
            let tmp = math::acos(safe_div(node.dot(ecc_vec), node_len * eccentricity))?;
            if ecc_vec.y >= 0.0 {
                tmp
            } else {
                TAU - tmp
            }
        };

        // Step 7: True anomaly
        let true_anomaly = if circular {
            node.signed_angle(position, motion_axis)
        } else {
            let tmp = math::acos(safe_div(ecc_vec.dot(position), eccentricity * altitude))?;
            if position.dot(velocity) >= 0.0 {
                tmp
            } else {
                TAU - tmp
            }
        };

        Ok(OrbitalElements {
            semimajor_axis,
            eccentricity,
            inclination,
            lon_asc_node: normalize_angle(lon_asc_node),
            arg_periapsis: normalize_angle(arg_periapsis),
            true_anomaly: normalize_angle(true_anomaly),
            ..Default::default()
        })
    }
}
