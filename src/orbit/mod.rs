//! Trajectory models.
//!
//! An orbit is either closed ([`EllipticOrbit`]) or open ([`HyperbolicOrbit`]).
//! Both share the [`OrbitTrait`] contract, and [`Orbit`] is the closed sum of
//! the two that the rest of the crate passes around.

mod elliptic;
mod hyperbolic;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::{self, safe_div};
use crate::vector::Vector3Ext;
use crate::{MathError, OrbitError, OrbitalElements, SolverConfig, StateVectors};

pub use elliptic::EllipticOrbit;
pub use hyperbolic::HyperbolicOrbit;

/// The family of conic section a trajectory belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrajectoryFamily {
    /// A closed orbit, `0 <= e < 1`.
    Elliptic,
    /// An open trajectory, `e > 1`.
    Hyperbolic,
}

impl TrajectoryFamily {
    /// Classifies an eccentricity.
    ///
    /// Returns `None` for parabolic trajectories (`e == 1`), which are not
    /// supported, and for negative or non-finite eccentricities.
    ///
    /// # Example
    /// ```
    /// use patched_conics::TrajectoryFamily;
    ///
    /// assert_eq!(TrajectoryFamily::from_eccentricity(0.0), Some(TrajectoryFamily::Elliptic));
    /// assert_eq!(TrajectoryFamily::from_eccentricity(1.5), Some(TrajectoryFamily::Hyperbolic));
    /// assert_eq!(TrajectoryFamily::from_eccentricity(1.0), None);
    /// assert_eq!(TrajectoryFamily::from_eccentricity(f64::NAN), None);
    /// ```
    pub fn from_eccentricity(eccentricity: f64) -> Option<Self> {
        if !eccentricity.is_finite() || eccentricity < 0.0 {
            None
        } else if eccentricity < 1.0 {
            Some(Self::Elliptic)
        } else if eccentricity > 1.0 {
            Some(Self::Hyperbolic)
        } else {
            None
        }
    }
}

/// One coarse sample of a future path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    /// Time since the orbit's current epoch.
    pub time: f64,
    /// The true anomaly at that time, in `[0, 2π)`.
    pub true_anomaly: f64,
}

/// A trait that defines the methods that a Keplerian trajectory should implement.
///
/// The family-specific formulas (anomaly conversions, distance, position and
/// propagation) are required methods; everything built on top of them is
/// provided.
///
/// # Fallibility
/// Every method that evaluates a trigonometric or hyperbolic function goes
/// through [`crate::math`] and therefore returns a [`MathError`] if a
/// non-finite value shows up. Such a fault means the orbit itself holds
/// corrupt data.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use patched_conics::{Orbit, OrbitTrait, StateVectors};
///
/// let sv = StateVectors::new(DVec3::new(30.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 7.7));
/// let orbit = Orbit::from_state_vectors(sv, 7.7 * 7.7 * 30.0).unwrap();
///
/// let position = orbit.get_position_at_true_anomaly(orbit.get_true_anomaly()).unwrap();
/// assert!((position - sv.position).length() < 1e-9);
/// ```
pub trait OrbitTrait {
    /// Gets the element set of the orbit.
    fn get_elements(&self) -> &OrbitalElements;

    /// Gets the gravitational parameter of the central body, `GM`.
    fn get_gravitational_parameter(&self) -> f64;

    /// Gets the family this orbit belongs to.
    fn get_family(&self) -> TrajectoryFamily;

    /// Gets the eccentric anomaly (elliptic) or hyperbolic anomaly
    /// (hyperbolic) at a given true anomaly.
    ///
    /// This uses the half-angle tangent substitution and does not need
    /// any numerical methods.
    fn get_eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError>;

    /// Gets the true anomaly at a given eccentric (or hyperbolic) anomaly.
    ///
    /// The result is normalized into `[0, 2π)`.
    fn get_true_anomaly_at_eccentric_anomaly(&self, eccentric_anomaly: f64)
        -> Result<f64, MathError>;

    /// Gets the mean anomaly at a given eccentric (or hyperbolic) anomaly,
    /// using Kepler's equation.
    ///
    /// The result is not normalized.
    fn get_mean_anomaly_at_eccentric_anomaly(&self, eccentric_anomaly: f64)
        -> Result<f64, MathError>;

    /// Gets the eccentric (or hyperbolic) anomaly at a given mean anomaly.
    ///
    /// # Performance
    /// This solves Kepler's equation with Newton-Raphson, capped at
    /// [`newton_max_iterations`][SolverConfig::newton_max_iterations].
    /// It is the most expensive step of propagating an orbit.
    fn get_eccentric_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
        solver: &SolverConfig,
    ) -> Result<f64, MathError>;

    /// Gets the distance from the central body at a given true anomaly.
    ///
    /// # Unchecked Operation
    /// For hyperbolic trajectories, a true anomaly past the asymptotes gives
    /// a negative, meaningless distance.
    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError>;

    /// Gets the position relative to the central body at a given true anomaly.
    fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3, MathError>;

    /// Returns a copy of this orbit advanced by `dt`.
    ///
    /// The mean anomaly advances linearly; the eccentric and true anomalies
    /// follow from it. `dt` may be negative.
    fn propagated(&self, dt: f64, solver: &SolverConfig) -> Result<Self, MathError>
    where
        Self: Sized;

    /// Gets `resolution` coarse samples of the path ahead, starting at the
    /// current epoch.
    ///
    /// Elliptic orbits are sampled evenly in eccentric anomaly over one
    /// revolution. Hyperbolic trajectories are sampled evenly in true anomaly
    /// up to [`asymptote_margin`][SolverConfig::asymptote_margin] short of
    /// the outgoing asymptote.
    ///
    /// The first sample is always at time zero.
    fn get_sample_points(
        &self,
        resolution: usize,
        solver: &SolverConfig,
    ) -> Result<Vec<SamplePoint>, MathError>;

    /// Gets the semi-major axis of the orbit.
    ///
    /// This is negative for hyperbolic trajectories.
    #[inline]
    fn get_semi_major_axis(&self) -> f64 {
        self.get_elements().semimajor_axis
    }

    /// Gets the eccentricity of the orbit.
    #[inline]
    fn get_eccentricity(&self) -> f64 {
        self.get_elements().eccentricity
    }

    /// Gets the inclination of the orbit, in radians.
    #[inline]
    fn get_inclination(&self) -> f64 {
        self.get_elements().inclination
    }

    /// Gets the longitude of the ascending node, in radians.
    #[inline]
    fn get_lon_asc_node(&self) -> f64 {
        self.get_elements().lon_asc_node
    }

    /// Gets the argument of periapsis, in radians.
    #[inline]
    fn get_arg_periapsis(&self) -> f64 {
        self.get_elements().arg_periapsis
    }

    /// Gets the true anomaly at the current epoch.
    #[inline]
    fn get_true_anomaly(&self) -> f64 {
        self.get_elements().true_anomaly
    }

    /// Gets the mean anomaly at the current epoch.
    #[inline]
    fn get_mean_anomaly(&self) -> f64 {
        self.get_elements().mean_anomaly
    }

    /// Gets the mean motion, in radians per unit of time.
    #[inline]
    fn get_mean_motion(&self) -> f64 {
        self.get_elements().mean_motion
    }

    /// Gets the orbital period.
    ///
    /// This is infinite for hyperbolic trajectories.
    #[inline]
    fn get_orbital_period(&self) -> f64 {
        self.get_elements().period
    }

    /// Gets the periapsis distance, `a (1 - e)`.
    ///
    /// # Example
    /// ```
    /// use glam::DVec3;
    /// use patched_conics::{Orbit, OrbitTrait, StateVectors};
    ///
    /// let sv = StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0));
    /// let orbit = Orbit::from_state_vectors(sv, 1000.0).unwrap();
    ///
    /// assert!((orbit.get_periapsis() - 10.0).abs() < 1e-9);
    /// ```
    fn get_periapsis(&self) -> f64 {
        self.get_semi_major_axis() * (1.0 - self.get_eccentricity())
    }

    /// Gets the apoapsis distance, `a (1 + e)`.
    ///
    /// Hyperbolic trajectories never reach an apoapsis, so this returns
    /// infinity for them.
    fn get_apoapsis(&self) -> f64 {
        match self.get_family() {
            TrajectoryFamily::Elliptic => {
                self.get_semi_major_axis() * (1.0 + self.get_eccentricity())
            }
            TrajectoryFamily::Hyperbolic => f64::INFINITY,
        }
    }

    /// Gets the mean anomaly at a given true anomaly.
    fn get_mean_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        let eccentric_anomaly = self.get_eccentric_anomaly_at_true_anomaly(true_anomaly)?;
        self.get_mean_anomaly_at_eccentric_anomaly(eccentric_anomaly)
    }

    /// Gets the true anomaly at a given mean anomaly.
    ///
    /// # Performance
    /// This goes through
    /// [`get_eccentric_anomaly_at_mean_anomaly`][OrbitTrait::get_eccentric_anomaly_at_mean_anomaly]
    /// and so solves Kepler's equation numerically.
    fn get_true_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
        solver: &SolverConfig,
    ) -> Result<f64, MathError> {
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly, solver)?;
        self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly)
    }

    /// Gets the mean anomaly `dt` after the current epoch, without any wrapping.
    #[inline]
    fn get_mean_anomaly_after(&self, dt: f64) -> f64 {
        self.get_mean_anomaly() + self.get_mean_motion() * dt
    }

    /// Gets the speed at a given distance from the central body.
    ///
    /// The speed is derived from the vis-viva equation:
    /// `v^2 = GM (2/r - 1/a)`.
    ///
    /// # Speed vs. Velocity
    /// Speed is not to be confused with velocity.
    /// Speed tells you how fast something is moving,
    /// while velocity tells you how fast *and in what direction* it's moving in.
    fn get_speed_at_altitude(&self, altitude: f64) -> Result<f64, MathError> {
        let energy_term = safe_div(2.0, altitude) - safe_div(1.0, self.get_semi_major_axis());

        // Rounding can push this just below zero at apoapsis
        math::sqrt((energy_term * self.get_gravitational_parameter()).max(0.0))
    }

    /// Gets the velocity relative to the central body at a given true anomaly.
    ///
    /// The speed comes from
    /// [`get_speed_at_altitude`][OrbitTrait::get_speed_at_altitude], and the
    /// direction is the local transverse direction tilted outwards by the
    /// flight path angle `atan(e sin ν / (1 + e cos ν))`.
    fn get_velocity_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3, MathError> {
        let eccentricity = self.get_eccentricity();
        let position = self.get_position_at_true_anomaly(true_anomaly)?;
        let speed = self.get_speed_at_altitude(position.length())?;

        let (sin_ta, cos_ta) = (math::sin(true_anomaly)?, math::cos(true_anomaly)?);
        let flight_path_angle =
            math::atan(safe_div(eccentricity * sin_ta, 1.0 + eccentricity * cos_ta))?;

        let radial = position.safe_normalize();
        let transverse = radial.cross(self.get_elements().cache.plane_normal());

        Ok(speed
            * (math::sin(flight_path_angle)? * radial + math::cos(flight_path_angle)? * transverse))
    }

    /// Gets the state vectors at a given true anomaly.
    fn get_state_vectors_at_true_anomaly(
        &self,
        true_anomaly: f64,
    ) -> Result<StateVectors, MathError> {
        Ok(StateVectors {
            position: self.get_position_at_true_anomaly(true_anomaly)?,
            velocity: self.get_velocity_at_true_anomaly(true_anomaly)?,
        })
    }

    /// Gets the state vectors at the current epoch.
    fn get_state_vectors(&self) -> Result<StateVectors, MathError> {
        self.get_state_vectors_at_true_anomaly(self.get_true_anomaly())
    }

    /// Predicts the state vectors `dt` after the current epoch, without
    /// changing the orbit.
    fn get_state_vectors_after(
        &self,
        dt: f64,
        solver: &SolverConfig,
    ) -> Result<StateVectors, MathError>
    where
        Self: Sized,
    {
        self.propagated(dt, solver)?.get_state_vectors()
    }

    /// Predicts the position `dt` after the current epoch, without changing
    /// the orbit.
    fn get_position_after(&self, dt: f64, solver: &SolverConfig) -> Result<DVec3, MathError>
    where
        Self: Sized,
    {
        let orbit = self.propagated(dt, solver)?;
        orbit.get_position_at_true_anomaly(orbit.get_true_anomaly())
    }
}

/// A Keplerian trajectory of either family.
///
/// Switching family means building a new `Orbit`; a variant is never
/// converted in place.
#[derive(Clone, Debug, PartialEq)]
pub enum Orbit {
    /// A closed orbit.
    Elliptic(EllipticOrbit),
    /// An open trajectory.
    Hyperbolic(HyperbolicOrbit),
}

impl Orbit {
    /// Builds the orbit described by an element set.
    ///
    /// The shape (`semimajor_axis`, `eccentricity`), the orientation
    /// (`inclination`, `lon_asc_node`, `arg_periapsis`) and the
    /// `true_anomaly` are authoritative. Every other field, including the
    /// cache, is recomputed.
    ///
    /// # Errors
    /// [`OrbitError::UnsupportedTrajectory`] if no family models the
    /// eccentricity, or [`OrbitError::Math`] if the element set is corrupt.
    pub fn create(elements: OrbitalElements, mu: f64) -> Result<Orbit, OrbitError> {
        match TrajectoryFamily::from_eccentricity(elements.eccentricity) {
            Some(TrajectoryFamily::Elliptic) => {
                EllipticOrbit::new(elements, mu).map(Orbit::Elliptic)
            }
            Some(TrajectoryFamily::Hyperbolic) => {
                HyperbolicOrbit::new(elements, mu).map(Orbit::Hyperbolic)
            }
            None => Err(OrbitError::UnsupportedTrajectory {
                eccentricity: elements.eccentricity,
            }),
        }
    }

    /// Builds the orbit passing through a pair of state vectors.
    ///
    /// # Mu
    /// Mu is the gravitational parameter of the central body, equal to `GM`.
    pub fn from_state_vectors(state_vectors: StateVectors, mu: f64) -> Result<Orbit, OrbitError> {
        Self::create(state_vectors.to_elements(mu)?, mu)
    }
}

macro_rules! dispatch {
    ($self:ident, $orbit:ident => $body:expr) => {
        match $self {
            Orbit::Elliptic($orbit) => $body,
            Orbit::Hyperbolic($orbit) => $body,
        }
    };
}

impl OrbitTrait for Orbit {
    fn get_elements(&self) -> &OrbitalElements {
        dispatch!(self, orbit => orbit.get_elements())
    }

    fn get_gravitational_parameter(&self) -> f64 {
        dispatch!(self, orbit => orbit.get_gravitational_parameter())
    }

    fn get_family(&self) -> TrajectoryFamily {
        dispatch!(self, orbit => orbit.get_family())
    }

    fn get_eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        dispatch!(self, orbit => orbit.get_eccentric_anomaly_at_true_anomaly(true_anomaly))
    }

    fn get_true_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        dispatch!(self, orbit => orbit.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly))
    }

    fn get_mean_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        dispatch!(self, orbit => orbit.get_mean_anomaly_at_eccentric_anomaly(eccentric_anomaly))
    }

    fn get_eccentric_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
        solver: &SolverConfig,
    ) -> Result<f64, MathError> {
        dispatch!(self, orbit => orbit.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly, solver))
    }

    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        dispatch!(self, orbit => orbit.get_altitude_at_true_anomaly(true_anomaly))
    }

    fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3, MathError> {
        dispatch!(self, orbit => orbit.get_position_at_true_anomaly(true_anomaly))
    }

    fn propagated(&self, dt: f64, solver: &SolverConfig) -> Result<Self, MathError> {
        Ok(match self {
            Orbit::Elliptic(orbit) => Orbit::Elliptic(orbit.propagated(dt, solver)?),
            Orbit::Hyperbolic(orbit) => Orbit::Hyperbolic(orbit.propagated(dt, solver)?),
        })
    }

    fn get_sample_points(
        &self,
        resolution: usize,
        solver: &SolverConfig,
    ) -> Result<Vec<SamplePoint>, MathError> {
        dispatch!(self, orbit => orbit.get_sample_points(resolution, solver))
    }
}

impl From<EllipticOrbit> for Orbit {
    fn from(orbit: EllipticOrbit) -> Self {
        Orbit::Elliptic(orbit)
    }
}

impl From<HyperbolicOrbit> for Orbit {
    fn from(orbit: HyperbolicOrbit) -> Self {
        Orbit::Hyperbolic(orbit)
    }
}

/// Fills in the orientation-derived cache fields shared by both families:
/// the angular momentum and eccentricity vectors.
///
/// `semi_latus_rectum` is taken by magnitude, so the hyperbolic sign
/// convention does not matter here.
pub(crate) fn orient_cache(elements: &mut OrbitalElements, mu: f64) -> Result<(), MathError> {
    let cache = &mut elements.cache;
    let (sin_pe, cos_pe) = (
        math::sin(elements.arg_periapsis)?,
        math::cos(elements.arg_periapsis)?,
    );

    let periapsis_direction =
        cos_pe * cache.node_direction() + sin_pe * cache.transverse_node_direction();

    cache.ecc_vec = elements.eccentricity * periapsis_direction;
    cache.ang_momentum =
        math::sqrt(mu * elements.semi_latus_rectum.abs())? * cache.plane_normal();

    Ok(())
}
