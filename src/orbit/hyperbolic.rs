use glam::{DQuat, DVec3};

use super::{orient_cache, OrbitTrait, SamplePoint, TrajectoryFamily};
use crate::elements::ElementCache;
use crate::math::{self, normalize_angle, safe_div, wrap_angle};
use crate::solvers::newton_raphson;
use crate::vector::Vector3Ext;
use crate::{MathError, OrbitError, OrbitalElements, SolverConfig};

/// An open trajectory, with an eccentricity above 1.
///
/// By convention the semi-major axis and the semi-latus rectum are negative.
/// The mean and hyperbolic anomalies are signed and unbounded: negative while
/// approaching periapsis, positive after.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperbolicOrbit {
    elements: OrbitalElements,
    mu: f64,
}

impl HyperbolicOrbit {
    /// Creates a hyperbolic trajectory from an element set, recomputing every
    /// derived field.
    ///
    /// # Errors
    /// [`OrbitError::UnsupportedTrajectory`] unless `e > 1`.
    /// [`OrbitError::Math`] if the true anomaly lies beyond the asymptotes.
    pub fn new(elements: OrbitalElements, mu: f64) -> Result<Self, OrbitError> {
        if TrajectoryFamily::from_eccentricity(elements.eccentricity)
            != Some(TrajectoryFamily::Hyperbolic)
        {
            return Err(OrbitError::UnsupportedTrajectory {
                eccentricity: elements.eccentricity,
            });
        }

        Ok(Self {
            elements: Self::complete(elements, mu)?,
            mu,
        })
    }

    fn complete(base: OrbitalElements, mu: f64) -> Result<OrbitalElements, MathError> {
        let a = base.semimajor_axis;
        let e = base.eccentricity;

        let mut elements = OrbitalElements {
            semimajor_axis: a,
            eccentricity: e,
            inclination: base.inclination,
            lon_asc_node: normalize_angle(base.lon_asc_node),
            arg_periapsis: normalize_angle(base.arg_periapsis),
            true_anomaly: normalize_angle(base.true_anomaly),
            cache: ElementCache::from_orientation(base.inclination, base.lon_asc_node)?,
            ..Default::default()
        };

        let neg_a_cubed = math::powi(-a, 3)?;
        elements.semiminor_axis = -a * math::sqrt(e * e - 1.0)?;
        elements.mean_motion = math::sqrt(safe_div(mu, neg_a_cubed))?;
        elements.semi_latus_rectum = a * (e * e - 1.0);
        elements.cache.period_constant = math::sqrt(safe_div(neg_a_cubed, mu))?;
        elements.cache.true_anomaly_constant = math::sqrt((e + 1.0) / (e - 1.0))?;
        elements.period = f64::INFINITY;

        orient_cache(&mut elements, mu)?;

        let orbit = Self { elements, mu };
        let hyperbolic_anomaly = orbit.get_eccentric_anomaly_at_true_anomaly(elements.true_anomaly)?;
        let mean_anomaly = orbit.get_mean_anomaly_at_eccentric_anomaly(hyperbolic_anomaly)?;

        elements.anomaly = hyperbolic_anomaly;
        elements.mean_anomaly = mean_anomaly;
        elements.time_to_periapsis = -mean_anomaly * elements.cache.period_constant;

        Ok(elements)
    }

    /// Gets the true anomaly of the outgoing asymptote, `acos(-1/e)`.
    ///
    /// The incoming asymptote is at the negation of this angle.
    pub fn get_asymptote_true_anomaly(&self) -> Result<f64, MathError> {
        math::acos(-1.0 / self.elements.eccentricity)
    }
}

impl OrbitTrait for HyperbolicOrbit {
    #[inline]
    fn get_elements(&self) -> &OrbitalElements {
        &self.elements
    }

    #[inline]
    fn get_gravitational_parameter(&self) -> f64 {
        self.mu
    }

    #[inline]
    fn get_family(&self) -> TrajectoryFamily {
        TrajectoryFamily::Hyperbolic
    }

    /// Gets the hyperbolic anomaly at a given true anomaly.
    ///
    /// # Errors
    /// True anomalies at or beyond the asymptotes have no hyperbolic anomaly,
    /// and fault with [`MathError::NonFiniteResult`].
    fn get_eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        // tanh(H/2) = tan(ν/2) / sqrt((e + 1) / (e - 1))
        let half_tan = math::tan(0.5 * true_anomaly)?;
        let k = self.elements.cache.true_anomaly_constant;
        Ok(2.0 * math::atanh(safe_div(half_tan, k))?)
    }

    fn get_true_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        let half_tanh = math::tanh(0.5 * eccentric_anomaly)?;
        let k = self.elements.cache.true_anomaly_constant;
        Ok(normalize_angle(2.0 * math::atan(k * half_tanh)?))
    }

    fn get_mean_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        Ok(self.elements.eccentricity * math::sinh(eccentric_anomaly)? - eccentric_anomaly)
    }

    /// Gets the hyperbolic anomaly at a given mean anomaly.
    ///
    /// Newton-Raphson is seeded with `asinh(M / e)`, which stays within a few
    /// iterations of the root even far out along the asymptotes where
    /// seeding with `M` itself would not converge within the iteration cap.
    fn get_eccentric_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
        solver: &SolverConfig,
    ) -> Result<f64, MathError> {
        let e = self.elements.eccentricity;
        let seed = math::asinh(safe_div(mean_anomaly, e))?;

        newton_raphson(
            seed,
            |x| Ok(e * math::sinh(x)? - x - mean_anomaly),
            |x| Ok(e * math::cosh(x)? - 1.0),
            solver,
        )
    }

    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        let e = self.elements.eccentricity;
        Ok(safe_div(
            -self.elements.semi_latus_rectum,
            1.0 + e * math::cos(true_anomaly)?,
        ))
    }

    /// Gets the position at a given true anomaly, by rotating the periapsis
    /// direction about the angular momentum.
    fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3, MathError> {
        let distance = self.get_altitude_at_true_anomaly(true_anomaly)?;
        let periapsis_direction = self.elements.cache.ecc_vec.safe_normalize();

        // Motion is a right-handed rotation about -h
        let axis = -self.elements.cache.plane_normal();
        let direction = DQuat::from_axis_angle(axis, true_anomaly) * periapsis_direction;

        Ok(distance * direction)
    }

    fn propagated(&self, dt: f64, solver: &SolverConfig) -> Result<Self, MathError> {
        let mean_anomaly = self.get_mean_anomaly_after(dt);
        let hyperbolic_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly, solver)?;
        let true_anomaly = self.get_true_anomaly_at_eccentric_anomaly(hyperbolic_anomaly)?;

        let mut elements = self.elements;
        elements.mean_anomaly = mean_anomaly;
        elements.anomaly = hyperbolic_anomaly;
        elements.true_anomaly = true_anomaly;
        elements.time_to_periapsis = -mean_anomaly * elements.cache.period_constant;

        Ok(Self {
            elements,
            mu: self.mu,
        })
    }

    fn get_sample_points(
        &self,
        resolution: usize,
        solver: &SolverConfig,
    ) -> Result<Vec<SamplePoint>, MathError> {
        let start = wrap_angle(self.elements.true_anomaly);
        let end = self.get_asymptote_true_anomaly()? - solver.asymptote_margin;

        if start >= end {
            return self.get_sample_points_past_window(resolution);
        }

        let step = safe_div(end - start, resolution as f64);
        let start_mean = self.get_mean_anomaly_at_true_anomaly(start)?;

        (0..resolution)
            .map(|i| {
                let true_anomaly = start + step * i as f64;
                let time = if i == 0 {
                    0.0
                } else {
                    let mean_anomaly = self.get_mean_anomaly_at_true_anomaly(true_anomaly)?;
                    safe_div(mean_anomaly - start_mean, self.elements.mean_motion)
                };

                Ok(SamplePoint {
                    time,
                    true_anomaly: normalize_angle(true_anomaly),
                })
            })
            .collect()
    }
}

/// How much further out than its current distance a body past the sampling
/// window is followed.
const PAST_WINDOW_REACH: f64 = 1e3;

impl HyperbolicOrbit {
    /// Samples a body that is already beyond `ν∞ - margin`.
    ///
    /// Steps are even in hyperbolic anomaly, from the current one out to where
    /// the distance has grown by [`PAST_WINDOW_REACH`]. True anomaly barely
    /// moves out there, so it cannot be the stepping variable.
    fn get_sample_points_past_window(
        &self,
        resolution: usize,
    ) -> Result<Vec<SamplePoint>, MathError> {
        let a = self.elements.semimajor_axis;
        let e = self.elements.eccentricity;
        let start = self.elements.anomaly;
        let start_mean = self.elements.mean_anomaly;

        // r = -a (e cosh H - 1)
        let distance = self.get_altitude_at_true_anomaly(self.elements.true_anomaly)?;
        let far_cosh = safe_div(safe_div(PAST_WINDOW_REACH * distance, -a) + 1.0, e);
        let end = math::acosh(far_cosh)?.max(start);
        let step = safe_div(end - start, resolution as f64);

        tracing::trace!(
            true_anomaly = self.elements.true_anomaly,
            start,
            end,
            "sampling past the true anomaly window"
        );

        (0..resolution)
            .map(|i| {
                let hyperbolic_anomaly = start + step * i as f64;
                let time = if i == 0 {
                    0.0
                } else {
                    let mean_anomaly =
                        self.get_mean_anomaly_at_eccentric_anomaly(hyperbolic_anomaly)?;
                    safe_div(mean_anomaly - start_mean, self.elements.mean_motion)
                };

                Ok(SamplePoint {
                    time,
                    true_anomaly: self.get_true_anomaly_at_eccentric_anomaly(hyperbolic_anomaly)?,
                })
            })
            .collect()
    }
}
