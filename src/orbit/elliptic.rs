use core::f64::consts::TAU;

use glam::DVec3;

use super::{orient_cache, OrbitTrait, SamplePoint, TrajectoryFamily};
use crate::elements::ElementCache;
use crate::math::{self, normalize_angle, safe_div, wrap_angle};
use crate::solvers::newton_raphson;
use crate::{MathError, OrbitError, OrbitalElements, SolverConfig};

/// A closed orbit, with an eccentricity in `[0, 1)`.
///
/// The mean, eccentric and true anomalies are all kept in `[0, 2π)`.
#[derive(Clone, Debug, PartialEq)]
pub struct EllipticOrbit {
    elements: OrbitalElements,
    mu: f64,
}

impl EllipticOrbit {
    /// Creates an elliptic orbit from an element set, recomputing every
    /// derived field.
    ///
    /// # Errors
    /// [`OrbitError::UnsupportedTrajectory`] unless `0 <= e < 1`.
    pub fn new(elements: OrbitalElements, mu: f64) -> Result<Self, OrbitError> {
        if TrajectoryFamily::from_eccentricity(elements.eccentricity)
            != Some(TrajectoryFamily::Elliptic)
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

        let a_cubed = math::powi(a, 3)?;
        elements.semiminor_axis = a * math::sqrt(1.0 - e * e)?;
        elements.mean_motion = math::sqrt(safe_div(mu, a_cubed))?;
        elements.semi_latus_rectum = a * (1.0 - e * e);
        elements.cache.period_constant = math::sqrt(safe_div(a_cubed, mu))?;
        elements.cache.true_anomaly_constant = math::sqrt((1.0 + e) / (1.0 - e))?;
        elements.period = TAU * elements.cache.period_constant;

        orient_cache(&mut elements, mu)?;

        // Anomalies follow from the (authoritative) true anomaly
        let orbit = Self { elements, mu };
        let eccentric_anomaly = orbit.get_eccentric_anomaly_at_true_anomaly(elements.true_anomaly)?;
        let mean_anomaly = orbit.get_mean_anomaly_at_eccentric_anomaly(eccentric_anomaly)?;

        elements.anomaly = normalize_angle(eccentric_anomaly);
        elements.mean_anomaly = normalize_angle(mean_anomaly);
        elements.time_to_periapsis = (TAU - elements.mean_anomaly) * elements.cache.period_constant;

        Ok(elements)
    }
}

impl OrbitTrait for EllipticOrbit {
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
        TrajectoryFamily::Elliptic
    }

    fn get_eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        // tan(E/2) = tan(ν/2) / sqrt((1 + e) / (1 - e))
        let half_tan = math::tan(0.5 * true_anomaly)?;
        let k = self.elements.cache.true_anomaly_constant;
        Ok(normalize_angle(2.0 * math::atan(safe_div(half_tan, k))?))
    }

    fn get_true_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        let half_tan = math::tan(0.5 * eccentric_anomaly)?;
        let k = self.elements.cache.true_anomaly_constant;
        Ok(normalize_angle(2.0 * math::atan(k * half_tan)?))
    }

    fn get_mean_anomaly_at_eccentric_anomaly(
        &self,
        eccentric_anomaly: f64,
    ) -> Result<f64, MathError> {
        Ok(eccentric_anomaly - self.elements.eccentricity * math::sin(eccentric_anomaly)?)
    }

    fn get_eccentric_anomaly_at_mean_anomaly(
        &self,
        mean_anomaly: f64,
        solver: &SolverConfig,
    ) -> Result<f64, MathError> {
        let e = self.elements.eccentricity;

        // Newton converges best with the mean anomaly in (-π, π]
        let mean_anomaly = wrap_angle(mean_anomaly);

        let eccentric_anomaly = newton_raphson(
            mean_anomaly,
            |x| Ok(x - e * math::sin(x)? - mean_anomaly),
            |x| Ok(1.0 - e * math::cos(x)?),
            solver,
        )?;

        Ok(normalize_angle(eccentric_anomaly))
    }

    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64) -> Result<f64, MathError> {
        let e = self.elements.eccentricity;
        Ok(safe_div(
            self.elements.semi_latus_rectum,
            1.0 + e * math::cos(true_anomaly)?,
        ))
    }

    fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3, MathError> {
        let distance = self.get_altitude_at_true_anomaly(true_anomaly)?;

        let arg_latitude = self.elements.arg_periapsis + true_anomaly;
        let (sin_u, cos_u) = (math::sin(arg_latitude)?, math::cos(arg_latitude)?);
        let (sin_inc, cos_inc) = self.elements.cache.sin_cos_inclination;
        let (sin_lan, cos_lan) = self.elements.cache.sin_cos_lon_asc_node;

        Ok(distance
            * DVec3::new(
                cos_lan * cos_u - sin_lan * cos_inc * sin_u,
                sin_inc * sin_u,
                sin_lan * cos_u + cos_lan * cos_inc * sin_u,
            ))
    }

    fn propagated(&self, dt: f64, solver: &SolverConfig) -> Result<Self, MathError> {
        let mean_anomaly = wrap_angle(self.get_mean_anomaly_after(dt));
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly, solver)?;
        let true_anomaly = self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly)?;

        let mut elements = self.elements;
        elements.mean_anomaly = normalize_angle(mean_anomaly);
        elements.anomaly = eccentric_anomaly;
        elements.true_anomaly = true_anomaly;
        elements.time_to_periapsis = (TAU - elements.mean_anomaly) * elements.cache.period_constant;

        Ok(Self {
            elements,
            mu: self.mu,
        })
    }

    fn get_sample_points(
        &self,
        resolution: usize,
        _solver: &SolverConfig,
    ) -> Result<Vec<SamplePoint>, MathError> {
        let start = self.elements.anomaly;
        let start_mean = self.get_mean_anomaly_at_eccentric_anomaly(start)?;
        let step = safe_div(TAU, resolution as f64);

        (0..resolution)
            .map(|i| {
                let eccentric_anomaly = start + step * i as f64;
                let time = if i == 0 {
                    0.0
                } else {
                    let mean_anomaly = self.get_mean_anomaly_at_eccentric_anomaly(eccentric_anomaly)?;
                    safe_div(mean_anomaly - start_mean, self.elements.mean_motion)
                };

                Ok(SamplePoint {
                    time,
                    true_anomaly: self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly)?,
                })
            })
            .collect()
    }
}
