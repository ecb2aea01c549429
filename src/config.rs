//! Simulation-wide configuration.
//!
//! A [`SimulationConfig`] is built once by the host, handed to the
//! [`Universe`][crate::Universe] (or directly to
//! [`KeplerianOrbit`][crate::KeplerianOrbit] constructors) and read from then
//! on. There is no global state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The gravitational constant, in m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Iteration caps and tolerances for the numerical solvers.
///
/// The caps are hard ceilings: a solver that runs out of iterations returns
/// its last estimate instead of failing, which keeps the worst-case cost of a
/// frame bounded.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// The maximum number of Newton-Raphson iterations used to solve
    /// Kepler's equation.
    pub newton_max_iterations: u32,

    /// Newton-Raphson stops once consecutive estimates differ by less than this.
    pub newton_tolerance: f64,

    /// The maximum number of bisection steps used to pinpoint a transition.
    pub bisection_max_iterations: u32,

    /// Bisection stops once the squared-distance difference to the boundary
    /// is below this.
    pub bisection_tolerance: f64,

    /// How far short of the asymptote, in radians of true anomaly,
    /// hyperbolic sampling stops.
    pub asymptote_margin: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            newton_max_iterations: 10,
            newton_tolerance: 1e-6,
            bisection_max_iterations: 50,
            bisection_tolerance: 0.5,
            asymptote_margin: 0.01,
        }
    }
}

/// Configuration shared by every orbit in a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// The gravitational constant `G`.
    ///
    /// Defaults to [`GRAVITATIONAL_CONSTANT`]. Games commonly use a scaled value.
    pub gravitational_constant: f64,

    /// The falloff constant used to derive a body's influence radius as
    /// `sqrt(G * mass / falloff)`.
    ///
    /// When `None`, only bodies with an explicit
    /// [`influence_radius`][crate::Body::influence_radius] have a bounded
    /// sphere of influence.
    pub influence_falloff: Option<f64>,

    /// Settings for the numerical solvers.
    pub solver: SolverConfig,
}

impl SimulationConfig {
    /// Gets the gravitational parameter `GM` of a body of the given mass.
    #[inline]
    pub fn gravitational_parameter(&self, mass: f64) -> f64 {
        self.gravitational_constant * mass
    }

    /// Gets the influence radius derived from the configured falloff,
    /// or `None` when no falloff is configured.
    ///
    /// # Example
    /// ```
    /// use patched_conics::SimulationConfig;
    ///
    /// let config = SimulationConfig {
    ///     gravitational_constant: 1.0,
    ///     influence_falloff: Some(0.1),
    ///     ..Default::default()
    /// };
    ///
    /// assert_eq!(config.influence_radius(1000.0), Some(100.0));
    /// assert_eq!(SimulationConfig::default().influence_radius(1000.0), None);
    /// ```
    pub fn influence_radius(&self, mass: f64) -> Option<f64> {
        let falloff = self.influence_falloff?;
        if falloff <= 0.0 {
            return None;
        }
        Some((self.gravitational_parameter(mass) / falloff).sqrt())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            influence_falloff: None,
            solver: SolverConfig::default(),
        }
    }
}
