use glam::DVec3;

use crate::sampling::{self, OrbitPath, Surroundings};
use crate::{
    MathError, Orbit, OrbitError, OrbitTrait, OrbitalElements, SimulationConfig, SolverConfig,
    StateVectors, TrajectoryFamily,
};

/// The orbit of one moving body.
///
/// A `KeplerianOrbit` owns the body's current [`Orbit`] together with the
/// state vectors at the current epoch, and is the only place where the
/// trajectory family gets swapped: whenever new state vectors land on the
/// other side of `e = 1`, the old variant is dropped and a new one is built.
///
/// # Example
/// ```
/// use glam::DVec3;
/// use patched_conics::{KeplerianOrbit, SolverConfig, StateVectors, TrajectoryFamily};
///
/// let sv = StateVectors::new(DVec3::new(30.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 7.7));
/// let mut orbit = KeplerianOrbit::from_state_vectors(sv, 7.7 * 7.7 * 30.0, SolverConfig::default())
///     .unwrap();
/// assert_eq!(orbit.family(), TrajectoryFamily::Elliptic);
///
/// // Burn prograde until the orbit opens up
/// orbit.apply_delta_v(DVec3::new(0.0, 0.0, 5.0)).unwrap();
/// assert_eq!(orbit.family(), TrajectoryFamily::Hyperbolic);
///
/// let next = orbit.update(1.0).unwrap();
/// assert!(next.position.length() > 30.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KeplerianOrbit {
    orbit: Orbit,
    state_vectors: StateVectors,
    mu: f64,
    solver: SolverConfig,
}

impl KeplerianOrbit {
    /// Creates the orbit passing through the given state vectors.
    ///
    /// # Mu
    /// Mu is the gravitational parameter of the central body, equal to `GM`.
    ///
    /// # Errors
    /// [`OrbitError::UnsupportedTrajectory`] for parabolic trajectories.
    pub fn from_state_vectors(
        state_vectors: StateVectors,
        mu: f64,
        solver: SolverConfig,
    ) -> Result<Self, OrbitError> {
        let orbit = Orbit::from_state_vectors(state_vectors, mu)?;
        Ok(Self {
            orbit,
            state_vectors,
            mu,
            solver,
        })
    }

    /// Creates the orbit of a body moving with the given state vectors
    /// around a central body of the given mass.
    pub fn around(
        state_vectors: StateVectors,
        central_mass: f64,
        config: &SimulationConfig,
    ) -> Result<Self, OrbitError> {
        Self::from_state_vectors(
            state_vectors,
            config.gravitational_parameter(central_mass),
            config.solver,
        )
    }

    /// Restores an orbit from a stored element snapshot.
    ///
    /// See [`Orbit::create`] for which fields are authoritative.
    pub fn from_elements(
        elements: OrbitalElements,
        mu: f64,
        solver: SolverConfig,
    ) -> Result<Self, OrbitError> {
        let orbit = Orbit::create(elements, mu)?;
        let state_vectors = orbit.get_state_vectors()?;
        Ok(Self {
            orbit,
            state_vectors,
            mu,
            solver,
        })
    }

    /// Advances the orbit by `dt` and returns the new state vectors.
    ///
    /// On a domain fault the orbit is left untouched.
    pub fn update(&mut self, dt: f64) -> Result<StateVectors, MathError> {
        let orbit = self.orbit.propagated(dt, &self.solver)?;
        let state_vectors = orbit.get_state_vectors()?;

        self.orbit = orbit;
        self.state_vectors = state_vectors;
        Ok(state_vectors)
    }

    /// Replaces the trajectory with the one passing through new state vectors
    /// around the same central body.
    ///
    /// The trajectory family is re-selected from the new eccentricity.
    pub fn set_state_vectors(&mut self, state_vectors: StateVectors) -> Result<(), OrbitError> {
        let orbit = Orbit::from_state_vectors(state_vectors, self.mu)?;

        if orbit.get_family() != self.orbit.get_family() {
            tracing::debug!(
                from = ?self.orbit.get_family(),
                to = ?orbit.get_family(),
                eccentricity = orbit.get_eccentricity(),
                "trajectory family changed"
            );
        }

        self.orbit = orbit;
        self.state_vectors = state_vectors;
        Ok(())
    }

    /// Changes the velocity by `delta_v`, keeping the position.
    pub fn apply_delta_v(&mut self, delta_v: DVec3) -> Result<(), OrbitError> {
        self.set_state_vectors(StateVectors {
            position: self.state_vectors.position,
            velocity: self.state_vectors.velocity + delta_v,
        })
    }

    /// Moves the body to a new central body.
    ///
    /// `state_vectors` must be relative to the new central body, whose
    /// gravitational parameter is `mu`. The orbit is rebuilt from scratch.
    pub fn set_central_body(
        &mut self,
        state_vectors: StateVectors,
        mu: f64,
    ) -> Result<(), OrbitError> {
        *self = Self::from_state_vectors(state_vectors, mu, self.solver)?;
        Ok(())
    }

    /// Predicts the state vectors `dt` from now, without changing the orbit.
    pub fn state_vectors_after(&self, dt: f64) -> Result<StateVectors, MathError> {
        self.orbit.get_state_vectors_after(dt, &self.solver)
    }

    /// Samples the path ahead and looks for the first sphere-of-influence
    /// transition. See [`sampling::sample_path`].
    pub fn sample_path(
        &self,
        surroundings: &Surroundings,
        resolution: usize,
    ) -> Result<OrbitPath, MathError> {
        sampling::sample_path(&self.orbit, surroundings, resolution, &self.solver)
    }

    /// Gets the current trajectory.
    #[inline]
    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Gets the current element set.
    #[inline]
    pub fn elements(&self) -> &OrbitalElements {
        self.orbit.get_elements()
    }

    /// Gets the current trajectory family.
    #[inline]
    pub fn family(&self) -> TrajectoryFamily {
        self.orbit.get_family()
    }

    /// Gets the state vectors at the current epoch.
    #[inline]
    pub fn state_vectors(&self) -> StateVectors {
        self.state_vectors
    }

    /// Gets the position relative to the central body.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.state_vectors.position
    }

    /// Gets the velocity relative to the central body.
    #[inline]
    pub fn velocity(&self) -> DVec3 {
        self.state_vectors.velocity
    }

    /// Gets the gravitational parameter of the central body.
    #[inline]
    pub fn gravitational_parameter(&self) -> f64 {
        self.mu
    }

    /// Gets the solver settings this orbit propagates with.
    #[inline]
    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }
}
