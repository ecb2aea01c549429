//! # Patched Conics
//! This library crate contains logic for Keplerian orbits and the
//! sphere-of-influence hand-offs between them, similar to what you'd find in
//! a game like Kerbal Space Program.
//!
//! Keplerian orbits don't use time steps to integrate motion. A body's state
//! vectors pin down its *full trajectory*, so advancing it by any amount of
//! time costs the same and lag can't destabilize it.
//!
//! Keplerian orbits are two-body solutions: every body only feels the gravity
//! of its current central body. To travel between bodies, a trajectory is
//! patched together from several conics: when a craft leaves the sphere of
//! influence of its central body, or enters the sphere of influence of a
//! sibling, it continues on a new orbit around the new central body.
//!
//! ## Getting started
//! This crate provides these main types:
//! - [`Orbit`]: a trajectory, either [elliptic][EllipticOrbit] or
//!   [hyperbolic][HyperbolicOrbit]. The shared [`OrbitTrait`] converts between
//!   anomalies and gives positions and velocities.
//! - [`KeplerianOrbit`]: the orbit of one body. It owns the current [`Orbit`],
//!   advances it every frame, and swaps the trajectory family when an edit
//!   (like a burn) requires it.
//! - [`Universe`]: a hierarchy of [`Body`]s. It advances every orbit, samples
//!   future paths with [`sample_path`][Universe::sample_path], and re-parents
//!   bodies with [`apply_transition`][Universe::apply_transition].
//!
//! All trigonometry goes through the guarded functions in [`math`]. A NaN or
//! infinity anywhere in an orbit surfaces as a [`MathError`] instead of
//! silently spreading.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//!
//! use patched_conics::{KeplerianOrbit, SolverConfig, StateVectors, TrajectoryFamily};
//!
//! # fn main() {
//! // A circular orbit with a radius of 30
//! let sv = StateVectors::new(DVec3::new(30.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 7.7));
//! let mut orbit = KeplerianOrbit::from_state_vectors(sv, 7.7 * 7.7 * 30.0, SolverConfig::default())
//!     .unwrap();
//!
//! assert_eq!(orbit.family(), TrajectoryFamily::Elliptic);
//!
//! let sv = orbit.update(1.0).unwrap();
//! assert!((sv.position.length() - 30.0).abs() < 1e-6);
//! # }
//! ```

#![warn(missing_docs)]

mod body;
mod config;
mod elements;
mod error;
mod keplerian_orbit;
pub mod math;
mod orbit;
pub mod sampling;
pub mod solvers;
mod state_vectors;
mod universe;
pub mod vector;

pub use body::Body;
pub use config::{SimulationConfig, SolverConfig, GRAVITATIONAL_CONSTANT};
pub use elements::{ElementCache, OrbitalElements};
pub use error::{MathError, OrbitError, UniverseError};
pub use keplerian_orbit::KeplerianOrbit;
pub use orbit::{
    EllipticOrbit, HyperbolicOrbit, Orbit, OrbitTrait, SamplePoint, TrajectoryFamily,
};
pub use sampling::{OrbitPath, Surroundings, Transition, TransitionKind};
pub use state_vectors::StateVectors;
pub use universe::{BodyId, BodyRelation, Universe};
pub use vector::{Vector3Double, Vector3Ext};

#[cfg(test)]
mod tests;
