//! Error types shared across the crate.

use thiserror::Error;

use crate::BodyId;

/// A domain fault raised by the guarded math functions in [`crate::math`].
///
/// Domain faults are never recovered locally. They signal that a NaN or an
/// infinity reached an orbit formula, which is an upstream data bug rather
/// than a numerical condition worth working around.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// The function was handed a NaN or an infinity.
    #[error("{function}({input}) received a non-finite argument")]
    NonFiniteInput {
        /// Name of the guarded function.
        function: &'static str,
        /// The offending argument.
        input: f64,
    },

    /// The function was handed a finite argument but produced NaN or infinity.
    #[error("{function}({input}) produced a non-finite result")]
    NonFiniteResult {
        /// Name of the guarded function.
        function: &'static str,
        /// The argument that produced the non-finite result.
        input: f64,
    },
}

/// An error to describe why an orbit could not be built or rebuilt.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum OrbitError {
    /// ### No trajectory family models this eccentricity.
    /// Parabolic trajectories (an eccentricity of exactly 1) are not supported,
    /// and neither are negative or non-finite eccentricities.
    /// No orbit is constructed; callers must not try to propagate one.
    #[error("no trajectory family supports an eccentricity of {eccentricity}")]
    UnsupportedTrajectory {
        /// The eccentricity that was rejected.
        eccentricity: f64,
    },

    /// A guarded math function faulted while building the orbit.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// An error raised by [`crate::Universe`] operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UniverseError {
    /// There was no body at the specified parent index.
    #[error("there was no body at the specified parent index ({0})")]
    ParentNotFound(BodyId),

    /// There was no body at the specified index.
    #[error("there was no body at index {0}")]
    BodyNotFound(BodyId),

    /// The body has no central body and therefore no orbit.
    #[error("body {0} is not orbiting anything")]
    NotOrbiting(BodyId),

    /// Building or propagating an orbit failed.
    #[error("orbit of body {body} failed: {source}")]
    Orbit {
        /// The body whose orbit failed.
        body: BodyId,
        /// The underlying orbit error.
        #[source]
        source: OrbitError,
    },
}

impl UniverseError {
    pub(crate) fn orbit(body: BodyId, source: impl Into<OrbitError>) -> Self {
        UniverseError::Orbit {
            body,
            source: source.into(),
        }
    }
}
