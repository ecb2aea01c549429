//! Path sampling and sphere-of-influence transition search.
//!
//! A path is sampled coarsely (see
//! [`get_sample_points`][crate::OrbitTrait::get_sample_points]); at every
//! sample the body is checked against the influence radius of its central
//! body and against the influence radius of every sibling. The first sample
//! found across a boundary is refined by bisection on the time interval back
//! to the previous sample, and sampling stops there.

use glam::DVec3;

use crate::solvers::bisection;
use crate::{BodyId, MathError, Orbit, OrbitTrait, SolverConfig, StateVectors};

/// The influence boundary of the current central body.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeBoundary {
    /// The influence radius of the central body.
    pub radius: f64,

    /// The body that becomes the new central body after escaping.
    pub next_central_body: BodyId,

    /// The central body's own orbit around
    /// [`next_central_body`][Self::next_central_body], at the same epoch as
    /// the sampled orbit.
    pub central_orbit: Orbit,
}

/// Another body orbiting the same central body.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighbour {
    /// The sibling's identifier.
    pub body: BodyId,

    /// The sibling's influence radius.
    pub radius: f64,

    /// The sibling's orbit, at the same epoch as the sampled orbit.
    pub orbit: Orbit,
}

/// Everything a path can transition into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Surroundings {
    /// The boundary of the central body's influence, or `None` when it is
    /// unbounded.
    pub escape: Option<EscapeBoundary>,

    /// The siblings whose influence the path may enter.
    pub neighbours: Vec<Neighbour>,
}

/// Which kind of boundary a transition crosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Leaving the central body's influence, to the central body's own parent.
    Escape,
    /// Entering a sibling's influence.
    Encounter,
}

/// A predicted change of central body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Which boundary is crossed.
    pub kind: TransitionKind,

    /// Time from the current epoch until the crossing.
    pub time: f64,

    /// The state vectors at the crossing, relative to
    /// [`next_central_body`][Self::next_central_body].
    ///
    /// For an [`Escape`][TransitionKind::Escape] that is the outer body, so
    /// the position here is not at the influence radius. The crossing
    /// relative to the body being left is the last of
    /// [`OrbitPath::points`].
    pub state_vectors: StateVectors,

    /// The central body after the crossing.
    pub next_central_body: BodyId,
}

/// A sampled future path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrbitPath {
    /// Positions relative to the current central body.
    ///
    /// When a transition is found, the last point is the crossing point and
    /// nothing past it is emitted.
    pub points: Vec<DVec3>,

    /// Time from the current epoch of each point.
    pub times: Vec<f64>,

    /// The first transition along the path, if any.
    pub transition: Option<Transition>,
}

/// A boundary flagged at a coarse sample, before refinement.
enum Candidate<'a> {
    Escape(&'a EscapeBoundary),
    Encounter(&'a Neighbour),
}

impl Candidate<'_> {
    /// Signed distance to the boundary, in squared-distance units.
    ///
    /// Negative inside the central influence when escaping, negative inside
    /// the sibling's influence when encountering.
    fn gap(&self, orbit: &Orbit, time: f64, solver: &SolverConfig) -> Result<f64, MathError> {
        let position = orbit.get_position_after(time, solver)?;
        self.gap_at(position, time, solver)
    }

    fn gap_at(&self, position: DVec3, time: f64, solver: &SolverConfig) -> Result<f64, MathError> {
        Ok(match self {
            Candidate::Escape(boundary) => position.length_squared() - boundary.radius.powi(2),
            Candidate::Encounter(neighbour) => {
                let sibling = neighbour.orbit.get_position_after(time, solver)?;
                position.distance_squared(sibling) - neighbour.radius.powi(2)
            }
        })
    }

    fn is_crossed(
        &self,
        position: DVec3,
        time: f64,
        solver: &SolverConfig,
    ) -> Result<bool, MathError> {
        let gap = self.gap_at(position, time, solver)?;
        Ok(match self {
            Candidate::Escape(_) => gap > 0.0,
            Candidate::Encounter(_) => gap < 0.0,
        })
    }

    fn transition(
        &self,
        orbit: &Orbit,
        time: f64,
        solver: &SolverConfig,
    ) -> Result<Transition, MathError> {
        let state_vectors = orbit.get_state_vectors_after(time, solver)?;

        Ok(match self {
            Candidate::Escape(boundary) => Transition {
                kind: TransitionKind::Escape,
                time,
                state_vectors: state_vectors
                    .in_outer_frame(&boundary.central_orbit.get_state_vectors_after(time, solver)?),
                next_central_body: boundary.next_central_body,
            },
            Candidate::Encounter(neighbour) => Transition {
                kind: TransitionKind::Encounter,
                time,
                state_vectors: state_vectors
                    .relative_to(&neighbour.orbit.get_state_vectors_after(time, solver)?),
                next_central_body: neighbour.body,
            },
        })
    }
}

/// Samples `resolution` points of the path ahead of `orbit` and finds the
/// first transition into or out of a sphere of influence.
///
/// Every boundary flagged at the same coarse sample is refined, and the
/// earliest crossing wins. A body that already starts across a boundary
/// transitions at time zero.
///
/// Refined crossings always land just past the boundary, so a body handed
/// over at [`Transition::time`] already sits inside its new central body's
/// influence and does not transition straight back.
///
/// # Coarse resolution
/// A boundary that is entered and left again between two consecutive samples
/// is missed. The resolution must be high enough for the smallest influence
/// radius involved.
pub fn sample_path(
    orbit: &Orbit,
    surroundings: &Surroundings,
    resolution: usize,
    solver: &SolverConfig,
) -> Result<OrbitPath, MathError> {
    let samples = orbit.get_sample_points(resolution, solver)?;
    let mut path = OrbitPath {
        points: Vec::with_capacity(samples.len()),
        times: Vec::with_capacity(samples.len()),
        transition: None,
    };

    let candidates = surroundings
        .escape
        .iter()
        .map(Candidate::Escape)
        .chain(surroundings.neighbours.iter().map(Candidate::Encounter))
        .collect::<Vec<_>>();

    let mut previous_time = None;

    for sample in samples {
        let position = orbit.get_position_at_true_anomaly(sample.true_anomaly)?;

        let mut earliest: Option<Transition> = None;
        for candidate in &candidates {
            if !candidate.is_crossed(position, sample.time, solver)? {
                continue;
            }

            let time = match previous_time {
                Some(previous) => bisection(
                    previous,
                    sample.time,
                    |t| candidate.gap(orbit, t, solver),
                    solver,
                )?,
                None => sample.time,
            };

            if earliest.map_or(true, |found| time < found.time) {
                earliest = Some(candidate.transition(orbit, time, solver)?);
            }
        }

        match earliest {
            Some(transition) => {
                tracing::debug!(
                    kind = ?transition.kind,
                    time = transition.time,
                    next_central_body = transition.next_central_body,
                    "transition found while sampling"
                );

                path.points.push(orbit.get_position_after(transition.time, solver)?);
                path.times.push(transition.time);
                path.transition = Some(transition);
                break;
            }
            None => {
                path.points.push(position);
                path.times.push(sample.time);
                previous_time = Some(sample.time);
            }
        }
    }

    Ok(path)
}
