use core::fmt;
use std::collections::HashMap;

use glam::DVec3;

use crate::sampling::{EscapeBoundary, Neighbour, OrbitPath, Surroundings, Transition};
use crate::{Body, KeplerianOrbit, SimulationConfig, StateVectors, UniverseError};

/// The identifier of a body in a [`Universe`].
pub type BodyId = u64;

/// Struct that represents the simulation of the universe.
///
/// Every orbit in the universe shares the same epoch: [`advance`][Self::advance]
/// propagates all of them at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    /// The celestial bodies in the universe and their relations.
    bodies: HashMap<BodyId, BodyWrapper>,

    /// The next ID to assign to a body.
    next_id: BodyId,

    /// The time elapsed in the universe, in seconds.
    pub time: f64,

    /// The time step of the simulation, in seconds.
    pub time_step: f64,

    /// The configuration every orbit is built with.
    config: SimulationConfig,
}

/// The place of a body in the hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyRelation {
    /// The central body, or `None` for a root body.
    pub parent: Option<BodyId>,
    /// The bodies orbiting this one.
    pub satellites: Vec<BodyId>,
}

#[derive(Clone, Debug, PartialEq)]
struct BodyWrapper {
    body: Body,
    relations: BodyRelation,
}

impl Universe {
    /// Creates an empty universe.
    pub fn new(time_step: Option<f64>, config: Option<SimulationConfig>) -> Universe {
        Universe {
            bodies: HashMap::new(),
            next_id: 0,
            time: 0.0,
            time_step: time_step.unwrap_or(3.6e3),
            config: config.unwrap_or_default(),
        }
    }

    /// Creates an empty universe with default parameters.
    pub fn new_default() -> Universe {
        Universe::new(None, None)
    }

    /// Gets the configuration of the universe.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Adds a body to the universe.
    /// `body`: The body to add into the universe.
    /// `satellite_of`: The index of the body that this body is orbiting.
    /// Returns: The index of the newly-added body.
    ///
    /// The body's orbit, if any, is taken as-is. Use
    /// [`add_orbiting_body`][Self::add_orbiting_body] to have it built around
    /// the parent.
    pub fn add_body(
        &mut self,
        body: Body,
        satellite_of: Option<BodyId>,
    ) -> Result<BodyId, (UniverseError, Body)> {
        if let Some(parent_index) = satellite_of {
            if !self.bodies.contains_key(&parent_index) {
                return Err((UniverseError::ParentNotFound(parent_index), body));
            }
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.bodies.insert(
            id,
            BodyWrapper {
                body,
                relations: BodyRelation {
                    parent: satellite_of,
                    satellites: Vec::new(),
                },
            },
        );
        if let Some(parent_index) = satellite_of {
            if let Some(wrapper) = self.bodies.get_mut(&parent_index) {
                wrapper.relations.satellites.push(id);
            }
        }

        Ok(id)
    }

    /// Adds a body moving with the given state vectors relative to `parent`.
    ///
    /// The body's orbit is built around the parent's mass with this
    /// universe's configuration, replacing any orbit the body carried.
    pub fn add_orbiting_body(
        &mut self,
        mut body: Body,
        parent: BodyId,
        state_vectors: StateVectors,
    ) -> Result<BodyId, UniverseError> {
        let parent_mass = self
            .bodies
            .get(&parent)
            .ok_or(UniverseError::ParentNotFound(parent))?
            .body
            .mass;

        let orbit = KeplerianOrbit::around(state_vectors, parent_mass, &self.config)
            .map_err(|err| UniverseError::orbit(self.next_id, err))?;
        body.orbit = Some(orbit);

        self.add_body(body, Some(parent)).map_err(|(err, _)| err)
    }

    /// Removes a body from the universe.
    ///
    /// `body_index`: The index of the body to remove.
    ///
    /// Returns: A Vec of all bodies that were removed, including the one specified.
    /// An empty Vec is returned if the body was not found.
    pub fn remove_body(&mut self, body_index: BodyId) -> Vec<Body> {
        let wrapper = match self.bodies.remove(&body_index) {
            Some(wrapper) => wrapper,
            None => return Vec::new(),
        };

        let (body, relations) = (wrapper.body, wrapper.relations);
        let mut bodies = vec![body];

        // Remove the body from its parent's satellites.
        if let Some(parent_index) = relations.parent {
            if let Some(parent_wrapper) = self.bodies.get_mut(&parent_index) {
                parent_wrapper
                    .relations
                    .satellites
                    .retain(|&satellite| satellite != body_index);
            }
        }

        // Remove children
        for &satellite_index in &relations.satellites {
            bodies.append(&mut self.remove_body(satellite_index));
        }

        bodies
    }

    /// Gets a Vec of all bodies in the universe.
    pub fn get_bodies(&self) -> Vec<&Body> {
        self.bodies.values().map(|wrapper| &wrapper.body).collect()
    }

    /// Gets the relations of a body.
    pub fn get_body_relation(&self, index: BodyId) -> Option<&BodyRelation> {
        self.bodies.get(&index).map(|wrapper| &wrapper.relations)
    }

    /// Gets a mutable reference to a body in the universe.
    pub fn get_body_mut(&mut self, index: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&index).map(|wrapper| &mut wrapper.body)
    }

    /// Gets an immutable reference to a body in the universe.
    pub fn get_body(&self, index: BodyId) -> Option<&Body> {
        self.bodies.get(&index).map(|wrapper| &wrapper.body)
    }

    /// Gets the index of a body with a given name.
    pub fn get_body_index_with_name(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, w)| w.body.name == name)
            .map(|(id, _)| *id)
    }

    /// Gets the influence radius of a body, or `None` if it is unbounded.
    ///
    /// Root bodies always have an unbounded influence. Other bodies use their
    /// explicit [`influence_radius`][Body::influence_radius] if set, and the
    /// configured falloff otherwise.
    pub fn influence_radius(&self, index: BodyId) -> Option<f64> {
        let wrapper = self.bodies.get(&index)?;
        if wrapper.relations.parent.is_none() {
            return None;
        }

        wrapper
            .body
            .influence_radius
            .or_else(|| self.config.influence_radius(wrapper.body.mass))
    }

    /// Advances the simulation by a tick.
    pub fn tick(&mut self) -> Result<(), UniverseError> {
        self.advance(self.time_step)
    }

    /// Advances the universe by multiple ticks.
    pub fn warp(&mut self, ticks: u128) -> Result<(), UniverseError> {
        self.advance(ticks as f64 * self.time_step)
    }

    /// Advances every orbit in the universe by `dt`.
    ///
    /// If any orbit faults, nothing is advanced and the fault is returned.
    pub fn advance(&mut self, dt: f64) -> Result<(), UniverseError> {
        let mut updated = Vec::with_capacity(self.bodies.len());

        for (&id, wrapper) in &self.bodies {
            let Some(orbit) = &wrapper.body.orbit else {
                continue;
            };

            let mut orbit = orbit.clone();
            if let Err(err) = orbit.update(dt) {
                tracing::error!(
                    body = id,
                    name = %wrapper.body.name,
                    error = %err,
                    "step aborted on a domain fault"
                );
                return Err(UniverseError::orbit(id, err));
            }
            updated.push((id, orbit));
        }

        for (id, orbit) in updated {
            if let Some(wrapper) = self.bodies.get_mut(&id) {
                wrapper.body.orbit = Some(orbit);
            }
        }

        self.time += dt;
        Ok(())
    }

    /// Gets the absolute position of a body in the universe.
    ///
    /// `index`: The index of the body to get the position of.
    ///
    /// Returns: The absolute position of the body.
    /// The top ancestor of the body (i.e, the body with no parent) is at the origin (0, 0, 0).
    pub fn get_body_position(&self, index: BodyId) -> Option<DVec3> {
        self.get_body_state_vectors(index)
            .map(|state_vectors| state_vectors.position)
    }

    /// Gets the absolute state vectors of a body, summed up its chain of
    /// central bodies.
    pub fn get_body_state_vectors(&self, index: BodyId) -> Option<StateVectors> {
        let wrapper = self.bodies.get(&index)?;

        let local = match &wrapper.body.orbit {
            Some(orbit) => orbit.state_vectors(),
            None => StateVectors::default(), // If the body is not in orbit, it sits at the origin
        };

        match wrapper.relations.parent {
            Some(parent) => match self.get_body_state_vectors(parent) {
                Some(origin) => Some(local.in_outer_frame(&origin)),
                None => Some(local),
            },
            None => Some(local),
        }
    }

    /// Collects what a body's path can transition into: the influence
    /// boundary of its central body, and its siblings.
    ///
    /// The escape boundary is omitted when the central body is a root or has
    /// an unbounded influence. Siblings without an orbit or with an unbounded
    /// influence are skipped.
    pub fn surroundings(&self, index: BodyId) -> Result<Surroundings, UniverseError> {
        let wrapper = self
            .bodies
            .get(&index)
            .ok_or(UniverseError::BodyNotFound(index))?;
        let parent_index = wrapper
            .relations
            .parent
            .ok_or(UniverseError::NotOrbiting(index))?;
        let parent = self
            .bodies
            .get(&parent_index)
            .ok_or(UniverseError::ParentNotFound(parent_index))?;

        let escape = match (
            parent.relations.parent,
            &parent.body.orbit,
            self.influence_radius(parent_index),
        ) {
            (Some(next_central_body), Some(orbit), Some(radius)) => Some(EscapeBoundary {
                radius,
                next_central_body,
                central_orbit: orbit.orbit().clone(),
            }),
            _ => None,
        };

        let neighbours = parent
            .relations
            .satellites
            .iter()
            .filter(|&&sibling| sibling != index)
            .filter_map(|&sibling| {
                let orbit = self.bodies.get(&sibling)?.body.orbit.as_ref()?;
                Some(Neighbour {
                    body: sibling,
                    radius: self.influence_radius(sibling)?,
                    orbit: orbit.orbit().clone(),
                })
            })
            .collect();

        Ok(Surroundings { escape, neighbours })
    }

    /// Samples the path ahead of a body and finds its next transition.
    pub fn sample_path(
        &self,
        index: BodyId,
        resolution: usize,
    ) -> Result<OrbitPath, UniverseError> {
        let surroundings = self.surroundings(index)?;
        let orbit = self
            .bodies
            .get(&index)
            .and_then(|wrapper| wrapper.body.orbit.as_ref())
            .ok_or(UniverseError::NotOrbiting(index))?;

        orbit
            .sample_path(&surroundings, resolution)
            .map_err(|err| UniverseError::orbit(index, err))
    }

    /// Moves a body to the central body named by a transition.
    ///
    /// The transition's state vectors are taken as the body's state at the
    /// current epoch, so the universe should first be advanced by
    /// [`Transition::time`].
    pub fn apply_transition(
        &mut self,
        index: BodyId,
        transition: &Transition,
    ) -> Result<(), UniverseError> {
        let next = transition.next_central_body;
        let next_mass = match self.bodies.get(&next) {
            Some(wrapper) if next != index => wrapper.body.mass,
            _ => return Err(UniverseError::ParentNotFound(next)),
        };
        let mu = self.config.gravitational_parameter(next_mass);

        let wrapper = self
            .bodies
            .get_mut(&index)
            .ok_or(UniverseError::BodyNotFound(index))?;
        let orbit = wrapper
            .body
            .orbit
            .as_mut()
            .ok_or(UniverseError::NotOrbiting(index))?;
        orbit
            .set_central_body(transition.state_vectors, mu)
            .map_err(|err| UniverseError::orbit(index, err))?;

        let previous = wrapper.relations.parent.replace(next);

        if let Some(previous) = previous {
            if let Some(previous_wrapper) = self.bodies.get_mut(&previous) {
                previous_wrapper
                    .relations
                    .satellites
                    .retain(|&satellite| satellite != index);
            }
        }
        if let Some(next_wrapper) = self.bodies.get_mut(&next) {
            next_wrapper.relations.satellites.push(index);
        }

        tracing::info!(
            body = index,
            from = ?previous,
            to = next,
            kind = ?transition.kind,
            "body changed central body"
        );
        Ok(())
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe::new_default()
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Universe with {} bodies, t={}",
            self.bodies.len(),
            self.time
        )
    }
}
