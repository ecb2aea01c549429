use crate::KeplerianOrbit;

/// A struct representing a celestial body or a craft.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// The name of the body.
    pub name: String,

    /// The mass of the body, in kilograms.
    pub mass: f64,

    /// The radius of the body, in meters.
    pub radius: f64,

    /// An explicit influence radius.
    ///
    /// When `None`, the universe derives one from the configured falloff,
    /// see [`SimulationConfig::influence_radius`][crate::SimulationConfig::influence_radius].
    pub influence_radius: Option<f64>,

    /// The orbit of the body, if it is orbiting one.
    pub orbit: Option<KeplerianOrbit>,
}

impl Body {
    /// Creates a new `Body` instance.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the body.
    /// * `mass` - The mass of the body, in kilograms.
    /// * `radius` - The radius of the body, in meters.
    /// * `orbit` - An optional orbit for the body.
    pub fn new(name: String, mass: f64, radius: f64, orbit: Option<KeplerianOrbit>) -> Self {
        Self {
            name,
            mass,
            radius,
            influence_radius: None,
            orbit,
        }
    }

    /// Sets an explicit influence radius.
    #[must_use]
    pub fn with_influence_radius(mut self, influence_radius: f64) -> Self {
        self.influence_radius = Some(influence_radius);
        self
    }

    /// Releases the body from its orbit.
    pub fn release_from_orbit(&mut self) {
        self.orbit = None;
    }
}
