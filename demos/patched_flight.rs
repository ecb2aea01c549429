//! Flies a probe out of a planet's sphere of influence and hands it over to
//! the star.
//!
//! Run with `RUST_LOG=debug cargo run --example patched_flight` to see the
//! transition search.

use glam::DVec3;
use patched_conics::{Body, SimulationConfig, StateVectors, Universe};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = SimulationConfig {
        gravitational_constant: 1.0,
        influence_falloff: Some(0.1),
        ..Default::default()
    };
    let mut universe = Universe::new(Some(0.5), Some(config));

    let star = universe
        .add_body(Body::new("Star".to_string(), 1e6, 50.0, None), None)
        .map_err(|(err, _)| err)?;
    let planet = universe.add_orbiting_body(
        Body::new("Planet".to_string(), 1000.0, 5.0, None),
        star,
        StateVectors::new(
            DVec3::new(1000.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 1e3f64.sqrt()),
        ),
    )?;
    let probe = universe.add_orbiting_body(
        Body::new("Probe".to_string(), 1.0, 0.1, None),
        planet,
        StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0)),
    )?;

    let path = universe.sample_path(probe, 64)?;
    println!("{universe}: sampled {} points", path.points.len());

    let Some(transition) = path.transition else {
        println!("The probe stays around the planet");
        return Ok(());
    };
    println!(
        "{:?} in {:.3}s, to body {}",
        transition.kind, transition.time, transition.next_central_body
    );

    // Step up to the crossing, then finish the remainder exactly
    while universe.time + universe.time_step < transition.time {
        universe.tick()?;
        if let Some(position) = universe.get_body_position(probe) {
            println!(
                "t={:>6.2} probe at ({:.3}, {:.3}, {:.3})",
                universe.time, position.x, position.y, position.z
            );
        }
    }
    universe.advance(transition.time - universe.time)?;
    universe.apply_transition(probe, &transition)?;

    let probe_body = universe.get_body(probe).ok_or("probe vanished")?;
    if let Some(orbit) = &probe_body.orbit {
        let elements = orbit.elements();
        println!(
            "Now orbiting the star: {:?}, a = {:.3}, e = {:.6}",
            orbit.family(),
            elements.semimajor_axis,
            elements.eccentricity
        );
    }

    Ok(())
}
