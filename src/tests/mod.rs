#![cfg(test)]

use core::f64::consts::TAU;

use glam::DVec3;
use test_case::test_case;

use crate::sampling::{self, EscapeBoundary, Neighbour};
use crate::{
    Body, KeplerianOrbit, MathError, Orbit, OrbitError, OrbitTrait, OrbitalElements,
    SimulationConfig, SolverConfig, StateVectors, Surroundings, TrajectoryFamily, TransitionKind,
    Universe, UniverseError,
};

const ORBIT_POLL_POINTS: usize = 256;
const RANDOM_ITERATIONS: usize = 256;


use assertions::*;
use polling::*;
use seeders::*;

/// A solver that runs Newton-Raphson to convergence, for comparisons that
/// are tighter than the default tolerance.
fn precise_solver() -> SolverConfig {
    SolverConfig {
        newton_max_iterations: 100,
        newton_tolerance: 1e-10,
        ..Default::default()
    }
}

/// Open flyby past a light planet: `e = 1.25`, `a = -40`.
fn flyby() -> Orbit {
    let sv = StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0));
    Orbit::from_state_vectors(sv, 1000.0).unwrap()
}

/// A circular orbit passing through `position`, in the XZ plane.
fn circular_through(position: DVec3, mu: f64) -> Orbit {
    let speed = (mu / position.length()).sqrt();
    let velocity = DVec3::new(-position.z, 0.0, position.x).normalize() * speed;
    Orbit::from_state_vectors(StateVectors::new(position, velocity), mu).unwrap()
}

/// The planet of [`flyby`], on a circular orbit around a heavy star.
fn planet_orbit() -> Orbit {
    circular_through(DVec3::new(1000.0, 0.0, 0.0), 1e6)
}

#[test]
fn circular_from_state_vectors() {
    let mu = 7.7 * 7.7 * 30.0;
    let sv = StateVectors::new(DVec3::new(30.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 7.7));
    let orbit = Orbit::from_state_vectors(sv, mu).unwrap();

    assert_eq!(orbit.get_family(), TrajectoryFamily::Elliptic);
    assert_almost_eq(orbit.get_eccentricity(), 0.0, "eccentricity");
    assert_almost_eq(orbit.get_semi_major_axis(), 30.0, "semi-major axis");
    assert_almost_eq(
        orbit.get_elements().semiminor_axis,
        orbit.get_semi_major_axis(),
        "semi-minor axis",
    );
    assert_almost_eq_sv(&orbit.get_state_vectors().unwrap(), &sv, "circular orbit");
}

#[test]
fn flyby_conventions() {
    let orbit = flyby();

    assert_eq!(orbit.get_family(), TrajectoryFamily::Hyperbolic);
    assert_almost_eq(orbit.get_eccentricity(), 1.25, "eccentricity");
    assert_almost_eq(orbit.get_semi_major_axis(), -40.0, "semi-major axis");
    assert_almost_eq(orbit.get_periapsis(), 10.0, "periapsis");
    assert_eq!(orbit.get_apoapsis(), f64::INFINITY);
    assert_eq!(orbit.get_orbital_period(), f64::INFINITY);
    assert_almost_eq(orbit.get_true_anomaly(), 0.0, "true anomaly at periapsis");
}

#[test_case(0.0 => Some(TrajectoryFamily::Elliptic) ; "circular")]
#[test_case(0.5 => Some(TrajectoryFamily::Elliptic) ; "elliptic")]
#[test_case(0.999_999 => Some(TrajectoryFamily::Elliptic) ; "barely closed")]
#[test_case(1.0 => None ; "parabolic")]
#[test_case(1.000_001 => Some(TrajectoryFamily::Hyperbolic) ; "barely open")]
#[test_case(3.0 => Some(TrajectoryFamily::Hyperbolic) ; "hyperbolic")]
#[test_case(-0.1 => None ; "negative")]
#[test_case(f64::NAN => None ; "nan")]
#[test_case(f64::INFINITY => None ; "infinite")]
fn family_of_eccentricity(eccentricity: f64) -> Option<TrajectoryFamily> {
    TrajectoryFamily::from_eccentricity(eccentricity)
}

#[test]
fn parabolic_elements_are_rejected() {
    let elements = OrbitalElements {
        semimajor_axis: 100.0,
        eccentricity: 1.0,
        ..Default::default()
    };

    assert_eq!(
        Orbit::create(elements, 1.0),
        Err(OrbitError::UnsupportedTrajectory { eccentricity: 1.0 })
    );
}

#[test]
fn parabolic_state_vectors_are_rejected() {
    // Exactly escape speed at r = 2, mu = 1
    let sv = StateVectors::new(DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 1.0));
    let result = Orbit::from_state_vectors(sv, 1.0);

    assert!(
        matches!(result, Err(OrbitError::UnsupportedTrajectory { .. })),
        "expected a parabolic rejection, got {result:?}"
    );
}

#[test]
fn non_finite_state_vectors_fault() {
    let sv = StateVectors::new(DVec3::new(f64::NAN, 0.0, 0.0), DVec3::new(0.0, 0.0, 1.0));
    assert!(Orbit::from_state_vectors(sv, 1.0).is_err());
}

fn state_vector_round_trip_base_test(orbit: &Orbit, what: &str) {
    let sv = orbit.get_state_vectors().unwrap();
    let rebuilt = Orbit::from_state_vectors(sv, orbit.get_gravitational_parameter()).unwrap();

    assert_almost_eq_orbit(&rebuilt, orbit, what);
    assert_almost_eq_sv(&rebuilt.get_state_vectors().unwrap(), &sv, what);
    assert_elements_normalized(rebuilt.get_elements(), rebuilt.get_family(), what);
}

#[test]
fn state_vector_round_trip() {
    for _ in 0..RANDOM_ITERATIONS {
        let mu = random_mu();

        for orbit in [random_circular(mu), random_elliptic(mu), random_hyperbolic(mu)] {
            let what = format!("{orbit:?}");
            state_vector_round_trip_base_test(&orbit, &what);
        }
    }
}

#[test]
fn elements_stay_normalized_after_propagation() {
    let solver = precise_solver();

    for _ in 0..RANDOM_ITERATIONS {
        let orbit = random_any(random_mu());
        let dt = rand::random_range(-1e6..1e6) / orbit.get_mean_motion();

        let propagated = orbit.propagated(dt, &solver).unwrap();
        assert_eq!(propagated.get_family(), orbit.get_family());
        assert_elements_normalized(
            propagated.get_elements(),
            propagated.get_family(),
            &format!("{orbit:?} after {dt}"),
        );
    }
}

#[test]
fn propagation_is_reversible() {
    let solver = precise_solver();

    for _ in 0..RANDOM_ITERATIONS {
        let orbit = random_any(random_mu());
        // Up to a couple of radians of mean anomaly either way
        let dt = rand::random_range(-2.0..2.0) / orbit.get_mean_motion();

        let there_and_back = orbit
            .propagated(dt, &solver)
            .and_then(|orbit| orbit.propagated(-dt, &solver))
            .unwrap();

        assert_almost_eq_sv(
            &there_and_back.get_state_vectors().unwrap(),
            &orbit.get_state_vectors().unwrap(),
            &format!("{orbit:?} forwards and back by {dt}"),
        );
    }
}

#[test]
fn elliptic_orbits_repeat_every_period() {
    let solver = precise_solver();

    for _ in 0..RANDOM_ITERATIONS {
        let orbit = random_elliptic(random_mu());
        let period = orbit.get_orbital_period();

        assert_almost_eq_sv(
            &orbit.get_state_vectors_after(period, &solver).unwrap(),
            &orbit.get_state_vectors().unwrap(),
            &format!("{orbit:?} after one period"),
        );
    }
}

#[test]
fn kepler_equation_round_trip() {
    let solver = precise_solver();

    for _ in 0..RANDOM_ITERATIONS {
        let orbit = random_any(random_mu());
        let true_anomaly = orbit.get_true_anomaly();

        let mean_anomaly = orbit.get_mean_anomaly_at_true_anomaly(true_anomaly).unwrap();
        let back = orbit
            .get_true_anomaly_at_mean_anomaly(mean_anomaly, &solver)
            .unwrap();

        assert_almost_eq_angle(back, true_anomaly, &format!("{orbit:?}"));
    }
}

#[test]
fn angular_momentum_is_conserved() {
    for _ in 0..16 {
        let orbit = random_any(random_mu());
        let expected = (orbit.get_gravitational_parameter()
            * orbit.get_elements().semi_latus_rectum.abs())
        .sqrt();

        for (time, sv) in poll_orbit(&orbit) {
            let momentum = sv.position.cross(sv.velocity).length();
            assert_almost_eq_rel(
                momentum,
                expected,
                &format!("specific angular momentum of {orbit:?} at t={time}"),
            );
        }
    }
}

#[test]
fn velocity_follows_position() {
    fn cosine_similarity(v1: DVec3, v2: DVec3) -> f64 {
        v1.dot(v2) / (v1.length() * v2.length())
    }

    const SIMILARITY_THRESHOLD: f64 = 0.999;
    let solver = precise_solver();

    for _ in 0..16 {
        let orbit = random_any(random_mu());
        let step = 1e-5 / orbit.get_mean_motion();

        for (time, sv) in poll_orbit(&orbit) {
            let next = orbit.get_position_after(time + step, &solver).unwrap();
            let similarity = cosine_similarity(sv.velocity, next - sv.position);

            assert!(
                similarity > SIMILARITY_THRESHOLD,
                "Velocity and position difference direction similarity is {similarity}, \
                which is below threshold of {SIMILARITY_THRESHOLD}\n\
                On orbit {orbit:?} at t={time}"
            );
        }
    }
}

#[test]
fn altitudes_stay_between_apsides() {
    for _ in 0..16 {
        let orbit = random_any(random_mu());
        let periapsis = orbit.get_periapsis();
        let apoapsis = orbit.get_apoapsis();

        for (true_anomaly, sv) in poll_true_anomalies(&orbit) {
            let altitude = sv.position.length();
            let what = format!("{orbit:?} at f={true_anomaly}");

            assert_almost_eq_rel(
                altitude,
                orbit.get_altitude_at_true_anomaly(true_anomaly).unwrap(),
                &format!("altitude of {what}"),
            );
            assert!(
                altitude >= periapsis * (1.0 - 1e-9),
                "{altitude} is below periapsis {periapsis} on {what}"
            );
            assert!(
                altitude <= apoapsis * (1.0 + 1e-9),
                "{altitude} is above apoapsis {apoapsis} on {what}"
            );
        }
    }
}

#[test]
fn sample_points_start_now_and_move_forwards() {
    let solver = SolverConfig::default();

    for _ in 0..RANDOM_ITERATIONS {
        let orbit = random_any(random_mu());
        let samples = orbit.get_sample_points(64, &solver).unwrap();

        assert_eq!(samples.len(), 64);
        assert_eq!(samples[0].time, 0.0);
        assert!(
            samples.windows(2).all(|pair| pair[0].time < pair[1].time),
            "sample times of {orbit:?} are not increasing: {samples:?}"
        );

        if orbit.get_family() == TrajectoryFamily::Elliptic {
            assert!(samples[63].time < orbit.get_orbital_period());
        }
    }
}

#[test]
fn escape_is_refined_between_samples() {
    let orbit = flyby();
    let solver = SolverConfig::default();
    let surroundings = Surroundings {
        escape: Some(EscapeBoundary {
            radius: 100.0,
            next_central_body: 0,
            central_orbit: planet_orbit(),
        }),
        neighbours: Vec::new(),
    };

    let path = sampling::sample_path(&orbit, &surroundings, 64, &solver).unwrap();
    let transition = path.transition.unwrap();

    assert_eq!(transition.kind, TransitionKind::Escape);
    assert_eq!(transition.next_central_body, 0);
    assert_eq!(path.points.len(), path.times.len());
    assert_eq!(*path.times.last().unwrap(), transition.time);

    // The crossing lies between the last sample inside and the first outside
    let samples = orbit.get_sample_points(64, &solver).unwrap();
    let first_outside = samples
        .iter()
        .find(|sample| {
            orbit
                .get_position_at_true_anomaly(sample.true_anomaly)
                .unwrap()
                .length()
                > 100.0
        })
        .unwrap();
    let last_inside = path.times[path.times.len() - 2];

    assert!(
        last_inside < transition.time && transition.time <= first_outside.time,
        "{last_inside} < {} <= {}",
        transition.time,
        first_outside.time
    );

    let crossing = orbit.get_state_vectors_after(transition.time, &solver).unwrap();
    assert!((crossing.position.length() - 100.0).abs() < 0.01);
    assert!(crossing.position.length() > 100.0, "crossing must be outside");
    assert_almost_eq_vec3(*path.points.last().unwrap(), crossing.position, "crossing point");

    let central = planet_orbit()
        .get_state_vectors_after(transition.time, &solver)
        .unwrap();
    assert_almost_eq_sv(
        &transition.state_vectors,
        &crossing.in_outer_frame(&central),
        "escape state vectors",
    );
}

#[test]
fn escape_is_found_past_the_sampling_window() {
    let solver = SolverConfig::default();

    // Just short of the outgoing asymptote, already about 6000 out
    let reference = flyby();
    let mut elements = *reference.get_elements();
    elements.true_anomaly = (-1.0 / elements.eccentricity).acos() - 0.005;
    let orbit = Orbit::create(elements, 1000.0).unwrap();
    let distance = orbit.get_state_vectors().unwrap().position.length();

    let surroundings = Surroundings {
        escape: Some(EscapeBoundary {
            radius: 10.0 * distance,
            next_central_body: 0,
            central_orbit: planet_orbit(),
        }),
        neighbours: Vec::new(),
    };

    let path = sampling::sample_path(&orbit, &surroundings, 64, &solver).unwrap();
    let transition = path.transition.expect("the body is on its way out");

    assert_eq!(transition.kind, TransitionKind::Escape);
    assert!(transition.time > 0.0);
    assert!(path.times.windows(2).all(|w| w[0] < w[1]));

    let crossing = path.points.last().unwrap().length();
    assert!(crossing >= 10.0 * distance);
    assert!(crossing < 10.01 * distance, "{crossing} vs {}", 10.0 * distance);
}

#[test]
fn earlier_encounter_wins_over_escape() {
    let orbit = flyby();
    let solver = SolverConfig::default();

    // Park a moon exactly where the probe will be at sample 45
    let samples = orbit.get_sample_points(64, &solver).unwrap();
    let meeting_time = samples[45].time;
    let meeting_point = orbit.get_position_after(meeting_time, &solver).unwrap();
    let moon = circular_through(meeting_point, 1000.0)
        .propagated(-meeting_time, &solver)
        .unwrap();

    let surroundings = Surroundings {
        escape: Some(EscapeBoundary {
            radius: 100.0,
            next_central_body: 0,
            central_orbit: planet_orbit(),
        }),
        neighbours: vec![Neighbour {
            body: 5,
            radius: 8.0,
            orbit: moon.clone(),
        }],
    };

    let path = sampling::sample_path(&orbit, &surroundings, 64, &solver).unwrap();
    let transition = path.transition.unwrap();

    assert_eq!(transition.kind, TransitionKind::Encounter);
    assert_eq!(transition.next_central_body, 5);
    assert!(transition.time > 0.0 && transition.time <= meeting_time);
    assert!(path.points.len() <= 46);
    assert!((transition.state_vectors.position.length() - 8.0).abs() < 0.05);
    assert!(transition.state_vectors.position.length() <= 8.0, "crossing must be inside");

    let relative = orbit
        .get_state_vectors_after(transition.time, &solver)
        .unwrap()
        .relative_to(&moon.get_state_vectors_after(transition.time, &solver).unwrap());
    assert_almost_eq_sv(&transition.state_vectors, &relative, "encounter state vectors");
}

#[test]
fn keplerian_orbit_update_matches_prediction() {
    for _ in 0..RANDOM_ITERATIONS {
        let mu = random_mu();
        let orbit = random_any(mu);
        let mut keplerian = KeplerianOrbit::from_elements(
            *orbit.get_elements(),
            mu,
            SolverConfig::default(),
        )
        .unwrap();
        let dt = rand::random_range(0.0..1.0) / orbit.get_mean_motion();

        let predicted = keplerian.state_vectors_after(dt).unwrap();
        let updated = keplerian.update(dt).unwrap();

        assert_eq!(predicted, updated);
        assert_eq!(keplerian.state_vectors(), updated);
    }
}

#[test]
fn keplerian_orbit_fault_leaves_state_untouched() {
    let sv = StateVectors::new(DVec3::new(30.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 7.7));
    let mut orbit = KeplerianOrbit::from_state_vectors(sv, 1778.7, SolverConfig::default()).unwrap();
    let before = orbit.clone();

    let result = orbit.update(f64::NAN);

    assert!(matches!(result, Err(MathError::NonFiniteInput { .. })), "{result:?}");
    assert_eq!(orbit, before);
}

#[test]
fn retrograde_burn_closes_the_orbit() {
    let sv = StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0));
    let mut orbit = KeplerianOrbit::from_state_vectors(sv, 1000.0, SolverConfig::default()).unwrap();
    assert_eq!(orbit.family(), TrajectoryFamily::Hyperbolic);

    orbit.apply_delta_v(DVec3::new(0.0, 0.0, -5.0)).unwrap();

    assert_eq!(orbit.family(), TrajectoryFamily::Elliptic);
    assert_eq!(orbit.position(), sv.position);
    assert_almost_eq_vec3(orbit.velocity(), DVec3::new(0.0, 0.0, 10.0), "velocity");
    assert_almost_eq(orbit.elements().eccentricity, 0.0, "eccentricity");
}

#[test]
fn changing_central_body_rebuilds_the_orbit() {
    let sv = StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0));
    let mut orbit = KeplerianOrbit::from_state_vectors(sv, 1000.0, SolverConfig::default()).unwrap();

    orbit.set_central_body(sv, 4000.0).unwrap();

    assert_eq!(orbit.gravitational_parameter(), 4000.0);
    assert_eq!(orbit.family(), TrajectoryFamily::Elliptic);
    assert_eq!(orbit.state_vectors(), sv);
}

#[test]
fn from_elements_keeps_the_snapshot() {
    let elements = OrbitalElements {
        semimajor_axis: 100.0,
        eccentricity: 0.3,
        inclination: 0.4,
        lon_asc_node: 1.0,
        arg_periapsis: 2.0,
        true_anomaly: 3.0,
        ..Default::default()
    };
    let orbit = KeplerianOrbit::from_elements(elements, 50.0, SolverConfig::default()).unwrap();

    assert_almost_eq_orbit(
        orbit.orbit(),
        &Orbit::create(elements, 50.0).unwrap(),
        "restored snapshot",
    );
    assert_eq!(orbit.elements().true_anomaly, 3.0);
    assert_almost_eq_sv(
        &orbit.state_vectors(),
        &orbit.orbit().get_state_vectors_at_true_anomaly(3.0).unwrap(),
        "restored state vectors",
    );
}

/// Star at the root, a planet with an influence radius of 100 and a probe on
/// the flyby trajectory around the planet.
fn flyby_universe() -> (Universe, [u64; 3]) {
    let config = SimulationConfig {
        gravitational_constant: 1.0,
        influence_falloff: Some(0.1),
        ..Default::default()
    };
    let mut universe = Universe::new(Some(1.0), Some(config));

    let star = universe
        .add_body(Body::new("Star".to_string(), 1e6, 50.0, None), None)
        .unwrap();
    let planet = universe
        .add_orbiting_body(
            Body::new("Planet".to_string(), 1000.0, 5.0, None),
            star,
            planet_orbit().get_state_vectors().unwrap(),
        )
        .unwrap();
    let probe = universe
        .add_orbiting_body(
            Body::new("Probe".to_string(), 1.0, 0.1, None),
            planet,
            StateVectors::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 15.0)),
        )
        .unwrap();

    (universe, [star, planet, probe])
}

#[test]
fn universe_hierarchy() {
    let (universe, [star, planet, probe]) = flyby_universe();

    assert_eq!(universe.get_bodies().len(), 3);
    assert_eq!(universe.get_body_index_with_name("Planet"), Some(planet));
    assert_eq!(universe.get_body_relation(star).unwrap().satellites, vec![planet]);
    assert_eq!(universe.get_body_relation(probe).unwrap().parent, Some(planet));

    assert_eq!(universe.get_body_position(star), Some(DVec3::ZERO));
    assert_almost_eq_vec3(
        universe.get_body_position(probe).unwrap(),
        DVec3::new(1010.0, 0.0, 0.0),
        "probe position",
    );
    assert_eq!(universe.get_body_position(42), None);
}

#[test]
fn universe_rejects_missing_parents() {
    let mut universe = Universe::new_default();
    let body = Body::new("Orphan".to_string(), 1.0, 1.0, None);

    let (err, body) = universe.add_body(body, Some(3)).unwrap_err();
    assert_eq!(err, UniverseError::ParentNotFound(3));
    assert_eq!(body.name, "Orphan");
    assert!(universe.get_bodies().is_empty());
}

#[test]
fn removing_a_body_removes_its_satellites() {
    let (mut universe, [star, planet, probe]) = flyby_universe();

    let removed = universe.remove_body(planet);

    assert_eq!(removed.len(), 2);
    assert!(universe.get_body(probe).is_none());
    assert!(universe.get_body_relation(star).unwrap().satellites.is_empty());
    assert!(universe.remove_body(planet).is_empty());
}

#[test]
fn influence_radius_rules() {
    let (mut universe, [star, planet, probe]) = flyby_universe();

    assert_eq!(universe.influence_radius(star), None, "roots are unbounded");
    assert_almost_eq(universe.influence_radius(planet).unwrap(), 100.0, "planet");

    if let Some(body) = universe.get_body_mut(probe) {
        body.influence_radius = Some(2.5);
    }
    assert_eq!(universe.influence_radius(probe), Some(2.5));

    let unbounded = Universe::new_default();
    assert_eq!(unbounded.config().influence_falloff, None);
}

#[test]
fn surroundings_of_a_probe() {
    let (universe, [star, planet, probe]) = flyby_universe();

    let surroundings = universe.surroundings(probe).unwrap();
    let escape = surroundings.escape.unwrap();
    assert_eq!(escape.next_central_body, star);
    assert_almost_eq(escape.radius, 100.0, "escape radius");
    assert!(surroundings.neighbours.is_empty());

    // The planet orbits a root, so it can never escape
    let surroundings = universe.surroundings(planet).unwrap();
    assert!(surroundings.escape.is_none());

    assert_eq!(universe.surroundings(star), Err(UniverseError::NotOrbiting(star)));
    assert_eq!(universe.surroundings(42), Err(UniverseError::BodyNotFound(42)));
}

#[test]
fn universe_advance_moves_every_body() {
    let (mut universe, [_, planet, probe]) = flyby_universe();
    let planet_before = universe.get_body_position(planet).unwrap();
    let probe_before = universe.get_body_position(probe).unwrap();

    universe.tick().unwrap();

    assert_eq!(universe.time, 1.0);
    assert_ne!(universe.get_body_position(planet).unwrap(), planet_before);
    assert_ne!(universe.get_body_position(probe).unwrap(), probe_before);
}

#[test]
fn universe_fault_aborts_the_whole_step() {
    let (mut universe, [_, planet, probe]) = flyby_universe();
    let before = universe.clone();

    let result = universe.advance(f64::NAN);

    assert!(
        matches!(result, Err(UniverseError::Orbit { body, .. }) if body == planet || body == probe),
        "{result:?}"
    );
    assert_eq!(universe, before);
}

#[test]
fn escape_hands_the_probe_to_the_star() {
    let (mut universe, [star, planet, probe]) = flyby_universe();

    let path = universe.sample_path(probe, 64).unwrap();
    let transition = path.transition.unwrap();
    assert_eq!(transition.kind, TransitionKind::Escape);
    assert_eq!(transition.next_central_body, star);

    universe.advance(transition.time).unwrap();
    let absolute_before = universe.get_body_state_vectors(probe).unwrap();

    universe.apply_transition(probe, &transition).unwrap();

    assert_eq!(universe.get_body_relation(probe).unwrap().parent, Some(star));
    assert!(universe.get_body_relation(star).unwrap().satellites.contains(&probe));
    assert!(universe.get_body_relation(planet).unwrap().satellites.is_empty());

    let orbit = universe.get_body(probe).unwrap().orbit.as_ref().unwrap();
    assert_eq!(orbit.gravitational_parameter(), 1e6);

    // The hand-off does not move the probe
    assert_almost_eq_sv(
        &universe.get_body_state_vectors(probe).unwrap(),
        &absolute_before,
        "probe across the hand-off",
    );

    // The star is unbounded, and the planet is now a sibling
    let surroundings = universe.surroundings(probe).unwrap();
    assert!(surroundings.escape.is_none());
    assert_eq!(surroundings.neighbours.len(), 1);
    assert_eq!(surroundings.neighbours[0].body, planet);

    // Handed over just outside the planet's influence, so it does not fall
    // straight back in
    let path = universe.sample_path(probe, 64).unwrap();
    assert!(
        !matches!(path.transition, Some(t) if t.next_central_body == planet && t.time == 0.0),
        "{:?}",
        path.transition
    );
}

#[test]
fn hand_offs_never_bounce_back() {
    for step in 0..40 {
        let (mut universe, [star, planet, probe]) = flyby_universe();
        universe.advance(0.3 * step as f64).unwrap();

        let transition = universe.sample_path(probe, 64).unwrap().transition.unwrap();
        assert_eq!(transition.next_central_body, star, "start offset {step}");

        universe.advance(transition.time).unwrap();
        universe.apply_transition(probe, &transition).unwrap();

        let relative = universe.get_body_position(probe).unwrap()
            - universe.get_body_position(planet).unwrap();
        assert!(relative.length() > 100.0, "start offset {step}: {}", relative.length());

        let path = universe.sample_path(probe, 64).unwrap();
        if let Some(next) = path.transition {
            assert!(
                next.time > 0.0,
                "start offset {step}: bounced into {} at once",
                next.next_central_body
            );
        }
    }
}

#[test]
fn transitions_to_unknown_bodies_are_rejected() {
    let (mut universe, [_, _, probe]) = flyby_universe();
    let mut transition = universe.sample_path(probe, 64).unwrap().transition.unwrap();
    transition.next_central_body = 42;

    assert_eq!(
        universe.apply_transition(probe, &transition),
        Err(UniverseError::ParentNotFound(42))
    );
}

#[test]
fn simulation_config_derives_mu_and_influence() {
    let config = SimulationConfig {
        gravitational_constant: 2.0,
        influence_falloff: Some(0.5),
        ..Default::default()
    };

    assert_eq!(config.gravitational_parameter(3.0), 6.0);
    assert_almost_eq(config.influence_radius(8.0).unwrap(), 32f64.sqrt(), "influence radius");

    let unbounded = SimulationConfig {
        influence_falloff: Some(0.0),
        ..config
    };
    assert_eq!(unbounded.influence_radius(8.0), None);
}

#[test]
fn circular_orbits_poll_at_constant_radius() {
    for _ in 0..16 {
        let orbit = random_circular(random_mu());
        let radius = orbit.get_semi_major_axis();

        for (time, sv) in poll_orbit(&orbit) {
            assert_almost_eq_rel(sv.position.length(), radius, &format!("radius at t={time}"));
            assert_almost_eq(
                sv.position.dot(sv.velocity) / (sv.position.length() * sv.velocity.length()),
                0.0,
                &format!("radial velocity at t={time}"),
            );
        }
    }
}

#[test]
fn full_turn_of_true_anomaly_is_one_period() {
    let solver = precise_solver();
    let orbit = random_elliptic(random_mu());
    let start = orbit.get_true_anomaly();

    let after = orbit.propagated(orbit.get_orbital_period() * 0.5, &solver).unwrap();
    let back = after.propagated(orbit.get_orbital_period() * 0.5, &solver).unwrap();

    assert_almost_eq_angle(back.get_true_anomaly(), start, "true anomaly after a period");
    assert!(back.get_true_anomaly() < TAU);
}
