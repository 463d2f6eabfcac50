use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use bodytypes::prelude::{
    AerodynamicAngles, CartesianState, EnvironmentModelKind, Epoch, IntegratedStateType,
};
use propagator_lib::{
    environment::{
        AerodynamicAngleCalculator, Bodies, Body, ConstantEphemeris, Ephemeris,
        EnvironmentUpdater, Error, ExponentialAtmosphere, GravityField, GravityFieldVariation,
        IntegratedStates, RadiationPressureInterface, SimpleRotationalEphemeris,
        SphericalHarmonicsField, StateVectors, TimeDependentSphericalHarmonicsField, UpdateEntry,
        UpdateSettings, MAX_ORDER_ITERATIONS,
    },
    na::{DMatrix, DVector, UnitQuaternion},
};
use approx::assert_relative_eq;

use EnvironmentModelKind::*;

type CallLog = Rc<RefCell<Vec<String>>>;

/// Constant ephemeris that records every evaluation
#[derive(Debug)]
struct LoggingEphemeris {
    body: &'static str,
    state: CartesianState,
    calls: Rc<Cell<usize>>,
    log: CallLog,
}

impl Ephemeris for LoggingEphemeris {
    fn cartesian_state(&self, time: Epoch) -> CartesianState {
        self.calls.set(self.calls.get() + 1);
        self.log.borrow_mut().push(format!("ephemeris {} {time}", self.body));
        self.state * (1.0 + time)
    }
}

#[derive(Debug)]
struct LoggingVariation {
    body: &'static str,
    log: CallLog,
}

impl GravityFieldVariation for LoggingVariation {
    fn add_corrections(&self, time: Epoch, cosine: &mut DMatrix<f64>, _sine: &mut DMatrix<f64>) {
        self.log.borrow_mut().push(format!("gravity {} {time}", self.body));
        cosine[(2, 0)] += 1.0E-12 * time;
    }
}

fn harmonics() -> SphericalHarmonicsField {
    let mut cosine = DMatrix::zeros(3, 3);
    cosine[(0, 0)] = 1.0;
    cosine[(2, 0)] = -4.841695E-4;
    SphericalHarmonicsField {
        gravitational_parameter: 3.986004418E14,
        reference_radius: 6.378137E6,
        cosine_coefficients: cosine,
        sine_coefficients: DMatrix::zeros(3, 3),
    }
}

fn settings(entries: &[(EnvironmentModelKind, &[&str])]) -> UpdateSettings {
    entries
        .iter()
        .map(|(k, names)| (*k, names.iter().map(|n| n.to_string()).collect()))
        .collect()
}

fn integrated(entries: &[(IntegratedStateType, &[&str])]) -> IntegratedStates {
    entries
        .iter()
        .map(|(k, names)| {
            (
                *k,
                names.iter().map(|n| (n.to_string(), String::new())).collect(),
            )
        })
        .collect()
}

fn translational(values: &[f64]) -> StateVectors {
    [(
        IntegratedStateType::Translational,
        DVector::from_column_slice(values),
    )]
    .into_iter()
    .collect()
}

fn position(entries: &[UpdateEntry], kind: EnvironmentModelKind, body: &str) -> usize {
    entries
        .iter()
        .position(|e| e.kind == kind && e.body == body)
        .unwrap()
}

#[test]
fn end_to_end_integrated_and_ephemeris_bodies() {
    let log = CallLog::default();
    let calls = Rc::new(Cell::new(0));
    let b_state = CartesianState::new(1.0E7, 0.0, 0.0, 0.0, 2.0E3, 0.0);
    let variation: Box<dyn GravityFieldVariation> = Box::new(LoggingVariation {
        body: "B",
        log: log.clone(),
    });
    let field = TimeDependentSphericalHarmonicsField::new(harmonics(), vec![variation]);
    let mut bodies: Bodies = [
        Body::new("A"),
        Body::new("B")
            .with_ephemeris(LoggingEphemeris {
                body: "B",
                state: b_state,
                calls: calls.clone(),
                log: log.clone(),
            })
            .with_gravity_field(GravityField::TimeDependentSphericalHarmonics(field)),
    ]
    .into_iter()
    .collect();

    let updater = EnvironmentUpdater::new(
        &bodies,
        settings(&[
            (SphericalHarmonicGravityField, &["B"]),
            (TranslationalState, &["B"]),
        ]),
        integrated(&[(IntegratedStateType::Translational, &["A"])]),
    )
    .unwrap();
    assert_eq!(
        updater.update_entries(),
        &[
            UpdateEntry::new(TranslationalState, "B"),
            UpdateEntry::new(SphericalHarmonicGravityField, "B"),
        ]
    );
    assert!(updater.reset_entries().is_empty());

    let a_state = [7.0E6, 1.0, 2.0, 3.0, 7.5E3, 4.0];
    updater
        .update_environment(&mut bodies, 5.0, &translational(&a_state), &[])
        .unwrap();

    assert_eq!(bodies.get("A").unwrap().state().as_slice(), &a_state);
    assert_eq!(bodies.get("B").unwrap().state(), &(b_state * 6.0));
    let field = bodies.get("B").unwrap().time_dependent_gravity_field().unwrap();
    assert_eq!(field.current_time(), 5.0);
    assert_eq!(
        field.field().cosine_coefficients[(2, 0)],
        -4.841695E-4 + 1.0E-12 * 5.0
    );
    assert_eq!(
        log.borrow().as_slice(),
        &["ephemeris B 5".to_owned(), "gravity B 5".to_owned()]
    );
    assert_eq!(calls.get(), 1);
}

#[test]
fn integrated_body_never_reads_its_ephemeris() {
    let calls = Rc::new(Cell::new(0));
    let mut bodies: Bodies = [Body::new("A").with_ephemeris(LoggingEphemeris {
        body: "A",
        state: CartesianState::repeat(1.0),
        calls: calls.clone(),
        log: Default::default(),
    })]
    .into_iter()
    .collect();
    let updater = EnvironmentUpdater::new(
        &bodies,
        settings(&[(TranslationalState, &["A"])]),
        integrated(&[(IntegratedStateType::Translational, &["A"])]),
    )
    .unwrap();
    assert!(updater.update_entries().is_empty());

    for i in 0..10 {
        let t = i as f64;
        let state = [t, 0.0, 0.0, 0.0, 1.0, 0.0];
        updater
            .update_environment(&mut bodies, t, &translational(&state), &[])
            .unwrap();
        assert_eq!(bodies.get("A").unwrap().state().as_slice(), &state);
    }
    assert_eq!(calls.get(), 0);

    // Overriding from the environment is the only way the ephemeris is read
    updater
        .update_environment(
            &mut bodies,
            2.0,
            &StateVectors::new(),
            &[IntegratedStateType::Translational],
        )
        .unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(bodies.get("A").unwrap().state(), &CartesianState::repeat(3.0));
}

#[test]
fn injection_is_bit_exact() {
    let mut bodies: Bodies = [Body::new("A"), Body::new("B")].into_iter().collect();
    let updater = EnvironmentUpdater::new(
        &bodies,
        UpdateSettings::new(),
        integrated(&[(IntegratedStateType::Translational, &["A", "B"])]),
    )
    .unwrap();
    let values = [
        0.1 + 0.2,
        -0.0,
        f64::MIN_POSITIVE,
        1.0E-300,
        std::f64::consts::PI,
        -1.0 / 3.0,
        f64::EPSILON,
        6.378137E6,
        -7.5E3 / 7.0,
        1.0E300,
        -f64::MIN_POSITIVE / 2.0,
        2.0_f64.sqrt(),
    ];
    updater
        .update_environment(&mut bodies, 0.0, &translational(&values), &[])
        .unwrap();

    let injected: Vec<u64> = ["A", "B"]
        .iter()
        .flat_map(|n| bodies.get(n).unwrap().state().as_slice().to_vec())
        .map(f64::to_bits)
        .collect();
    let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    assert_eq!(injected, expected);
}

fn capsule_environment() -> Bodies {
    [
        Body::new("Earth")
            .with_ephemeris(ConstantEphemeris::new(CartesianState::zeros()))
            .with_rotational_ephemeris(SimpleRotationalEphemeris::new(
                UnitQuaternion::identity(),
                7.292115E-5,
                0.0,
            ))
            .with_atmosphere(ExponentialAtmosphere::earth())
            .with_shape_radius(6.378137E6),
        Body::new("Capsule")
            .with_dependent_orientation(AerodynamicAngleCalculator::new(
                "Earth",
                AerodynamicAngles::new(0.3, 0.0, 0.5),
            ))
            .with_flight_conditions("Earth"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn aerodynamic_orientation_follows_central_body_for_any_request_order() {
    let bodies = capsule_environment();
    let rotational_orders: [&[&str]; 2] = [&["Capsule", "Earth"], &["Earth", "Capsule"]];
    for rotational in rotational_orders {
        for flight_first in [false, true] {
            let mut requests = vec![(RotationalState, rotational), (TranslationalState, &["Earth"][..])];
            if flight_first {
                requests.insert(0, (FlightConditions, &["Capsule"][..]));
            } else {
                requests.push((FlightConditions, &["Capsule"][..]));
            }
            let updater = EnvironmentUpdater::new(
                &bodies,
                settings(&requests),
                integrated(&[(IntegratedStateType::Translational, &["Capsule"])]),
            )
            .unwrap();
            let entries = updater.update_entries();
            let capsule = position(entries, RotationalState, "Capsule");
            assert!(position(entries, TranslationalState, "Earth") < capsule);
            assert!(position(entries, RotationalState, "Earth") < capsule);
            assert_eq!(updater.reset_entries().len(), 2);
        }
    }
}

fn capsule_updater(bodies: &Bodies) -> EnvironmentUpdater {
    EnvironmentUpdater::new(
        bodies,
        settings(&[
            (TranslationalState, &["Earth"]),
            (RotationalState, &["Earth", "Capsule"]),
            (FlightConditions, &["Capsule"]),
        ]),
        integrated(&[(IntegratedStateType::Translational, &["Capsule"])]),
    )
    .unwrap()
}

#[test]
fn cached_models_follow_new_state_at_same_time() {
    let first = [6.578137E6, 0.0, 0.0, 0.0, 7.7E3, 0.0];
    let second = [6.678137E6, 0.0, 0.0, 0.0, 0.0, 7.7E3];

    let mut bodies = capsule_environment();
    let updater = capsule_updater(&bodies);
    updater
        .update_environment(&mut bodies, 3.0, &translational(&first), &[])
        .unwrap();
    let capsule = bodies.get("Capsule").unwrap();
    let first_rotation = capsule.rotational_state().rotation_to_base;
    assert_relative_eq!(
        capsule.flight_conditions().unwrap().state().altitude,
        2.0E5,
        max_relative = 1.0E-9
    );

    updater
        .update_environment(&mut bodies, 3.0, &translational(&second), &[])
        .unwrap();
    let capsule = bodies.get("Capsule").unwrap();
    assert_relative_eq!(
        capsule.flight_conditions().unwrap().state().altitude,
        3.0E5,
        max_relative = 1.0E-9
    );
    assert!(capsule.rotational_state().rotation_to_base.angle_to(&first_rotation) > 0.1);

    // Same result as a fresh environment that only ever saw the second state
    let mut fresh = capsule_environment();
    capsule_updater(&fresh)
        .update_environment(&mut fresh, 3.0, &translational(&second), &[])
        .unwrap();
    let expected = fresh.get("Capsule").unwrap();
    assert_eq!(capsule.rotational_state(), expected.rotational_state());
    assert_eq!(
        capsule.flight_conditions().unwrap().state(),
        expected.flight_conditions().unwrap().state()
    );
}

#[test]
fn size_mismatch_leaves_environment_untouched() {
    let mut bodies = capsule_environment();
    let updater = capsule_updater(&bodies);

    let state = [6.578137E6, 0.0, 0.0, 0.0, 7.7E3, 0.0];
    updater
        .update_environment(&mut bodies, 1.0, &translational(&state), &[])
        .unwrap();
    let capsule = bodies.get("Capsule").unwrap();
    let before_state = *capsule.state();
    let before_rotation = *capsule.rotational_state();
    assert_eq!(capsule.flight_conditions().unwrap().current_time(), 1.0);

    let err = updater
        .update_environment(&mut bodies, 2.0, &StateVectors::new(), &[])
        .unwrap_err();
    assert_eq!(
        err,
        Error::InconsistentInputSize {
            states: 0,
            overrides: 0,
            configured: 1,
        }
    );

    let mut too_many = translational(&[1.0; 6]);
    too_many.insert(IntegratedStateType::Mass, DVector::from_vec(vec![1.0]));
    assert!(matches!(
        updater.update_environment(&mut bodies, 2.0, &too_many, &[]),
        Err(Error::InconsistentInputSize { .. })
    ));

    let capsule = bodies.get("Capsule").unwrap();
    assert_eq!(capsule.state(), &before_state);
    assert_eq!(capsule.rotational_state(), &before_rotation);
    assert_eq!(capsule.flight_conditions().unwrap().current_time(), 1.0);
    assert_eq!(capsule.dependent_orientation().unwrap().current_time(), 1.0);
}

#[test]
fn static_harmonics_cannot_be_updated() {
    let bodies: Bodies = [Body::new("Earth").with_gravity_field(GravityField::SphericalHarmonics(harmonics()))]
        .into_iter()
        .collect();
    let err = EnvironmentUpdater::new(
        &bodies,
        settings(&[(SphericalHarmonicGravityField, &["Earth"])]),
        IntegratedStates::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingModel {
            kind: SphericalHarmonicGravityField,
            ..
        }
    ));
}

#[test]
fn mutually_dependent_orientations_are_rejected() {
    let calc = |c: &str| AerodynamicAngleCalculator::new(c, AerodynamicAngles::default());
    let bodies: Bodies = [
        Body::new("A")
            .with_ephemeris(ConstantEphemeris::new(CartesianState::zeros()))
            .with_dependent_orientation(calc("B")),
        Body::new("B")
            .with_ephemeris(ConstantEphemeris::new(CartesianState::repeat(1.0)))
            .with_dependent_orientation(calc("A")),
    ]
    .into_iter()
    .collect();
    let err = EnvironmentUpdater::new(
        &bodies,
        settings(&[(TranslationalState, &["A", "B"]), (RotationalState, &["A", "B"])]),
        IntegratedStates::new(),
    )
    .unwrap_err();
    assert_eq!(err, Error::InfiniteLoop(MAX_ORDER_ITERATIONS));
}

#[test]
fn aerodynamic_orientation_without_central_updates_is_rejected() {
    let bodies = capsule_environment();
    let err = EnvironmentUpdater::new(
        &bodies,
        settings(&[(RotationalState, &["Capsule", "Earth"])]),
        IntegratedStates::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::DependencyResolution {
            missing: TranslationalState,
            ..
        }
    ));
}

#[test]
fn unknown_body_rejected() {
    let bodies = capsule_environment();
    assert_eq!(
        EnvironmentUpdater::new(
            &bodies,
            settings(&[(FlightConditions, &["Moon"])]),
            IntegratedStates::new(),
        )
        .unwrap_err(),
        Error::UnknownBody("Moon".to_owned())
    );
}

#[test]
fn every_radiation_interface_updated() {
    let mut bodies: Bodies = [
        Body::new("Sun").with_ephemeris(ConstantEphemeris::new(CartesianState::new(
            1.496E11, 0.0, 0.0, 0.0, 0.0, 0.0,
        ))),
        Body::new("Earth"),
        Body::new("Probe")
            .with_radiation_pressure(RadiationPressureInterface::solar("Sun", 4.0, 1.2))
            .with_radiation_pressure(RadiationPressureInterface::new("Earth", 1.0E-6, 7.0E6, 4.0, 1.2)),
    ]
    .into_iter()
    .collect();
    let updater = EnvironmentUpdater::new(
        &bodies,
        settings(&[(RadiationPressure, &["Probe"]), (TranslationalState, &["Sun"])]),
        integrated(&[(IntegratedStateType::Translational, &["Probe"])]),
    )
    .unwrap();
    assert_eq!(updater.update_entries().len(), 3);

    updater
        .update_environment(
            &mut bodies,
            30.0,
            &translational(&[7.0E6, 0.0, 0.0, 0.0, 7.5E3, 0.0]),
            &[],
        )
        .unwrap();
    let probe = bodies.get("Probe").unwrap();
    for interface in probe.radiation_pressure().values() {
        assert_eq!(interface.current_time(), 30.0);
        assert!(interface.current_pressure() > 0.0);
    }
    assert_eq!(probe.radiation_pressure()["Earth"].current_pressure(), 1.0E-6);
}

fn run_sequence() -> Bodies {
    let mut bodies = capsule_environment();
    let updater = EnvironmentUpdater::new(
        &bodies,
        settings(&[
            (FlightConditions, &["Capsule"]),
            (RotationalState, &["Capsule", "Earth"]),
            (TranslationalState, &["Earth"]),
        ]),
        integrated(&[(IntegratedStateType::Translational, &["Capsule"])]),
    )
    .unwrap();
    for i in 0..20 {
        let t = 0.5 * i as f64;
        let state = [6.578137E6 - 10.0 * t, 7.7E3 * t, 0.0, -10.0, 7.7E3, 0.0];
        updater
            .update_environment(&mut bodies, t, &translational(&state), &[])
            .unwrap();
        // Same time twice, as when an integrator repeats a stage
        updater
            .update_environment(&mut bodies, t, &translational(&state), &[])
            .unwrap();
    }
    bodies
}

#[test]
fn repeated_runs_are_identical() {
    let a = run_sequence();
    let b = run_sequence();
    for name in ["Earth", "Capsule"] {
        let (a, b) = (a.get(name).unwrap(), b.get(name).unwrap());
        assert_eq!(a.state(), b.state());
        assert_eq!(a.rotational_state(), b.rotational_state());
    }
    let fc = |bodies: &Bodies| *bodies.get("Capsule").unwrap().flight_conditions().unwrap().state();
    assert_eq!(fc(&a), fc(&b));
    assert!(fc(&a).altitude > 0.0);
    assert!(fc(&a).dynamic_pressure > 0.0);
}
