use std::collections::BTreeMap;

use crate::scenario::config::{
    Atmosphere, Body, Config, Ephemeris, EphemerisModel, FlightConditions, Gravity, GravityModel,
    IntegratedState, Rotation, RotationModel,
};

pub const EARTH_GRAVITATIONAL_PARAMETER: f64 = 3.986004418E14;
pub const EARTH_RADIUS: f64 = 6.378137E6;
pub const EARTH_ROTATION_RATE: f64 = 7.292115E-5;

/// A capsule in a 200 km circular equatorial orbit about a rotating Earth,
/// oriented by its aerodynamic angles.
pub fn config() -> Config {
    let radius = EARTH_RADIUS + 200.0E3;
    let speed = (EARTH_GRAVITATIONAL_PARAMETER / radius).sqrt();

    let earth = Body {
        name: "Earth".to_owned(),
        state: None,
        mass: None,
        shape_radius: Some(EARTH_RADIUS),
        ephemeris: Some(Ephemeris {
            model: EphemerisModel::Constant,
            state: Some(vec![0.0; 6]),
            path: None,
        }),
        rotation: Some(Rotation {
            model: RotationModel::Simple,
            rotation_rate: Some(EARTH_ROTATION_RATE),
            reference_epoch: None,
            initial_angle: None,
            central_body: None,
            angle_of_attack: None,
            sideslip: None,
            bank: None,
        }),
        gravity: Some(Gravity {
            model: GravityModel::PointMass,
            gravitational_parameter: EARTH_GRAVITATIONAL_PARAMETER,
            reference_radius: None,
            cosine: Vec::new(),
            sine: Vec::new(),
            variations: Vec::new(),
        }),
        atmosphere: Some(Atmosphere::default()),
        flight_conditions: None,
        radiation_pressures: Vec::new(),
        mass_model: None,
    };

    let capsule = Body {
        name: "Capsule".to_owned(),
        state: Some(vec![radius, 0.0, 0.0, 0.0, speed, 0.0]),
        mass: Some(2500.0),
        shape_radius: None,
        ephemeris: None,
        rotation: Some(Rotation {
            model: RotationModel::AerodynamicAngles,
            rotation_rate: None,
            reference_epoch: None,
            initial_angle: None,
            central_body: Some("Earth".to_owned()),
            angle_of_attack: Some(5.0),
            sideslip: None,
            bank: None,
        }),
        gravity: None,
        atmosphere: None,
        flight_conditions: Some(FlightConditions {
            central_body: "Earth".to_owned(),
        }),
        radiation_pressures: Vec::new(),
        mass_model: None,
    };

    let updates = [
        ("translational-state", vec!["Earth"]),
        ("rotational-state", vec!["Earth", "Capsule"]),
        ("flight-conditions", vec!["Capsule"]),
    ]
    .into_iter()
    .map(|(k, bodies)| (k.to_owned(), bodies.into_iter().map(String::from).collect()))
    .collect::<BTreeMap<_, _>>();

    Config {
        name: Some("nominal".to_owned()),
        start_epoch: None,
        duration: Some(5400.0),
        step: Some(10.0),
        output_every: Some(6),
        bodies: vec![earth, capsule],
        integrated_states: vec![IntegratedState {
            kind: "translational-state".to_owned(),
            body: "Capsule".to_owned(),
            reference: String::new(),
            initial: None,
        }],
        updates,
    }
}
