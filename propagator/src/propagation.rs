//! Fixed-step RK4 propagation of the integrated states under point-mass
//! gravity, driving the environment updater at every stage.

use bodytypes::prelude::{Epoch, FlightConditionsState, IntegratedStateType};
use na::{DVector, Quaternion, Vector3};
use serde::Serialize;
use tracing::trace;

use crate::environment::{Bodies, EnvironmentUpdater, Error, StateVectors};

/// Four stage evaluations and the final state
pub const ENVIRONMENT_UPDATES_PER_STEP: u64 = 5;

/// Fraction of a step below which the end epoch counts as reached
pub const END_EPOCH_STEP_FRACTION: f64 = 1.0E-6;

/// Size of the next step from `epoch` towards `end`, or `None` once `end` is reached.
///
/// The last step is shortened to land on `end`. A remainder within rounding of
/// `end` ends the run instead of producing a vanishing step.
pub fn next_step_size(epoch: Epoch, end: Epoch, step: f64) -> Option<f64> {
    let remaining = end - epoch;
    let tolerance = step * END_EPOCH_STEP_FRACTION + 16.0 * f64::EPSILON * end.abs();
    if remaining <= tolerance {
        None
    } else {
        Some(step.min(remaining))
    }
}

#[derive(Debug)]
pub struct Propagation {
    updater: EnvironmentUpdater,
    bodies: Bodies,
    epoch: Epoch,
    states: StateVectors,
}

impl Propagation {
    /// Brings the environment to `epoch` with the initial states
    pub fn new(
        updater: EnvironmentUpdater,
        mut bodies: Bodies,
        epoch: Epoch,
        states: StateVectors,
    ) -> Result<Self, Error> {
        updater.update_environment(&mut bodies, epoch, &states, &[])?;
        Ok(Self {
            updater,
            bodies,
            epoch,
            states,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn states(&self) -> &StateVectors {
        &self.states
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn updater(&self) -> &EnvironmentUpdater {
        &self.updater
    }

    /// Advances by `dt`, returning the number of environment updates made
    pub fn step(&mut self, dt: f64) -> Result<u64, Error> {
        let t = self.epoch;
        let y = self.states.clone();

        let k1 = self.derivative(t, &y)?;
        let k2 = self.derivative(t + 0.5 * dt, &add_scaled(&y, &k1, 0.5 * dt))?;
        let k3 = self.derivative(t + 0.5 * dt, &add_scaled(&y, &k2, 0.5 * dt))?;
        let k4 = self.derivative(t + dt, &add_scaled(&y, &k3, dt))?;

        let mut next = y;
        for (state_type, v) in next.iter_mut() {
            let sum = &k1[state_type] + &k2[state_type] * 2.0 + &k3[state_type] * 2.0 + &k4[state_type];
            *v += sum * (dt / 6.0);
        }

        self.epoch = t + dt;
        self.updater
            .update_environment(&mut self.bodies, self.epoch, &next, &[])?;
        self.states = next;
        trace!(epoch = self.epoch, "Propagated");
        Ok(ENVIRONMENT_UPDATES_PER_STEP)
    }

    fn derivative(&mut self, time: Epoch, states: &StateVectors) -> Result<StateVectors, Error> {
        self.updater
            .update_environment(&mut self.bodies, time, states, &[])?;

        let mut derivative = StateVectors::new();
        for (state_type, integrated) in self.updater.integrated_states().iter() {
            let size = state_type.state_size();
            let mut d = DVector::zeros(integrated.len() * size);
            for (i, (name, _)) in integrated.iter().enumerate() {
                let body = self.bodies.require(name)?;
                let mut segment = d.rows_mut(i * size, size);
                match state_type {
                    IntegratedStateType::Translational => {
                        let a = gravitational_acceleration(&self.bodies, name, &body.position());
                        segment.fixed_rows_mut::<3>(0).copy_from(&body.velocity());
                        segment.fixed_rows_mut::<3>(3).copy_from(&a);
                    }
                    IntegratedStateType::Rotational => {
                        let rot = body.rotational_state();
                        let w = rot.angular_velocity;
                        let q_dot = rot.rotation_to_base.quaternion()
                            * Quaternion::new(0.0, w.x, w.y, w.z)
                            * 0.5;
                        segment[0] = q_dot.w;
                        segment[1] = q_dot.i;
                        segment[2] = q_dot.j;
                        segment[3] = q_dot.k;
                    }
                    IntegratedStateType::Mass => {
                        segment[0] = body.mass_model().map(|m| m.mass_rate(time)).unwrap_or(0.0);
                    }
                }
            }
            derivative.insert(*state_type, d);
        }
        Ok(derivative)
    }

    pub fn record(&self) -> StepRecord {
        StepRecord {
            epoch: self.epoch,
            utc: bodytypes::time::from_seconds_since_j2000(self.epoch).to_rfc3339(),
            bodies: self.bodies.iter().map(BodySnapshot::from).collect(),
        }
    }
}

/// Point-mass attraction of every other body with a gravity field
fn gravitational_acceleration(bodies: &Bodies, name: &str, position: &Vector3<f64>) -> Vector3<f64> {
    bodies
        .iter()
        .filter(|b| b.name() != name)
        .filter_map(|b| {
            let mu = b.gravity_field()?.gravitational_parameter();
            let r = position - b.position();
            let d = r.norm();
            (d > 0.0).then(|| -r * (mu / (d * d * d)))
        })
        .sum()
}

fn add_scaled(y: &StateVectors, k: &StateVectors, h: f64) -> StateVectors {
    y.iter()
        .map(|(state_type, v)| (*state_type, v + &k[state_type] * h))
        .collect()
}

/// Output for a single body at one epoch
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct BodySnapshot {
    pub name: String,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub mass: f64,
    /// Body-fixed to base quaternion as [w, x, y, z]
    pub attitude: [f64; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_conditions: Option<FlightConditionsSnapshot>,
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct FlightConditionsSnapshot {
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub density: f64,
    pub airspeed: f64,
    pub mach_number: f64,
    pub dynamic_pressure: f64,
}

impl From<&FlightConditionsState> for FlightConditionsSnapshot {
    fn from(s: &FlightConditionsState) -> Self {
        Self {
            altitude: s.altitude,
            latitude: s.latitude,
            longitude: s.longitude,
            density: s.density,
            airspeed: s.airspeed,
            mach_number: s.mach_number,
            dynamic_pressure: s.dynamic_pressure,
        }
    }
}

impl From<&crate::environment::Body> for BodySnapshot {
    fn from(body: &crate::environment::Body) -> Self {
        let q = body.rotational_state().rotation_to_base.quaternion();
        Self {
            name: body.name().to_owned(),
            position: body.position(),
            velocity: body.velocity(),
            mass: body.mass(),
            attitude: [q.w, q.i, q.j, q.k],
            flight_conditions: body
                .flight_conditions()
                .map(|fc| FlightConditionsSnapshot::from(fc.state())),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct StepRecord {
    pub epoch: Epoch,
    pub utc: String,
    pub bodies: Vec<BodySnapshot>,
}
