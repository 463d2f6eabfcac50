use crate::environment::{Atmosphere, CentralBodyState};
use bodytypes::prelude::{CartesianState, Epoch, FlightConditionsState};
use na::Vector3;

/// Flight conditions of a vehicle wrt its central body, cached per epoch.
///
/// Evaluation and storage are split so the inputs can be gathered from the
/// central body while the vehicle is borrowed mutably.
#[derive(Clone, PartialEq, Debug)]
pub struct FlightConditions {
    central_body: String,
    current_time: Epoch,
    state: FlightConditionsState,
}

impl FlightConditions {
    pub fn new(central_body: impl Into<String>) -> Self {
        Self {
            central_body: central_body.into(),
            current_time: Epoch::NAN,
            state: FlightConditionsState::default(),
        }
    }

    pub fn central_body(&self) -> &str {
        &self.central_body
    }

    pub fn current_time(&self) -> Epoch {
        self.current_time
    }

    pub fn is_current(&self, time: Epoch) -> bool {
        time == self.current_time
    }

    pub fn state(&self) -> &FlightConditionsState {
        &self.state
    }

    pub fn set_current(&mut self, time: Epoch, state: FlightConditionsState) {
        self.current_time = time;
        self.state = state;
    }

    pub fn reset_current_time(&mut self) {
        self.current_time = Epoch::NAN;
    }

    /// Missing atmosphere yields vacuum conditions, missing shape yields
    /// altitude measured from the central body's center.
    pub fn evaluate(
        time: Epoch,
        body_state: &CartesianState,
        central: &CentralBodyState,
        atmosphere: Option<&dyn Atmosphere>,
        shape_radius: Option<f64>,
    ) -> FlightConditionsState {
        let to_fixed = central.rotation.rotation_to_body();
        let r_rel: Vector3<f64> =
            body_state.fixed_rows::<3>(0) - central.state.fixed_rows::<3>(0);
        let v_rel: Vector3<f64> =
            body_state.fixed_rows::<3>(3) - central.state.fixed_rows::<3>(3);
        let r_fixed = to_fixed * r_rel;
        let v_fixed = to_fixed * v_rel - central.rotation.angular_velocity.cross(&r_fixed);

        let r = r_fixed.norm();
        let (latitude, longitude) = if r > 0.0 {
            ((r_fixed.z / r).asin(), r_fixed.y.atan2(r_fixed.x))
        } else {
            (0.0, 0.0)
        };
        let altitude = r - shape_radius.unwrap_or(0.0);
        let airspeed = v_fixed.norm();

        let (density, temperature, speed_of_sound) = match atmosphere {
            Some(atm) => (
                atm.density(altitude, longitude, latitude, time),
                atm.temperature(altitude, longitude, latitude, time),
                atm.speed_of_sound(altitude, longitude, latitude, time),
            ),
            None => (0.0, 0.0, 0.0),
        };
        let mach_number = if speed_of_sound > 0.0 {
            airspeed / speed_of_sound
        } else {
            0.0
        };

        FlightConditionsState {
            altitude,
            latitude,
            longitude,
            density,
            temperature,
            airspeed,
            mach_number,
            dynamic_pressure: 0.5 * density * airspeed * airspeed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ExponentialAtmosphere;
    use approx::assert_relative_eq;
    use bodytypes::prelude::RotationalState;

    #[test]
    fn co_rotating_body_has_zero_airspeed() {
        let omega = 7.292115E-5;
        let central = CentralBodyState {
            state: CartesianState::zeros(),
            rotation: RotationalState::new(
                na::UnitQuaternion::identity(),
                Vector3::new(0.0, 0.0, omega),
            ),
        };
        let r = 6.478E6;
        let body = CartesianState::new(r, 0.0, 0.0, 0.0, omega * r, 0.0);
        let atm = ExponentialAtmosphere::earth();

        let fc = FlightConditions::evaluate(0.0, &body, &central, Some(&atm), Some(6.378E6));
        assert_relative_eq!(fc.altitude, 100.0E3, epsilon = 1e-6);
        assert_relative_eq!(fc.airspeed, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fc.dynamic_pressure, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fc.density, atm.density(100.0E3, 0.0, 0.0, 0.0));
    }

    #[test]
    fn vacuum_without_atmosphere() {
        let central = CentralBodyState {
            state: CartesianState::zeros(),
            rotation: RotationalState::default(),
        };
        let body = CartesianState::new(0.0, 0.0, 7.0E6, 7.5E3, 0.0, 0.0);
        let fc = FlightConditions::evaluate(0.0, &body, &central, None, None);
        assert_relative_eq!(fc.altitude, 7.0E6);
        assert_relative_eq!(fc.latitude, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(fc.airspeed, 7.5E3);
        assert_eq!(fc.mach_number, 0.0);
        assert_eq!(fc.dynamic_pressure, 0.0);
    }

    #[test]
    fn reset_invalidates_time() {
        let mut fc = FlightConditions::new("Earth");
        assert!(!fc.is_current(0.0));
        fc.set_current(1.0, FlightConditionsState::default());
        assert!(fc.is_current(1.0));
        fc.reset_current_time();
        assert!(!fc.is_current(1.0));
    }
}
