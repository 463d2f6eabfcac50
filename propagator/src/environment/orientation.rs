//! Orientation models that derive a body's attitude from its current state
//! rather than from a closed-form rotational ephemeris.

use bodytypes::prelude::{AerodynamicAngles, CartesianState, Epoch, RotationalState};
use na::{Matrix3, Rotation3, UnitQuaternion, Vector3};

/// State of the body an orientation is derived relative to
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CentralBodyState {
    pub state: CartesianState,
    pub rotation: RotationalState,
}

/// Current environment values a dependent orientation is computed from
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct OrientationInputs {
    /// Global-frame state of the body being oriented
    pub body_state: CartesianState,
    /// Present when the calculator names a central body
    pub central: Option<CentralBodyState>,
}

pub trait DependentOrientationCalculator: std::fmt::Debug {
    /// The body whose state must be current before this calculator is updated
    fn central_body(&self) -> Option<&str> {
        None
    }

    /// Capability query for the aerodynamic angle calculator
    fn as_aerodynamic_angle_calculator(&self) -> Option<&AerodynamicAngleCalculator> {
        None
    }

    /// Recomputes the orientation unless already current for `time`
    fn update(&mut self, time: Epoch, inputs: &OrientationInputs);

    /// Invalidates the cached evaluation time, forcing the next update to recompute
    fn reset_current_time(&mut self);

    fn current_time(&self) -> Epoch;

    fn rotational_state(&self) -> RotationalState;
}

/// Derives a body frame from the trajectory of the body relative to a
/// rotating central body and commanded angle of attack, sideslip and bank.
///
/// Frame chain: central body-fixed -> local vertical (north, east, down) ->
/// trajectory (heading, flight path angle) -> aerodynamic (bank) -> body
/// (angle of attack, sideslip).
#[derive(Clone, PartialEq, Debug)]
pub struct AerodynamicAngleCalculator {
    central_body: String,
    angles: AerodynamicAngles,
    current_time: Epoch,
    rotational_state: RotationalState,
    latitude: f64,
    longitude: f64,
    heading: f64,
    flight_path_angle: f64,
}

impl AerodynamicAngleCalculator {
    pub fn new(central_body: impl Into<String>, angles: AerodynamicAngles) -> Self {
        Self {
            central_body: central_body.into(),
            angles,
            current_time: Epoch::NAN,
            rotational_state: RotationalState::default(),
            latitude: 0.0,
            longitude: 0.0,
            heading: 0.0,
            flight_path_angle: 0.0,
        }
    }

    pub fn central_body(&self) -> &str {
        &self.central_body
    }

    pub fn angles(&self) -> AerodynamicAngles {
        self.angles
    }

    /// Takes effect at the next update that recomputes
    pub fn set_angles(&mut self, angles: AerodynamicAngles) {
        self.angles = angles;
    }

    /// Geocentric latitude [rad]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// [rad]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// [rad], from north towards east
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// [rad], positive above the local horizontal
    pub fn flight_path_angle(&self) -> f64 {
        self.flight_path_angle
    }

    fn compute(&mut self, body_state: &CartesianState, central: &CentralBodyState) {
        let to_base = central.rotation.rotation_to_base;
        let to_fixed = to_base.inverse();

        let r_rel: Vector3<f64> =
            body_state.fixed_rows::<3>(0) - central.state.fixed_rows::<3>(0);
        let v_rel: Vector3<f64> =
            body_state.fixed_rows::<3>(3) - central.state.fixed_rows::<3>(3);
        let r_fixed = to_fixed * r_rel;
        let v_fixed = to_fixed * v_rel - central.rotation.angular_velocity.cross(&r_fixed);

        let r = r_fixed.norm();
        if r > 0.0 {
            self.latitude = (r_fixed.z / r).asin();
            self.longitude = r_fixed.y.atan2(r_fixed.x);
        }

        let fixed_from_vertical = vertical_to_body_fixed(self.latitude, self.longitude);
        let v_vertical = fixed_from_vertical.inverse() * v_fixed;
        let horizontal = v_vertical.x.hypot(v_vertical.y);
        if v_vertical.norm() > 0.0 {
            self.heading = v_vertical.y.atan2(v_vertical.x);
            self.flight_path_angle = (-v_vertical.z).atan2(horizontal);
        }

        let vertical_from_trajectory = Rotation3::from_axis_angle(&Vector3::z_axis(), self.heading)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.flight_path_angle);
        let trajectory_from_aerodynamic =
            Rotation3::from_axis_angle(&Vector3::x_axis(), self.angles.bank);
        let aerodynamic_from_body = Rotation3::from_axis_angle(&Vector3::z_axis(), self.angles.sideslip)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), -self.angles.angle_of_attack);

        let fixed_from_body = fixed_from_vertical
            * vertical_from_trajectory
            * trajectory_from_aerodynamic
            * aerodynamic_from_body;
        let rotation_to_base = to_base * UnitQuaternion::from_rotation_matrix(&fixed_from_body);

        // Co-rotating with the central body
        let central_rate_in_base = to_base * central.rotation.angular_velocity;
        let angular_velocity = rotation_to_base.inverse() * central_rate_in_base;

        self.rotational_state = RotationalState::new(rotation_to_base, angular_velocity);
    }
}

impl DependentOrientationCalculator for AerodynamicAngleCalculator {
    fn central_body(&self) -> Option<&str> {
        Some(&self.central_body)
    }

    fn as_aerodynamic_angle_calculator(&self) -> Option<&AerodynamicAngleCalculator> {
        Some(self)
    }

    fn update(&mut self, time: Epoch, inputs: &OrientationInputs) {
        if time == self.current_time {
            return;
        }
        if let Some(central) = inputs.central.as_ref() {
            self.compute(&inputs.body_state, central);
            self.current_time = time;
        }
    }

    fn reset_current_time(&mut self) {
        self.current_time = Epoch::NAN;
    }

    fn current_time(&self) -> Epoch {
        self.current_time
    }

    fn rotational_state(&self) -> RotationalState {
        self.rotational_state
    }
}

/// Columns are the north, east and down axes expressed in the body-fixed frame
fn vertical_to_body_fixed(latitude: f64, longitude: f64) -> Rotation3<f64> {
    let (slat, clat) = latitude.sin_cos();
    let (slon, clon) = longitude.sin_cos();
    let north = Vector3::new(-slat * clon, -slat * slon, clat);
    let east = Vector3::new(-slon, clon, 0.0);
    let down = Vector3::new(-clat * clon, -clat * slon, -slat);
    Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[north, east, down]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn non_rotating_central() -> CentralBodyState {
        CentralBodyState {
            state: CartesianState::zeros(),
            rotation: RotationalState::default(),
        }
    }

    fn inputs(body_state: CartesianState) -> OrientationInputs {
        OrientationInputs {
            body_state,
            central: Some(non_rotating_central()),
        }
    }

    #[test]
    fn zero_angles_align_body_x_with_velocity() {
        let mut calc = AerodynamicAngleCalculator::new("Earth", AerodynamicAngles::default());
        // Equatorial, moving east and slightly climbing
        let state = CartesianState::new(7.0E6, 0.0, 0.0, 100.0, 7.5E3, 0.0);
        calc.update(10.0, &inputs(state));

        let x_body = calc.rotational_state().rotation_to_base * Vector3::x();
        let v = Vector3::new(100.0, 7.5E3, 0.0).normalize();
        assert_relative_eq!(x_body, v, epsilon = 1e-12);
        assert_relative_eq!(calc.heading(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert!(calc.flight_path_angle() > 0.0);
        assert_relative_eq!(calc.latitude(), 0.0);
    }

    #[test]
    fn bank_keeps_body_x_on_velocity() {
        let angles = AerodynamicAngles::new(0.0, 0.0, 0.6);
        let mut calc = AerodynamicAngleCalculator::new("Earth", angles);
        let state = CartesianState::new(0.0, 7.0E6, 1.0E6, -7.0E3, 0.0, 1.0E3);
        calc.update(0.0, &inputs(state));

        let x_body = calc.rotational_state().rotation_to_base * Vector3::x();
        let v = Vector3::new(-7.0E3, 0.0, 1.0E3).normalize();
        assert_relative_eq!(x_body, v, epsilon = 1e-12);
    }

    #[test]
    fn cached_on_time_until_reset() {
        let mut calc = AerodynamicAngleCalculator::new("Earth", AerodynamicAngles::default());
        let east = CartesianState::new(7.0E6, 0.0, 0.0, 0.0, 7.5E3, 0.0);
        let north = CartesianState::new(7.0E6, 0.0, 0.0, 0.0, 0.0, 7.5E3);

        calc.update(5.0, &inputs(east));
        let first = calc.rotational_state();
        calc.update(5.0, &inputs(north));
        assert_eq!(calc.rotational_state(), first);

        calc.reset_current_time();
        assert!(calc.current_time().is_nan());
        calc.update(5.0, &inputs(north));
        assert_ne!(calc.rotational_state(), first);
        assert_relative_eq!(calc.heading(), 0.0, epsilon = 1e-12);
    }
}
