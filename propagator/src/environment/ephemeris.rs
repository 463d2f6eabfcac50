use bodytypes::prelude::{CartesianState, Epoch, RotationalState};
use ephemtab::EphemerisTable;
use na::{UnitQuaternion, Vector3};

/// Closed-form or tabulated translational state of a body, in the global frame.
pub trait Ephemeris: std::fmt::Debug {
    fn cartesian_state(&self, time: Epoch) -> CartesianState;
}

/// Closed-form orientation of a body as a function of time.
pub trait RotationalEphemeris: std::fmt::Debug {
    fn rotational_state(&self, time: Epoch) -> RotationalState;
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ConstantEphemeris {
    state: CartesianState,
}

impl ConstantEphemeris {
    pub fn new(state: CartesianState) -> Self {
        Self { state }
    }
}

impl Ephemeris for ConstantEphemeris {
    fn cartesian_state(&self, _time: Epoch) -> CartesianState {
        self.state
    }
}

/// Linear interpolation over a parsed ephemeris table
#[derive(Clone, PartialEq, Debug)]
pub struct TabulatedEphemeris {
    table: EphemerisTable,
}

impl TabulatedEphemeris {
    /// Returns `None` for an empty table
    pub fn new(table: EphemerisTable) -> Option<Self> {
        if table.is_empty() {
            None
        } else {
            Some(Self { table })
        }
    }

    pub fn table(&self) -> &EphemerisTable {
        &self.table
    }
}

impl Ephemeris for TabulatedEphemeris {
    fn cartesian_state(&self, time: Epoch) -> CartesianState {
        self.table
            .interpolate(time)
            .unwrap_or_else(CartesianState::zeros)
    }
}

/// Uniform rotation about the base frame z axis
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SimpleRotationalEphemeris {
    /// Body-fixed to base rotation at the reference epoch
    pub initial_rotation_to_base: UnitQuaternion<f64>,
    /// [rad/s]
    pub rotation_rate: f64,
    pub reference_epoch: Epoch,
}

impl SimpleRotationalEphemeris {
    pub fn new(
        initial_rotation_to_base: UnitQuaternion<f64>,
        rotation_rate: f64,
        reference_epoch: Epoch,
    ) -> Self {
        Self {
            initial_rotation_to_base,
            rotation_rate,
            reference_epoch,
        }
    }
}

impl RotationalEphemeris for SimpleRotationalEphemeris {
    fn rotational_state(&self, time: Epoch) -> RotationalState {
        let angle = self.rotation_rate * (time - self.reference_epoch);
        let spin = UnitQuaternion::from_scaled_axis(Vector3::z() * angle);
        let rotation_to_base = spin * self.initial_rotation_to_base;
        let angular_velocity =
            rotation_to_base.inverse() * (Vector3::z() * self.rotation_rate);
        RotationalState::new(rotation_to_base, angular_velocity)
    }
}
