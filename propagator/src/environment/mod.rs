//! The simulation environment: every body's physical models and the
//! machinery that keeps them consistent with the integrated state.

use bodytypes::prelude::{EnvironmentModelKind, IntegratedStateType};

pub mod atmosphere;
pub mod bodies;
pub mod body;
pub mod ephemeris;
pub mod flight_conditions;
pub mod gravity;
pub mod mass;
pub mod orientation;
pub mod radiation_pressure;
pub mod updater;

pub use atmosphere::{Atmosphere, ExponentialAtmosphere};
pub use bodies::Bodies;
pub use body::{Body, RotationModel};
pub use ephemeris::{
    ConstantEphemeris, Ephemeris, RotationalEphemeris, SimpleRotationalEphemeris,
    TabulatedEphemeris,
};
pub use flight_conditions::FlightConditions;
pub use gravity::{
    GravityField, GravityFieldVariation, PeriodicVariation, SecularVariation,
    SphericalHarmonicsField, TimeDependentSphericalHarmonicsField,
};
pub use mass::{ConstantMass, LinearMassRate, MassModel};
pub use orientation::{
    AerodynamicAngleCalculator, CentralBodyState, DependentOrientationCalculator,
    OrientationInputs,
};
pub use radiation_pressure::RadiationPressureInterface;
pub use updater::{
    resolve_update_order, EnvironmentUpdater, IntegratedStates, ResetEntry, StateVectors,
    UpdateEntry, UpdateSettings, MAX_ORDER_ITERATIONS,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Could not find body '{0}'")]
    UnknownBody(String),

    #[error("Requested {kind} of '{body}', but body has no {model}")]
    MissingModel {
        body: String,
        kind: EnvironmentModelKind,
        model: &'static str,
    },

    #[error(
        "Could not order the aerodynamic angle update of '{body}': \
         central body '{central_body}' has no {missing}"
    )]
    DependencyResolution {
        body: String,
        central_body: String,
        missing: EnvironmentModelKind,
    },

    #[error("Update order did not settle within {0} iterations, central bodies are cyclic")]
    InfiniteLoop(usize),

    #[error(
        "Inconsistent input size when updating environment: \
         {states} integrated + {overrides} from environment, {configured} configured"
    )]
    InconsistentInputSize {
        states: usize,
        overrides: usize,
        configured: usize,
    },

    #[error("Integrated state type {0} is not configured for this environment")]
    UnsupportedStateType(IntegratedStateType),

    #[error("{kind} vector has {actual} entries, expected {expected}")]
    StateVectorLength {
        kind: IntegratedStateType,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    pub(crate) fn missing(body: &str, kind: EnvironmentModelKind, model: &'static str) -> Self {
        Error::MissingModel {
            body: body.to_owned(),
            kind,
            model,
        }
    }
}
