pub use crate::aero::{AerodynamicAngles, FlightConditionsState};
pub use crate::kinds::{EnvironmentModelKind, IntegratedStateType, UnknownKindError};
pub use crate::state::{CartesianState, RotationalState};
pub use crate::time::{Epoch, UtcTimestamp};
