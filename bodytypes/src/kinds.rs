use derive_more::Display;
use std::str::FromStr;

/// State quantities advanced by the numerical integrator rather than
/// computed from environment models.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub enum IntegratedStateType {
    #[display(fmt = "translational-state")]
    Translational,
    #[display(fmt = "rotational-state")]
    Rotational,
    #[display(fmt = "mass-state")]
    Mass,
}

impl IntegratedStateType {
    pub const ALL: [IntegratedStateType; 3] = [
        IntegratedStateType::Translational,
        IntegratedStateType::Rotational,
        IntegratedStateType::Mass,
    ];

    /// Number of vector entries per integrated body
    pub const fn state_size(self) -> usize {
        use IntegratedStateType::*;
        match self {
            Translational => 6,
            Rotational => 7,
            Mass => 1,
        }
    }

    /// The environment update that recomputes this state from a model
    pub const fn model_kind(self) -> EnvironmentModelKind {
        use IntegratedStateType::*;
        match self {
            Translational => EnvironmentModelKind::TranslationalState,
            Rotational => EnvironmentModelKind::RotationalState,
            Mass => EnvironmentModelKind::Mass,
        }
    }
}

/// Environment models that can be brought up to date at each evaluation.
///
/// The declaration order is the order in which update functions are
/// tabulated before dependency reordering.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub enum EnvironmentModelKind {
    #[display(fmt = "translational-state-update")]
    TranslationalState,
    #[display(fmt = "rotational-state-update")]
    RotationalState,
    #[display(fmt = "mass-update")]
    Mass,
    #[display(fmt = "spherical-harmonic-gravity-field-update")]
    SphericalHarmonicGravityField,
    #[display(fmt = "flight-conditions-update")]
    FlightConditions,
    #[display(fmt = "radiation-pressure-update")]
    RadiationPressure,
}

impl EnvironmentModelKind {
    pub const ALL: [EnvironmentModelKind; 6] = [
        EnvironmentModelKind::TranslationalState,
        EnvironmentModelKind::RotationalState,
        EnvironmentModelKind::Mass,
        EnvironmentModelKind::SphericalHarmonicGravityField,
        EnvironmentModelKind::FlightConditions,
        EnvironmentModelKind::RadiationPressure,
    ];

    /// The integrated state which, when integrated for a body, replaces this update
    pub const fn integrated_state(self) -> Option<IntegratedStateType> {
        use EnvironmentModelKind::*;
        match self {
            TranslationalState => Some(IntegratedStateType::Translational),
            RotationalState => Some(IntegratedStateType::Rotational),
            Mass => Some(IntegratedStateType::Mass),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display(fmt = "Unknown kind '{}'", "_0")]
pub struct UnknownKindError(pub String);

impl std::error::Error for UnknownKindError {}

impl FromStr for IntegratedStateType {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.to_string() == s || short_name(&k.to_string(), "-state") == s)
            .ok_or_else(|| UnknownKindError(s.to_owned()))
    }
}

impl FromStr for EnvironmentModelKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.to_string() == s || short_name(&k.to_string(), "-update") == s)
            .ok_or_else(|| UnknownKindError(s.to_owned()))
    }
}

fn short_name<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}
