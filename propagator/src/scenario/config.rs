use bodytypes::prelude::{
    AerodynamicAngles, CartesianState, EnvironmentModelKind, Epoch, IntegratedStateType,
    UnknownKindError,
};
use na::{DMatrix, UnitQuaternion, Vector3};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::environment::{
    self, AerodynamicAngleCalculator, ConstantEphemeris, ConstantMass, ExponentialAtmosphere,
    GravityField, GravityFieldVariation, LinearMassRate, PeriodicVariation,
    RadiationPressureInterface, SecularVariation, SimpleRotationalEphemeris,
    SphericalHarmonicsField, TabulatedEphemeris, TimeDependentSphericalHarmonicsField,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse ephemeris table '{path}': {message}")]
    EphemerisTable { path: PathBuf, message: String },

    #[error("Duplicate configuration entry for body '{0}'")]
    DuplicateBody(String),

    #[error("Configuration entry '{entry}' references unknown body '{body}'")]
    UnknownBody { entry: String, body: String },

    #[error(transparent)]
    UnknownKind(#[from] UnknownKindError),

    #[error("{entry} requires the {fields} field(s)")]
    MissingField {
        entry: String,
        fields: &'static str,
    },

    #[error("{entry} has {actual} values, expected {expected}")]
    WrongLength {
        entry: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid start epoch '{0}', expected an RFC 3339 UTC timestamp")]
    StartEpoch(String),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub name: Option<String>,
    /// RFC 3339 UTC timestamp
    pub start_epoch: Option<String>,
    /// [s]
    pub duration: Option<f64>,
    /// [s]
    pub step: Option<f64>,
    /// Emit output every N steps
    pub output_every: Option<usize>,
    #[serde(alias = "body")]
    pub bodies: Vec<Body>,
    #[serde(alias = "integrated-state")]
    pub integrated_states: Vec<IntegratedState>,
    /// Environment model kind -> bodies to update
    pub updates: BTreeMap<String, Vec<String>>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;

        let mut names = HashSet::new();
        for name in cfg.bodies.iter().map(|b| &b.name) {
            if !names.insert(name.as_str()) {
                return Err(ConfigError::DuplicateBody(name.clone()));
            }
        }

        for s in cfg.integrated_states.iter() {
            s.kind.parse::<IntegratedStateType>()?;
            if !names.contains(s.body.as_str()) {
                return Err(ConfigError::UnknownBody {
                    entry: format!("integrated-state {}", s.kind),
                    body: s.body.clone(),
                });
            }
        }

        for kind in cfg.updates.keys() {
            kind.parse::<EnvironmentModelKind>()?;
        }

        for body in cfg.bodies.iter() {
            if let Some(central) = body.flight_conditions.as_ref().map(|f| &f.central_body) {
                if !names.contains(central.as_str()) {
                    return Err(ConfigError::UnknownBody {
                        entry: format!("body '{}' flight-conditions", body.name),
                        body: central.clone(),
                    });
                }
            }
        }

        Ok(cfg)
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn update_settings(&self) -> Result<environment::UpdateSettings, ConfigError> {
        let mut settings = environment::UpdateSettings::new();
        for (kind, bodies) in self.updates.iter() {
            settings
                .entry(kind.parse::<EnvironmentModelKind>()?)
                .or_insert_with(Vec::new)
                .extend(bodies.iter().cloned());
        }
        Ok(settings)
    }

    /// Integrated states grouped by type, in declaration order within each type
    pub fn integrated_states(&self) -> Result<environment::IntegratedStates, ConfigError> {
        let mut states = environment::IntegratedStates::new();
        for s in self.integrated_states.iter() {
            states
                .entry(s.kind.parse::<IntegratedStateType>()?)
                .or_insert_with(Vec::new)
                .push((s.body.clone(), s.reference.clone()));
        }
        Ok(states)
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Body {
    pub name: String,
    /// Initial Cartesian state [m, m/s]
    pub state: Option<Vec<f64>>,
    /// Initial mass [kg]
    pub mass: Option<f64>,
    /// Mean shape radius [m]
    pub shape_radius: Option<f64>,
    pub ephemeris: Option<Ephemeris>,
    pub rotation: Option<Rotation>,
    pub gravity: Option<Gravity>,
    pub atmosphere: Option<Atmosphere>,
    pub flight_conditions: Option<FlightConditions>,
    #[serde(default, alias = "radiation-pressure")]
    pub radiation_pressures: Vec<RadiationPressure>,
    pub mass_model: Option<MassModel>,
}

impl Body {
    /// Builds the environment body. Relative table paths are resolved against `base_dir`.
    pub fn to_body(&self, base_dir: &Path) -> Result<environment::Body, ConfigError> {
        let mut body = environment::Body::new(self.name.as_str());
        if let Some(state) = self.state.as_ref() {
            body = body.with_state(cartesian_state(&format!("body '{}' state", self.name), state)?);
        }
        if let Some(mass) = self.mass {
            body = body.with_mass(mass);
        }
        if let Some(radius) = self.shape_radius {
            body = body.with_shape_radius(radius);
        }
        if let Some(eph) = self.ephemeris.as_ref() {
            body = match eph.model {
                EphemerisModel::Constant => {
                    let entry = format!("body '{}' constant ephemeris", self.name);
                    let state = eph.state.as_ref().ok_or_else(|| ConfigError::MissingField {
                        entry: entry.clone(),
                        fields: "'state'",
                    })?;
                    body.with_ephemeris(ConstantEphemeris::new(cartesian_state(&entry, state)?))
                }
                EphemerisModel::Table => {
                    let path = eph.path.as_ref().ok_or_else(|| ConfigError::MissingField {
                        entry: format!("body '{}' table ephemeris", self.name),
                        fields: "'path'",
                    })?;
                    body.with_ephemeris(load_table(&base_dir.join(path))?)
                }
            };
        }
        if let Some(rot) = self.rotation.as_ref() {
            body = body.with_rotation_model(rot.to_rotation_model(&self.name)?);
        }
        if let Some(gravity) = self.gravity.as_ref() {
            body = body.with_gravity_field(gravity.to_gravity_field(&self.name)?);
        }
        if let Some(atm) = self.atmosphere.as_ref() {
            body = body.with_atmosphere(ExponentialAtmosphere::from(atm));
        }
        if let Some(fc) = self.flight_conditions.as_ref() {
            body = body.with_flight_conditions(fc.central_body.as_str());
        }
        for rp in self.radiation_pressures.iter() {
            body = body.with_radiation_pressure(RadiationPressureInterface::from(rp));
        }
        if let Some(mm) = self.mass_model.as_ref() {
            let entry = format!("body '{}' mass-model", self.name);
            body = match mm.model {
                MassModelKind::Constant => {
                    let mass = mm.mass.or(self.mass).ok_or(ConfigError::MissingField {
                        entry,
                        fields: "'mass'",
                    })?;
                    body.with_mass_model(ConstantMass(mass))
                }
                MassModelKind::Linear => {
                    let get_fields = || Some((mm.initial_mass?, mm.dry_mass?, mm.rate?));
                    let (initial_mass, dry_mass, rate) =
                        get_fields().ok_or(ConfigError::MissingField {
                            entry,
                            fields: "'initial-mass', 'dry-mass' and 'rate'",
                        })?;
                    body.with_mass_model(LinearMassRate {
                        initial_mass,
                        dry_mass,
                        rate,
                        reference_epoch: mm.reference_epoch.unwrap_or(0.0),
                    })
                }
            };
        }
        Ok(body)
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ephemeris {
    pub model: EphemerisModel,
    pub state: Option<Vec<f64>>,
    pub path: Option<PathBuf>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EphemerisModel {
    Constant,
    Table,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rotation {
    pub model: RotationModel,
    /// [rad/s]
    pub rotation_rate: Option<f64>,
    pub reference_epoch: Option<Epoch>,
    /// Rotation about z at the reference epoch [deg]
    pub initial_angle: Option<f64>,
    pub central_body: Option<String>,
    /// [deg]
    pub angle_of_attack: Option<f64>,
    /// [deg]
    pub sideslip: Option<f64>,
    /// [deg]
    pub bank: Option<f64>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationModel {
    Simple,
    AerodynamicAngles,
}

impl Rotation {
    pub fn to_rotation_model(&self, body: &str) -> Result<environment::RotationModel, ConfigError> {
        Ok(match self.model {
            RotationModel::Simple => {
                let rate = self.rotation_rate.ok_or_else(|| ConfigError::MissingField {
                    entry: format!("body '{body}' simple rotation"),
                    fields: "'rotation-rate'",
                })?;
                let initial = UnitQuaternion::from_scaled_axis(
                    Vector3::z() * self.initial_angle.unwrap_or(0.0).to_radians(),
                );
                environment::RotationModel::Ephemeris(Box::new(SimpleRotationalEphemeris::new(
                    initial,
                    rate,
                    self.reference_epoch.unwrap_or(0.0),
                )))
            }
            RotationModel::AerodynamicAngles => {
                let central = self.central_body.as_ref().ok_or_else(|| ConfigError::MissingField {
                    entry: format!("body '{body}' aerodynamic-angles rotation"),
                    fields: "'central-body'",
                })?;
                let angles = AerodynamicAngles::new(
                    self.angle_of_attack.unwrap_or(0.0).to_radians(),
                    self.sideslip.unwrap_or(0.0).to_radians(),
                    self.bank.unwrap_or(0.0).to_radians(),
                );
                environment::RotationModel::Dependent(Box::new(AerodynamicAngleCalculator::new(
                    central.as_str(),
                    angles,
                )))
            }
        })
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gravity {
    pub model: GravityModel,
    /// [m^3/s^2]
    pub gravitational_parameter: f64,
    /// [m]
    pub reference_radius: Option<f64>,
    /// Normalized coefficients, one row per degree
    #[serde(default)]
    pub cosine: Vec<Vec<f64>>,
    #[serde(default)]
    pub sine: Vec<Vec<f64>>,
    #[serde(default, alias = "variation")]
    pub variations: Vec<Variation>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GravityModel {
    PointMass,
    SphericalHarmonics,
    TimeDependentSphericalHarmonics,
}

impl Gravity {
    pub fn to_gravity_field(&self, body: &str) -> Result<GravityField, ConfigError> {
        if self.model == GravityModel::PointMass {
            return Ok(GravityField::PointMass {
                gravitational_parameter: self.gravitational_parameter,
            });
        }

        let entry = format!("body '{body}' gravity");
        let reference_radius = self.reference_radius.ok_or_else(|| ConfigError::MissingField {
            entry: entry.clone(),
            fields: "'reference-radius'",
        })?;
        if self.cosine.is_empty() {
            return Err(ConfigError::MissingField {
                entry,
                fields: "'cosine'",
            });
        }
        let cosine_coefficients = coefficient_matrix(&self.cosine);
        let sine_coefficients = sized_coefficient_matrix(&self.sine, cosine_coefficients.shape());
        let field = SphericalHarmonicsField {
            gravitational_parameter: self.gravitational_parameter,
            reference_radius,
            cosine_coefficients,
            sine_coefficients,
        };

        Ok(match self.model {
            GravityModel::TimeDependentSphericalHarmonics => {
                let variations = self
                    .variations
                    .iter()
                    .map(|v| v.to_variation(body))
                    .collect::<Result<Vec<_>, _>>()?;
                GravityField::TimeDependentSphericalHarmonics(
                    TimeDependentSphericalHarmonicsField::new(field, variations),
                )
            }
            _ => GravityField::SphericalHarmonics(field),
        })
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Variation {
    pub model: VariationModel,
    #[serde(default)]
    pub reference_epoch: Epoch,
    /// Secular rates [1/s] or periodic amplitudes, one row per degree
    #[serde(default)]
    pub cosine: Vec<Vec<f64>>,
    #[serde(default)]
    pub sine: Vec<Vec<f64>>,
    /// [rad/s]
    pub angular_frequency: Option<f64>,
    /// [rad]
    #[serde(default)]
    pub phase: f64,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariationModel {
    Secular,
    Periodic,
}

impl Variation {
    pub fn to_variation(&self, body: &str) -> Result<Box<dyn GravityFieldVariation>, ConfigError> {
        let cosine = coefficient_matrix(&self.cosine);
        let sine = coefficient_matrix(&self.sine);
        let variation: Box<dyn GravityFieldVariation> = match self.model {
            VariationModel::Secular => Box::new(SecularVariation {
                reference_epoch: self.reference_epoch,
                cosine_rates: cosine,
                sine_rates: sine,
            }),
            VariationModel::Periodic => {
                let angular_frequency =
                    self.angular_frequency
                        .ok_or_else(|| ConfigError::MissingField {
                            entry: format!("body '{body}' periodic gravity variation"),
                            fields: "'angular-frequency'",
                        })?;
                Box::new(PeriodicVariation {
                    reference_epoch: self.reference_epoch,
                    angular_frequency,
                    phase: self.phase,
                    cosine_amplitudes: cosine,
                    sine_amplitudes: sine,
                })
            }
        };
        Ok(variation)
    }
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Atmosphere {
    pub surface_density: Option<f64>,
    pub scale_height: Option<f64>,
    pub temperature: Option<f64>,
    pub specific_gas_constant: Option<f64>,
    pub ratio_of_specific_heats: Option<f64>,
}

/// Unset parameters take Earth values
impl From<&Atmosphere> for ExponentialAtmosphere {
    fn from(value: &Atmosphere) -> Self {
        let earth = ExponentialAtmosphere::earth();
        ExponentialAtmosphere {
            surface_density: value.surface_density.unwrap_or(earth.surface_density),
            scale_height: value.scale_height.unwrap_or(earth.scale_height),
            temperature: value.temperature.unwrap_or(earth.temperature),
            specific_gas_constant: value
                .specific_gas_constant
                .unwrap_or(earth.specific_gas_constant),
            ratio_of_specific_heats: value
                .ratio_of_specific_heats
                .unwrap_or(earth.ratio_of_specific_heats),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlightConditions {
    pub central_body: String,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RadiationPressure {
    pub source: String,
    /// [m^2]
    pub area: f64,
    pub coefficient: f64,
    /// [N/m^2], solar when unset
    pub reference_pressure: Option<f64>,
    /// [m]
    pub reference_distance: Option<f64>,
}

impl From<&RadiationPressure> for RadiationPressureInterface {
    fn from(value: &RadiationPressure) -> Self {
        match (value.reference_pressure, value.reference_distance) {
            (Some(pressure), Some(distance)) => RadiationPressureInterface::new(
                value.source.as_str(),
                pressure,
                distance,
                value.area,
                value.coefficient,
            ),
            _ => RadiationPressureInterface::solar(
                value.source.as_str(),
                value.area,
                value.coefficient,
            ),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MassModel {
    pub model: MassModelKind,
    pub mass: Option<f64>,
    pub initial_mass: Option<f64>,
    pub dry_mass: Option<f64>,
    /// [kg/s]
    pub rate: Option<f64>,
    pub reference_epoch: Option<Epoch>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MassModelKind {
    Constant,
    Linear,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntegratedState {
    pub kind: String,
    pub body: String,
    #[serde(default)]
    pub reference: String,
    /// Initial value, overrides the body's state or mass
    pub initial: Option<Vec<f64>>,
}

pub(crate) fn cartesian_state(entry: &str, values: &[f64]) -> Result<CartesianState, ConfigError> {
    if values.len() != 6 {
        return Err(ConfigError::WrongLength {
            entry: entry.to_owned(),
            expected: 6,
            actual: values.len(),
        });
    }
    Ok(CartesianState::from_column_slice(values))
}

/// Ragged rows are zero padded
fn coefficient_matrix(rows: &[Vec<f64>]) -> DMatrix<f64> {
    let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
    sized_coefficient_matrix(rows, (rows.len(), ncols))
}

/// Zero padded or truncated to `shape`
fn sized_coefficient_matrix(rows: &[Vec<f64>], shape: (usize, usize)) -> DMatrix<f64> {
    DMatrix::from_fn(shape.0, shape.1, |i, j| {
        rows.get(i).and_then(|r| r.get(j)).copied().unwrap_or(0.0)
    })
}

fn load_table(path: &Path) -> Result<TabulatedEphemeris, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let table_error = |message: String| ConfigError::EphemerisTable {
        path: path.to_owned(),
        message,
    };
    let (_, table) = ephemtab::parse_ephemeris_table(&content).map_err(|e| table_error(e.to_string()))?;
    TabulatedEphemeris::new(table).ok_or_else(|| table_error("no records".to_owned()))
}
