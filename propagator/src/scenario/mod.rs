use bodytypes::{
    prelude::{Epoch, IntegratedStateType},
    time,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::info;

use self::config::{Config, ConfigError};
use crate::environment::{Bodies, IntegratedStates, StateVectors, UpdateSettings};

pub mod config;
pub mod nominal;

/// Everything a propagation needs, built from a scenario
#[derive(Debug)]
pub struct ScenarioEnvironment {
    pub bodies: Bodies,
    pub update_settings: UpdateSettings,
    pub integrated_states: IntegratedStates,
    /// Initial integrated state vectors, in integrated-state order
    pub initial_states: StateVectors,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub start_epoch: Epoch,
    /// [s]
    pub duration: f64,
    /// [s]
    pub step: f64,
    pub output_every: usize,
    pub config: Config,
    /// Directory relative ephemeris table paths are resolved against
    pub base_dir: PathBuf,
}

impl Scenario {
    pub const DEFAULT_DURATION: f64 = 3600.0;
    pub const DEFAULT_STEP: f64 = 10.0;

    /// Loads the given scenario file, or the nominal scenario when not provided
    pub fn load<P: AsRef<Path>>(config: Option<P>) -> Result<Self, ConfigError> {
        if let Some(cfg_path) = config.as_ref() {
            let cfg_path = cfg_path.as_ref();
            info!(
                config = %cfg_path.display(),
                "Loading scenario from config file",
            );
            let cfg = Config::load(cfg_path)?;
            let base_dir = cfg_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            Self::from_config(cfg, base_dir)
        } else {
            info!("Loading default nominal scenario");
            Self::from_config(nominal::config(), PathBuf::new())
        }
    }

    pub fn from_config(config: Config, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let start_epoch = match config.start_epoch.as_ref() {
            Some(s) => {
                let t: time::UtcTimestamp = s
                    .parse()
                    .map_err(|_| ConfigError::StartEpoch(s.clone()))?;
                time::seconds_since_j2000(&t)
            }
            None => 0.0,
        };
        Ok(Self {
            name: config.name.clone().unwrap_or_else(|| "unnamed".to_owned()),
            start_epoch,
            duration: config.duration.unwrap_or(Self::DEFAULT_DURATION),
            step: config.step.unwrap_or(Self::DEFAULT_STEP),
            output_every: config.output_every.unwrap_or(1).max(1),
            config,
            base_dir,
        })
    }

    pub fn build(&self) -> Result<ScenarioEnvironment, ConfigError> {
        let bodies = self
            .config
            .bodies
            .iter()
            .map(|b| b.to_body(&self.base_dir))
            .collect::<Result<Bodies, _>>()?;
        let update_settings = self.config.update_settings()?;
        let integrated_states = self.config.integrated_states()?;

        let mut initial_values_by_type: BTreeMap<IntegratedStateType, Vec<f64>> = BTreeMap::new();
        for s in self.config.integrated_states.iter() {
            let state_type = s.kind.parse::<IntegratedStateType>()?;
            let entry = format!("integrated-state {} of '{}'", state_type, s.body);
            let values = match s.initial.as_ref() {
                Some(values) => values.clone(),
                None => initial_values(&bodies, state_type, &s.body, &entry)?,
            };
            if values.len() != state_type.state_size() {
                return Err(ConfigError::WrongLength {
                    entry,
                    expected: state_type.state_size(),
                    actual: values.len(),
                });
            }
            initial_values_by_type
                .entry(state_type)
                .or_default()
                .extend(values);
        }
        let initial_states: StateVectors = initial_values_by_type
            .into_iter()
            .map(|(state_type, values)| (state_type, na::DVector::from_vec(values)))
            .collect();

        Ok(ScenarioEnvironment {
            bodies,
            update_settings,
            integrated_states,
            initial_states,
        })
    }
}

fn initial_values(
    bodies: &Bodies,
    state_type: IntegratedStateType,
    name: &str,
    entry: &str,
) -> Result<Vec<f64>, ConfigError> {
    use IntegratedStateType::*;
    let body = bodies.get(name).ok_or_else(|| ConfigError::UnknownBody {
        entry: entry.to_owned(),
        body: name.to_owned(),
    })?;
    Ok(match state_type {
        Translational => body.state().as_slice().to_vec(),
        Rotational => body.rotational_state().to_vec(),
        Mass => vec![body.mass()],
    })
}
