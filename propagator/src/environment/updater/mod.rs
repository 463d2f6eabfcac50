//! Keeps the environment consistent with the integrated state.
//!
//! The update and reset tables are resolved once at construction; each call
//! to [`EnvironmentUpdater::update_environment`] then resets per-step caches,
//! injects the integrated states and runs the table in order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bodytypes::prelude::{EnvironmentModelKind, Epoch, IntegratedStateType};
use na::DVector;
use tracing::{debug, trace};

use crate::environment::{Bodies, Error};

pub use order::{resolve_update_order, MAX_ORDER_ITERATIONS};

mod builder;
mod inject;
mod order;

/// Integrated state vectors keyed by type, already in the global frame
pub type StateVectors = BTreeMap<IntegratedStateType, DVector<f64>>;

/// Requested environment updates, by kind
pub type UpdateSettings = BTreeMap<EnvironmentModelKind, Vec<String>>;

/// Bodies whose states are integrated, as (body, reference) pairs
pub type IntegratedStates = BTreeMap<IntegratedStateType, Vec<(String, String)>>;

/// A single environment update, dispatched by kind at each step
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UpdateEntry {
    pub kind: EnvironmentModelKind,
    pub body: String,
    /// Source body, for radiation pressure updates
    pub source: Option<String>,
}

impl UpdateEntry {
    pub fn new(kind: EnvironmentModelKind, body: &str) -> Self {
        Self {
            kind,
            body: body.to_owned(),
            source: None,
        }
    }

    pub fn with_source(kind: EnvironmentModelKind, body: &str, source: &str) -> Self {
        Self {
            kind,
            body: body.to_owned(),
            source: Some(source.to_owned()),
        }
    }
}

impl fmt::Display for UpdateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} of {} (source {})", self.kind, self.body, source),
            None => write!(f, "{} of {}", self.kind, self.body),
        }
    }
}

/// Invalidation of a time-keyed cache at the start of each step
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResetEntry {
    pub kind: EnvironmentModelKind,
    pub body: String,
}

impl ResetEntry {
    pub fn new(kind: EnvironmentModelKind, body: &str) -> Self {
        Self {
            kind,
            body: body.to_owned(),
        }
    }
}

impl fmt::Display for ResetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reset {} of {}", self.kind, self.body)
    }
}

#[derive(Clone, Debug)]
pub struct EnvironmentUpdater {
    update_entries: Vec<UpdateEntry>,
    reset_entries: Vec<ResetEntry>,
    integrated_states: IntegratedStates,
}

impl EnvironmentUpdater {
    pub fn new(
        bodies: &Bodies,
        settings: UpdateSettings,
        integrated_states: IntegratedStates,
    ) -> Result<Self, Error> {
        for (name, _) in integrated_states.values().flatten() {
            bodies.require(name)?;
        }

        let (mut update_entries, reset_entries) =
            builder::build_update_entries(bodies, &settings, &integrated_states)?;
        resolve_update_order(&mut update_entries, bodies)?;

        for (i, entry) in update_entries.iter().enumerate() {
            debug!(index = i, "Update {entry}");
        }
        for entry in reset_entries.iter() {
            debug!("{entry}");
        }

        Ok(Self {
            update_entries,
            reset_entries,
            integrated_states,
        })
    }

    /// The update table, in execution order
    pub fn update_entries(&self) -> &[UpdateEntry] {
        &self.update_entries
    }

    pub fn reset_entries(&self) -> &[ResetEntry] {
        &self.reset_entries
    }

    pub fn integrated_states(&self) -> &IntegratedStates {
        &self.integrated_states
    }

    /// Brings every registered model to `time`.
    ///
    /// Each configured integrated state type must be supplied exactly once,
    /// either as a vector in `states` or listed in `overrides`, in which case
    /// it is recomputed from the environment models. Inputs are validated
    /// before anything is written to `bodies`.
    pub fn update_environment(
        &self,
        bodies: &mut Bodies,
        time: Epoch,
        states: &StateVectors,
        overrides: &[IntegratedStateType],
    ) -> Result<(), Error> {
        self.check_inputs(bodies, states, overrides)?;
        trace!(time, "Updating environment");

        for entry in self.reset_entries.iter() {
            bodies.reset_cached_time(entry.kind, &entry.body)?;
        }

        for (state_type, vector) in states.iter() {
            inject::inject_integrated_state(
                bodies,
                *state_type,
                self.integrated_bodies(*state_type)?,
                vector,
            )?;
        }

        for state_type in overrides.iter() {
            inject::set_state_from_environment(
                bodies,
                *state_type,
                self.integrated_bodies(*state_type)?,
                time,
            )?;
        }

        for entry in self.update_entries.iter() {
            dispatch(bodies, entry, time)?;
        }
        Ok(())
    }

    fn integrated_bodies(&self, state_type: IntegratedStateType) -> Result<&[(String, String)], Error> {
        self.integrated_states
            .get(&state_type)
            .map(Vec::as_slice)
            .ok_or(Error::UnsupportedStateType(state_type))
    }

    fn check_inputs(
        &self,
        bodies: &Bodies,
        states: &StateVectors,
        overrides: &[IntegratedStateType],
    ) -> Result<(), Error> {
        let size_error = || Error::InconsistentInputSize {
            states: states.len(),
            overrides: overrides.len(),
            configured: self.integrated_states.len(),
        };
        if states.len() + overrides.len() != self.integrated_states.len() {
            return Err(size_error());
        }

        for (state_type, vector) in states.iter() {
            let integrated = self.integrated_bodies(*state_type)?;
            let expected = integrated.len() * state_type.state_size();
            if vector.len() != expected {
                return Err(Error::StateVectorLength {
                    kind: *state_type,
                    expected,
                    actual: vector.len(),
                });
            }
            for (name, _) in integrated.iter() {
                bodies.require(name)?;
            }
        }

        let mut seen = BTreeSet::new();
        for state_type in overrides.iter() {
            let integrated = self.integrated_bodies(*state_type)?;
            if states.contains_key(state_type) || !seen.insert(*state_type) {
                return Err(size_error());
            }
            inject::check_environment_models(bodies, *state_type, integrated)?;
        }
        Ok(())
    }
}

fn dispatch(bodies: &mut Bodies, entry: &UpdateEntry, time: Epoch) -> Result<(), Error> {
    use EnvironmentModelKind::*;
    let name = entry.body.as_str();
    match entry.kind {
        TranslationalState => bodies.update_translational_state(name, time),
        RotationalState => bodies.update_rotational_state(name, time),
        Mass => bodies.update_mass(name, time),
        SphericalHarmonicGravityField => bodies.update_gravity_field(name, time),
        FlightConditions => bodies.update_flight_conditions(name, time),
        RadiationPressure => match entry.source.as_deref() {
            Some(source) => bodies.update_radiation_pressure(name, source, time),
            None => Err(Error::missing(
                name,
                RadiationPressure,
                "radiation pressure source",
            )),
        },
    }
}
