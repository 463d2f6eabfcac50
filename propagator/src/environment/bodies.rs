use std::collections::BTreeMap;

use bodytypes::prelude::{EnvironmentModelKind, Epoch};
use tracing::trace;

use crate::environment::{Body, Error, FlightConditions, OrientationInputs};

/// Name-keyed registry of every body in a simulation.
///
/// Updates that read one body and write another are split into a gather
/// over shared borrows followed by a write to the single target body.
#[derive(Debug, Default)]
pub struct Bodies {
    bodies: BTreeMap<String, Body>,
}

impl Bodies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous body with the same name, if any
    pub fn insert(&mut self, body: Body) -> Option<Body> {
        self.bodies.insert(body.name().to_owned(), body)
    }

    pub fn get(&self, name: &str) -> Option<&Body> {
        self.bodies.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Body> {
        self.bodies.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bodies.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn require(&self, name: &str) -> Result<&Body, Error> {
        self.bodies
            .get(name)
            .ok_or_else(|| Error::UnknownBody(name.to_owned()))
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut Body, Error> {
        self.bodies
            .get_mut(name)
            .ok_or_else(|| Error::UnknownBody(name.to_owned()))
    }

    pub fn update_translational_state(&mut self, name: &str, time: Epoch) -> Result<(), Error> {
        self.require_mut(name)?.set_state_from_ephemeris(time)
    }

    pub fn update_mass(&mut self, name: &str, time: Epoch) -> Result<(), Error> {
        self.require_mut(name)?.update_mass(time)
    }

    pub fn update_rotational_state(&mut self, name: &str, time: Epoch) -> Result<(), Error> {
        let inputs = self.orientation_inputs(name)?;
        self.require_mut(name)?
            .update_rotational_state(time, inputs.as_ref())
    }

    pub fn update_gravity_field(&mut self, name: &str, time: Epoch) -> Result<(), Error> {
        self.require_mut(name)?
            .time_dependent_gravity_field_mut()
            .ok_or_else(|| {
                Error::missing(
                    name,
                    EnvironmentModelKind::SphericalHarmonicGravityField,
                    "time-dependent spherical harmonic gravity field",
                )
            })?
            .update(time);
        Ok(())
    }

    pub fn update_flight_conditions(&mut self, name: &str, time: Epoch) -> Result<(), Error> {
        let body = self.require(name)?;
        let conditions = body.flight_conditions().ok_or_else(|| {
            Error::missing(name, EnvironmentModelKind::FlightConditions, "flight conditions")
        })?;
        if conditions.is_current(time) {
            return Ok(());
        }

        let central = self.require(conditions.central_body())?;
        let state = FlightConditions::evaluate(
            time,
            body.state(),
            &central.central_body_state(),
            central.atmosphere(),
            central.shape_radius(),
        );
        trace!(body = name, time, conditions = %state, "Updated flight conditions");

        if let Some(conditions) = self.require_mut(name)?.flight_conditions_mut() {
            conditions.set_current(time, state);
        }
        Ok(())
    }

    pub fn update_radiation_pressure(
        &mut self,
        name: &str,
        source: &str,
        time: Epoch,
    ) -> Result<(), Error> {
        let target_position = self.require(name)?.position();
        let source_position = self.require(source)?.position();
        self.require_mut(name)?
            .radiation_pressure_mut(source)
            .ok_or_else(|| {
                Error::missing(
                    name,
                    EnvironmentModelKind::RadiationPressure,
                    "radiation pressure interface",
                )
            })?
            .update(time, &source_position, &target_position);
        Ok(())
    }

    /// Invalidates the time-keyed cache behind `kind` for the named body.
    /// Kinds without such a cache are ignored.
    pub fn reset_cached_time(&mut self, kind: EnvironmentModelKind, name: &str) -> Result<(), Error> {
        let body = self.require_mut(name)?;
        match kind {
            EnvironmentModelKind::RotationalState => {
                if let Some(calc) = body.dependent_orientation_mut() {
                    calc.reset_current_time();
                }
            }
            EnvironmentModelKind::FlightConditions => {
                if let Some(conditions) = body.flight_conditions_mut() {
                    conditions.reset_current_time();
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn orientation_inputs(&self, name: &str) -> Result<Option<OrientationInputs>, Error> {
        let body = self.require(name)?;
        let calc = match body.dependent_orientation() {
            Some(calc) => calc,
            None => return Ok(None),
        };
        let central = calc
            .central_body()
            .map(|central| self.require(central).map(Body::central_body_state))
            .transpose()?;
        Ok(Some(OrientationInputs {
            body_state: *body.state(),
            central,
        }))
    }
}

impl FromIterator<Body> for Bodies {
    fn from_iter<T: IntoIterator<Item = Body>>(iter: T) -> Self {
        let mut bodies = Bodies::new();
        for body in iter {
            bodies.insert(body);
        }
        bodies
    }
}
