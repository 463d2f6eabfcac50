use std::collections::BTreeSet;

use bodytypes::prelude::{EnvironmentModelKind, IntegratedStateType};
use tracing::{debug, warn};

use crate::environment::{
    updater::{IntegratedStates, ResetEntry, UpdateEntry, UpdateSettings},
    Bodies, Error,
};

/// Tabulates the update and reset entries for every requested (kind, body)
/// pair, grouped by kind in declaration order.
pub(crate) fn build_update_entries(
    bodies: &Bodies,
    settings: &UpdateSettings,
    integrated_states: &IntegratedStates,
) -> Result<(Vec<UpdateEntry>, Vec<ResetEntry>), Error> {
    let mut updates = Vec::new();
    let mut resets = Vec::new();

    for (&kind, requested) in settings.iter() {
        let mut seen = BTreeSet::new();
        for name in requested.iter().filter(|n| !n.is_empty()) {
            if !seen.insert(name.as_str()) {
                debug!(%kind, body = name.as_str(), "Ignoring duplicate update request");
                continue;
            }
            let body = bodies.require(name)?;

            use EnvironmentModelKind::*;
            match kind {
                TranslationalState | Mass => {
                    if is_integrated(integrated_states, kind, name) {
                        debug!(%kind, body = name.as_str(), "Skipping update of integrated state");
                        continue;
                    }
                    if kind == TranslationalState && body.ephemeris().is_none() {
                        return Err(Error::missing(name, kind, "ephemeris"));
                    }
                    if kind == Mass && body.mass_model().is_none() {
                        return Err(Error::missing(name, kind, "mass model"));
                    }
                    updates.push(UpdateEntry::new(kind, name));
                }
                RotationalState => {
                    if is_integrated(integrated_states, kind, name) {
                        debug!(%kind, body = name.as_str(), "Skipping update of integrated state");
                        continue;
                    }
                    if body.rotational_ephemeris().is_none() {
                        let calc = body.dependent_orientation().ok_or_else(|| {
                            Error::missing(name, kind, "rotational ephemeris or dependent orientation")
                        })?;
                        if let Some(central) = calc.central_body() {
                            bodies.require(central)?;
                        }
                        resets.push(ResetEntry::new(kind, name));
                    }
                    updates.push(UpdateEntry::new(kind, name));
                }
                SphericalHarmonicGravityField => {
                    if body.time_dependent_gravity_field().is_none() {
                        return Err(Error::missing(
                            name,
                            kind,
                            "time-dependent spherical harmonic gravity field",
                        ));
                    }
                    updates.push(UpdateEntry::new(kind, name));
                }
                FlightConditions => {
                    let conditions = body
                        .flight_conditions()
                        .ok_or_else(|| Error::missing(name, kind, "flight conditions"))?;
                    bodies.require(conditions.central_body())?;
                    updates.push(UpdateEntry::new(kind, name));
                    resets.push(ResetEntry::new(kind, name));
                }
                RadiationPressure => {
                    let interfaces = body.radiation_pressure();
                    if interfaces.is_empty() {
                        return Err(Error::missing(name, kind, "radiation pressure interface"));
                    }
                    if interfaces.len() > 1 {
                        warn!(
                            body = name.as_str(),
                            count = interfaces.len(),
                            "Requested radiation pressure update, but body has multiple interfaces; updating all"
                        );
                    }
                    for source in interfaces.keys() {
                        bodies.require(source)?;
                        updates.push(UpdateEntry::with_source(kind, name, source));
                    }
                }
            }
        }
    }

    Ok((updates, resets))
}

/// A state is integrated for a body when listed with an empty reference
fn is_integrated(integrated_states: &IntegratedStates, kind: EnvironmentModelKind, name: &str) -> bool {
    kind.integrated_state()
        .and_then(|state_type: IntegratedStateType| integrated_states.get(&state_type))
        .map(|entries| {
            entries
                .iter()
                .any(|(body, reference)| body == name && reference.is_empty())
        })
        .unwrap_or(false)
}
