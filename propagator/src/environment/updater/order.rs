use bodytypes::prelude::EnvironmentModelKind;
use tracing::trace;

use crate::environment::{updater::UpdateEntry, Bodies, Error};

/// Upper bound on reordering passes before the central body references
/// are considered cyclic
pub const MAX_ORDER_ITERATIONS: usize = 10_000;

/// Reorders `entries` in place so that the rotational update of every body
/// oriented by aerodynamic angles runs after both the translational and
/// rotational updates of its central body.
///
/// Each pass stops at the first misplaced entry, swaps it behind its
/// prerequisites, and restarts. Already-ordered tables are left untouched.
pub fn resolve_update_order(entries: &mut [UpdateEntry], bodies: &Bodies) -> Result<(), Error> {
    for iteration in 0..=MAX_ORDER_ITERATIONS {
        if !reorder_pass(entries, bodies)? {
            trace!(iteration, "Update order settled");
            return Ok(());
        }
    }
    Err(Error::InfiniteLoop(MAX_ORDER_ITERATIONS))
}

/// Returns true when a swap was made
fn reorder_pass(entries: &mut [UpdateEntry], bodies: &Bodies) -> Result<bool, Error> {
    for i in 0..entries.len() {
        let entry = &entries[i];
        if entry.kind != EnvironmentModelKind::RotationalState {
            continue;
        }
        let central = match aerodynamic_central_body(bodies, &entry.body) {
            Some(central) => central,
            None => continue,
        };

        let ti = find(entries, EnvironmentModelKind::TranslationalState, central);
        let ri = find(entries, EnvironmentModelKind::RotationalState, central);
        let (ti, ri) = match (ti, ri) {
            (Some(ti), Some(ri)) => (ti, ri),
            (None, _) => {
                return Err(dependency_error(entry, central, EnvironmentModelKind::TranslationalState))
            }
            (_, None) => {
                return Err(dependency_error(entry, central, EnvironmentModelKind::RotationalState))
            }
        };

        if i < ri || i < ti {
            if i > ri {
                entries.swap(i, ti);
            } else if i > ti {
                entries.swap(i, ri);
            } else if ti < ri {
                entries.swap(i, ti);
                entries.swap(ti, ri);
            } else {
                entries.swap(i, ri);
                entries.swap(ri, ti);
            }
            return Ok(true);
        }
    }
    Ok(false)
}

fn aerodynamic_central_body<'a>(bodies: &'a Bodies, name: &str) -> Option<&'a str> {
    let body = bodies.get(name)?;
    if body.rotational_ephemeris().is_some() {
        return None;
    }
    body.dependent_orientation()?
        .as_aerodynamic_angle_calculator()
        .map(|calc| calc.central_body())
}

fn find(entries: &[UpdateEntry], kind: EnvironmentModelKind, body: &str) -> Option<usize> {
    entries
        .iter()
        .position(|e| e.kind == kind && e.body == body)
}

fn dependency_error(entry: &UpdateEntry, central: &str, missing: EnvironmentModelKind) -> Error {
    Error::DependencyResolution {
        body: entry.body.clone(),
        central_body: central.to_owned(),
        missing,
    }
}
