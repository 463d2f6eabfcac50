use bodytypes::prelude::{CartesianState, Epoch, IntegratedStateType, RotationalState};
use na::DVector;

use crate::environment::{Bodies, Error};

/// Writes consecutive `state_size` segments of `vector` into the bodies
/// listed for `state_type`, in listing order.
pub(crate) fn inject_integrated_state(
    bodies: &mut Bodies,
    state_type: IntegratedStateType,
    integrated_bodies: &[(String, String)],
    vector: &DVector<f64>,
) -> Result<(), Error> {
    let size = state_type.state_size();
    let values = vector.as_slice();
    for (i, (name, _)) in integrated_bodies.iter().enumerate() {
        let segment = &values[size * i..size * (i + 1)];
        let body = bodies.require_mut(name)?;
        match state_type {
            IntegratedStateType::Translational => {
                body.set_state(CartesianState::from_column_slice(segment))
            }
            IntegratedStateType::Rotational => {
                body.set_rotational_state(RotationalState::from_slice(segment))
            }
            IntegratedStateType::Mass => body.set_mass(segment[0]),
        }
    }
    Ok(())
}

/// Sets the integrated quantity of every listed body from its environment
/// model instead of from the integrator.
pub(crate) fn set_state_from_environment(
    bodies: &mut Bodies,
    state_type: IntegratedStateType,
    integrated_bodies: &[(String, String)],
    time: Epoch,
) -> Result<(), Error> {
    for (name, _) in integrated_bodies.iter() {
        match state_type {
            IntegratedStateType::Translational => bodies.update_translational_state(name, time)?,
            IntegratedStateType::Rotational => bodies.update_rotational_state(name, time)?,
            IntegratedStateType::Mass => bodies.update_mass(name, time)?,
        }
    }
    Ok(())
}

/// Checks that `set_state_from_environment` can run to completion
pub(crate) fn check_environment_models(
    bodies: &Bodies,
    state_type: IntegratedStateType,
    integrated_bodies: &[(String, String)],
) -> Result<(), Error> {
    let kind = state_type.model_kind();
    for (name, _) in integrated_bodies.iter() {
        let body = bodies.require(name)?;
        match state_type {
            IntegratedStateType::Translational if body.ephemeris().is_none() => {
                return Err(Error::missing(name, kind, "ephemeris"))
            }
            IntegratedStateType::Rotational if body.rotation_model().is_none() => {
                return Err(Error::missing(
                    name,
                    kind,
                    "rotational ephemeris or dependent orientation",
                ))
            }
            IntegratedStateType::Mass if body.mass_model().is_none() => {
                return Err(Error::missing(name, kind, "mass model"))
            }
            _ => (),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Body, ConstantMass};

    fn listed(names: &[&str]) -> Vec<(String, String)> {
        names.iter().map(|n| (n.to_string(), String::new())).collect()
    }

    #[test]
    fn translational_segments_in_listing_order() {
        let mut bodies: Bodies = [Body::new("A"), Body::new("B")].into_iter().collect();
        let v = DVector::from_iterator(12, (0..12).map(|i| i as f64 * 0.1));
        inject_integrated_state(
            &mut bodies,
            IntegratedStateType::Translational,
            &listed(&["B", "A"]),
            &v,
        )
        .unwrap();
        assert_eq!(bodies.require("B").unwrap().state().as_slice(), &v.as_slice()[..6]);
        assert_eq!(bodies.require("A").unwrap().state().as_slice(), &v.as_slice()[6..]);
    }

    #[test]
    fn mass_and_rotation() {
        let mut bodies: Bodies = [Body::new("A").with_mass_model(ConstantMass(7.0))]
            .into_iter()
            .collect();
        let names = listed(&["A"]);
        inject_integrated_state(
            &mut bodies,
            IntegratedStateType::Mass,
            &names,
            &DVector::from_vec(vec![12.5]),
        )
        .unwrap();
        assert_eq!(bodies.require("A").unwrap().mass(), 12.5);

        let rot = DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0, 0.1, 0.2, 0.3]);
        inject_integrated_state(&mut bodies, IntegratedStateType::Rotational, &names, &rot).unwrap();
        assert_eq!(
            bodies.require("A").unwrap().rotational_state().to_vec(),
            rot.as_slice().to_vec()
        );

        set_state_from_environment(&mut bodies, IntegratedStateType::Mass, &names, 0.0).unwrap();
        assert_eq!(bodies.require("A").unwrap().mass(), 7.0);
    }

    #[test]
    fn environment_models_checked() {
        let bodies: Bodies = [Body::new("A").with_mass_model(ConstantMass(7.0))]
            .into_iter()
            .collect();
        let names = listed(&["A"]);
        assert!(check_environment_models(&bodies, IntegratedStateType::Mass, &names).is_ok());
        assert!(matches!(
            check_environment_models(&bodies, IntegratedStateType::Translational, &names),
            Err(Error::MissingModel { .. })
        ));
        assert!(matches!(
            check_environment_models(&bodies, IntegratedStateType::Mass, &listed(&["Z"])),
            Err(Error::UnknownBody(_))
        ));
    }
}
