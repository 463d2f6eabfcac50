use std::collections::BTreeMap;

use bodytypes::prelude::{CartesianState, EnvironmentModelKind, Epoch, RotationalState};
use na::Vector3;

use crate::environment::{
    Atmosphere, CentralBodyState, DependentOrientationCalculator, Ephemeris, Error,
    FlightConditions, GravityField, MassModel, OrientationInputs, RadiationPressureInterface,
    RotationalEphemeris, TimeDependentSphericalHarmonicsField,
};

/// Source of a body's orientation
#[derive(Debug)]
pub enum RotationModel {
    /// Closed-form function of time
    Ephemeris(Box<dyn RotationalEphemeris>),
    /// Derived from the current state of this and other bodies
    Dependent(Box<dyn DependentOrientationCalculator>),
}

/// A named bundle of physical models together with the body's current state.
#[derive(Debug)]
pub struct Body {
    name: String,

    state: CartesianState,
    rotational_state: RotationalState,
    mass: f64,

    ephemeris: Option<Box<dyn Ephemeris>>,
    rotation: Option<RotationModel>,
    gravity_field: Option<GravityField>,
    atmosphere: Option<Box<dyn Atmosphere>>,
    shape_radius: Option<f64>,
    flight_conditions: Option<FlightConditions>,
    radiation_pressure: BTreeMap<String, RadiationPressureInterface>,
    mass_model: Option<Box<dyn MassModel>>,
}

impl Body {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: CartesianState::zeros(),
            rotational_state: RotationalState::default(),
            mass: 0.0,
            ephemeris: None,
            rotation: None,
            gravity_field: None,
            atmosphere: None,
            shape_radius: None,
            flight_conditions: None,
            radiation_pressure: Default::default(),
            mass_model: None,
        }
    }

    pub fn with_state(mut self, state: CartesianState) -> Self {
        self.state = state;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_ephemeris<E: Ephemeris + 'static>(mut self, ephemeris: E) -> Self {
        self.ephemeris = Some(Box::new(ephemeris));
        self
    }

    pub fn with_rotational_ephemeris<R: RotationalEphemeris + 'static>(mut self, eph: R) -> Self {
        self.rotation = Some(RotationModel::Ephemeris(Box::new(eph)));
        self
    }

    pub fn with_dependent_orientation<D: DependentOrientationCalculator + 'static>(
        mut self,
        calculator: D,
    ) -> Self {
        self.rotation = Some(RotationModel::Dependent(Box::new(calculator)));
        self
    }

    pub fn with_rotation_model(mut self, rotation: RotationModel) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_gravity_field(mut self, gravity_field: GravityField) -> Self {
        self.gravity_field = Some(gravity_field);
        self
    }

    pub fn with_atmosphere<A: Atmosphere + 'static>(mut self, atmosphere: A) -> Self {
        self.atmosphere = Some(Box::new(atmosphere));
        self
    }

    pub fn with_shape_radius(mut self, radius: f64) -> Self {
        self.shape_radius = Some(radius);
        self
    }

    pub fn with_flight_conditions(mut self, central_body: impl Into<String>) -> Self {
        self.flight_conditions = Some(FlightConditions::new(central_body));
        self
    }

    /// Replaces any interface with the same source
    pub fn with_radiation_pressure(mut self, interface: RadiationPressureInterface) -> Self {
        self.radiation_pressure
            .insert(interface.source().to_owned(), interface);
        self
    }

    pub fn with_mass_model<M: MassModel + 'static>(mut self, mass_model: M) -> Self {
        self.mass_model = Some(Box::new(mass_model));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Global frame
    pub fn state(&self) -> &CartesianState {
        &self.state
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state.fixed_rows::<3>(0).into_owned()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state.fixed_rows::<3>(3).into_owned()
    }

    pub fn set_state(&mut self, state: CartesianState) {
        self.state = state;
    }

    pub fn rotational_state(&self) -> &RotationalState {
        &self.rotational_state
    }

    pub fn set_rotational_state(&mut self, rotational_state: RotationalState) {
        self.rotational_state = rotational_state;
    }

    /// [kg]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    pub fn ephemeris(&self) -> Option<&dyn Ephemeris> {
        self.ephemeris.as_deref()
    }

    pub fn rotation_model(&self) -> Option<&RotationModel> {
        self.rotation.as_ref()
    }

    pub fn rotational_ephemeris(&self) -> Option<&dyn RotationalEphemeris> {
        match self.rotation.as_ref() {
            Some(RotationModel::Ephemeris(eph)) => Some(eph.as_ref()),
            _ => None,
        }
    }

    pub fn dependent_orientation(&self) -> Option<&dyn DependentOrientationCalculator> {
        match self.rotation.as_ref() {
            Some(RotationModel::Dependent(calc)) => Some(calc.as_ref()),
            _ => None,
        }
    }

    pub fn dependent_orientation_mut(
        &mut self,
    ) -> Option<&mut (dyn DependentOrientationCalculator + 'static)> {
        match self.rotation.as_mut() {
            Some(RotationModel::Dependent(calc)) => Some(calc.as_mut()),
            _ => None,
        }
    }

    pub fn gravity_field(&self) -> Option<&GravityField> {
        self.gravity_field.as_ref()
    }

    pub fn time_dependent_gravity_field(&self) -> Option<&TimeDependentSphericalHarmonicsField> {
        self.gravity_field.as_ref().and_then(GravityField::time_dependent)
    }

    pub fn time_dependent_gravity_field_mut(
        &mut self,
    ) -> Option<&mut TimeDependentSphericalHarmonicsField> {
        self.gravity_field
            .as_mut()
            .and_then(GravityField::time_dependent_mut)
    }

    pub fn atmosphere(&self) -> Option<&dyn Atmosphere> {
        self.atmosphere.as_deref()
    }

    /// Mean radius of the body shape [m]
    pub fn shape_radius(&self) -> Option<f64> {
        self.shape_radius
    }

    pub fn flight_conditions(&self) -> Option<&FlightConditions> {
        self.flight_conditions.as_ref()
    }

    pub fn flight_conditions_mut(&mut self) -> Option<&mut FlightConditions> {
        self.flight_conditions.as_mut()
    }

    /// Keyed by source body name
    pub fn radiation_pressure(&self) -> &BTreeMap<String, RadiationPressureInterface> {
        &self.radiation_pressure
    }

    pub fn radiation_pressure_mut(
        &mut self,
        source: &str,
    ) -> Option<&mut RadiationPressureInterface> {
        self.radiation_pressure.get_mut(source)
    }

    pub fn mass_model(&self) -> Option<&dyn MassModel> {
        self.mass_model.as_deref()
    }

    /// The view of this body needed by models that orient themselves wrt it
    pub fn central_body_state(&self) -> CentralBodyState {
        CentralBodyState {
            state: self.state,
            rotation: self.rotational_state,
        }
    }

    pub fn set_state_from_ephemeris(&mut self, time: Epoch) -> Result<(), Error> {
        let ephemeris = self.ephemeris.as_ref().ok_or_else(|| {
            Error::missing(&self.name, EnvironmentModelKind::TranslationalState, "ephemeris")
        })?;
        self.state = ephemeris.cartesian_state(time);
        Ok(())
    }

    pub fn update_mass(&mut self, time: Epoch) -> Result<(), Error> {
        let model = self
            .mass_model
            .as_ref()
            .ok_or_else(|| Error::missing(&self.name, EnvironmentModelKind::Mass, "mass model"))?;
        self.mass = model.mass(time);
        Ok(())
    }

    /// `inputs` is only consulted for dependent orientations
    pub fn update_rotational_state(
        &mut self,
        time: Epoch,
        inputs: Option<&OrientationInputs>,
    ) -> Result<(), Error> {
        match self.rotation.as_mut() {
            Some(RotationModel::Ephemeris(eph)) => {
                self.rotational_state = eph.rotational_state(time);
            }
            Some(RotationModel::Dependent(calc)) => {
                if let Some(inputs) = inputs {
                    calc.update(time, inputs);
                }
                self.rotational_state = calc.rotational_state();
            }
            None => {
                return Err(Error::missing(
                    &self.name,
                    EnvironmentModelKind::RotationalState,
                    "rotational ephemeris or dependent orientation",
                ))
            }
        }
        Ok(())
    }
}
