//! Gravity field models.
//!
//! Coefficient matrices are normalized and indexed as `(degree, order)`.

use bodytypes::prelude::Epoch;
use na::DMatrix;

#[derive(Debug)]
pub enum GravityField {
    PointMass { gravitational_parameter: f64 },
    SphericalHarmonics(SphericalHarmonicsField),
    TimeDependentSphericalHarmonics(TimeDependentSphericalHarmonicsField),
}

impl GravityField {
    /// [m^3/s^2]
    pub fn gravitational_parameter(&self) -> f64 {
        match self {
            GravityField::PointMass {
                gravitational_parameter,
            } => *gravitational_parameter,
            GravityField::SphericalHarmonics(f) => f.gravitational_parameter,
            GravityField::TimeDependentSphericalHarmonics(f) => f.field.gravitational_parameter,
        }
    }

    /// The current coefficients, for either harmonic variant
    pub fn spherical_harmonics(&self) -> Option<&SphericalHarmonicsField> {
        match self {
            GravityField::PointMass { .. } => None,
            GravityField::SphericalHarmonics(f) => Some(f),
            GravityField::TimeDependentSphericalHarmonics(f) => Some(&f.field),
        }
    }

    pub fn time_dependent(&self) -> Option<&TimeDependentSphericalHarmonicsField> {
        match self {
            GravityField::TimeDependentSphericalHarmonics(f) => Some(f),
            _ => None,
        }
    }

    pub fn time_dependent_mut(&mut self) -> Option<&mut TimeDependentSphericalHarmonicsField> {
        match self {
            GravityField::TimeDependentSphericalHarmonics(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SphericalHarmonicsField {
    /// [m^3/s^2]
    pub gravitational_parameter: f64,
    /// [m]
    pub reference_radius: f64,
    pub cosine_coefficients: DMatrix<f64>,
    pub sine_coefficients: DMatrix<f64>,
}

impl SphericalHarmonicsField {
    pub fn max_degree(&self) -> usize {
        self.cosine_coefficients.nrows().saturating_sub(1)
    }

    pub fn max_order(&self) -> usize {
        self.cosine_coefficients.ncols().saturating_sub(1)
    }
}

/// A time-variable contribution to the harmonic coefficients, e.g. tidal
/// deformation or secular drift of the zonal terms.
pub trait GravityFieldVariation: std::fmt::Debug {
    /// Adds the corrections at `time` onto the supplied coefficients
    fn add_corrections(&self, time: Epoch, cosine: &mut DMatrix<f64>, sine: &mut DMatrix<f64>);
}

/// Spherical harmonic field whose coefficients are the nominal values plus
/// the sum of all variations at the current time.
#[derive(Debug)]
pub struct TimeDependentSphericalHarmonicsField {
    field: SphericalHarmonicsField,
    nominal_cosine_coefficients: DMatrix<f64>,
    nominal_sine_coefficients: DMatrix<f64>,
    variations: Vec<Box<dyn GravityFieldVariation>>,
    current_time: Epoch,
}

impl TimeDependentSphericalHarmonicsField {
    pub fn new(
        nominal: SphericalHarmonicsField,
        variations: Vec<Box<dyn GravityFieldVariation>>,
    ) -> Self {
        Self {
            nominal_cosine_coefficients: nominal.cosine_coefficients.clone(),
            nominal_sine_coefficients: nominal.sine_coefficients.clone(),
            field: nominal,
            variations,
            current_time: Epoch::NAN,
        }
    }

    /// Current coefficients; nominal until the first update
    pub fn field(&self) -> &SphericalHarmonicsField {
        &self.field
    }

    pub fn nominal_cosine_coefficients(&self) -> &DMatrix<f64> {
        &self.nominal_cosine_coefficients
    }

    pub fn current_time(&self) -> Epoch {
        self.current_time
    }

    pub fn update(&mut self, time: Epoch) {
        if time == self.current_time {
            return;
        }
        self.field
            .cosine_coefficients
            .copy_from(&self.nominal_cosine_coefficients);
        self.field
            .sine_coefficients
            .copy_from(&self.nominal_sine_coefficients);
        for variation in self.variations.iter() {
            variation.add_corrections(
                time,
                &mut self.field.cosine_coefficients,
                &mut self.field.sine_coefficients,
            );
        }
        self.current_time = time;
    }
}

/// Coefficients drifting at a constant rate from a reference epoch
#[derive(Clone, PartialEq, Debug)]
pub struct SecularVariation {
    pub reference_epoch: Epoch,
    /// [1/s]
    pub cosine_rates: DMatrix<f64>,
    /// [1/s]
    pub sine_rates: DMatrix<f64>,
}

impl GravityFieldVariation for SecularVariation {
    fn add_corrections(&self, time: Epoch, cosine: &mut DMatrix<f64>, sine: &mut DMatrix<f64>) {
        let dt = time - self.reference_epoch;
        add_scaled(cosine, &self.cosine_rates, dt);
        add_scaled(sine, &self.sine_rates, dt);
    }
}

/// Coefficients oscillating at a single angular frequency
#[derive(Clone, PartialEq, Debug)]
pub struct PeriodicVariation {
    pub reference_epoch: Epoch,
    /// [rad/s]
    pub angular_frequency: f64,
    /// [rad]
    pub phase: f64,
    pub cosine_amplitudes: DMatrix<f64>,
    pub sine_amplitudes: DMatrix<f64>,
}

impl GravityFieldVariation for PeriodicVariation {
    fn add_corrections(&self, time: Epoch, cosine: &mut DMatrix<f64>, sine: &mut DMatrix<f64>) {
        let arg = self.angular_frequency * (time - self.reference_epoch) + self.phase;
        let scale = arg.cos();
        add_scaled(cosine, &self.cosine_amplitudes, scale);
        add_scaled(sine, &self.sine_amplitudes, scale);
    }
}

/// Adds `scale * delta` over the overlapping block of the two matrices
fn add_scaled(target: &mut DMatrix<f64>, delta: &DMatrix<f64>, scale: f64) {
    let rows = target.nrows().min(delta.nrows());
    let cols = target.ncols().min(delta.ncols());
    for r in 0..rows {
        for c in 0..cols {
            target[(r, c)] += scale * delta[(r, c)];
        }
    }
}
