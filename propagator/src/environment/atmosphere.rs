use bodytypes::prelude::Epoch;

/// Atmosphere of a central body, evaluated in its body-fixed frame.
pub trait Atmosphere: std::fmt::Debug {
    /// [kg/m^3]
    fn density(&self, altitude: f64, longitude: f64, latitude: f64, time: Epoch) -> f64;

    /// [K]
    fn temperature(&self, altitude: f64, longitude: f64, latitude: f64, time: Epoch) -> f64;

    /// [m/s]
    fn speed_of_sound(&self, altitude: f64, longitude: f64, latitude: f64, time: Epoch) -> f64;
}

/// Exponential atmosphere model
///
/// ρ(h) = ρ₀ × exp(-h / H), isothermal.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExponentialAtmosphere {
    /// Density at zero altitude [kg/m^3]
    pub surface_density: f64,
    /// [m]
    pub scale_height: f64,
    /// [K]
    pub temperature: f64,
    /// [J/(kg K)]
    pub specific_gas_constant: f64,
    pub ratio_of_specific_heats: f64,
}

impl ExponentialAtmosphere {
    /// Earth parameters
    pub fn earth() -> Self {
        Self {
            surface_density: 1.225,
            scale_height: 7.2E3,
            temperature: 246.0,
            specific_gas_constant: 287.0,
            ratio_of_specific_heats: 1.4,
        }
    }
}

impl Atmosphere for ExponentialAtmosphere {
    fn density(&self, altitude: f64, _longitude: f64, _latitude: f64, _time: Epoch) -> f64 {
        self.surface_density * (-altitude / self.scale_height).exp()
    }

    fn temperature(&self, _altitude: f64, _longitude: f64, _latitude: f64, _time: Epoch) -> f64 {
        self.temperature
    }

    fn speed_of_sound(&self, _altitude: f64, _longitude: f64, _latitude: f64, _time: Epoch) -> f64 {
        (self.ratio_of_specific_heats * self.specific_gas_constant * self.temperature).sqrt()
    }
}
