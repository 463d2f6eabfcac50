use derive_more::Display;

/// Commanded aerodynamic angles [rad]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[display(
    fmt = "{{aoa: {}, sideslip: {}, bank: {}}}",
    "angle_of_attack",
    "sideslip",
    "bank"
)]
pub struct AerodynamicAngles {
    pub angle_of_attack: f64,
    pub sideslip: f64,
    pub bank: f64,
}

impl AerodynamicAngles {
    pub fn new(angle_of_attack: f64, sideslip: f64, bank: f64) -> Self {
        Self {
            angle_of_attack,
            sideslip,
            bank,
        }
    }
}

/// Flight conditions of a vehicle wrt its central body at a single epoch
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[display(
    fmt = "{{alt: {}, rho: {}, v: {}, mach: {}, ...}}",
    "altitude",
    "density",
    "airspeed",
    "mach_number"
)]
pub struct FlightConditionsState {
    /// Altitude above the central body shape [m]
    pub altitude: f64,
    /// Geocentric latitude [rad]
    pub latitude: f64,
    /// Geocentric longitude [rad]
    pub longitude: f64,
    /// [kg/m^3]
    pub density: f64,
    /// [K]
    pub temperature: f64,
    /// Speed wrt the rotating atmosphere [m/s]
    pub airspeed: f64,
    pub mach_number: f64,
    /// [Pa]
    pub dynamic_pressure: f64,
}
