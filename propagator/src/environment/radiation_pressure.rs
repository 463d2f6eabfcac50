use bodytypes::prelude::Epoch;
use na::Vector3;

/// Solar constant at one astronomical unit [W/m^2]
pub const SOLAR_CONSTANT: f64 = 1360.8;
pub const ASTRONOMICAL_UNIT: f64 = 1.495978707E11;
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Cannonball radiation pressure acting on a body, due to a single source
#[derive(Clone, PartialEq, Debug)]
pub struct RadiationPressureInterface {
    source: String,
    /// Pressure at `reference_distance` from the source [N/m^2]
    pub reference_pressure: f64,
    /// [m]
    pub reference_distance: f64,
    /// [m^2]
    pub area: f64,
    pub coefficient: f64,
    current_time: Epoch,
    current_pressure: f64,
    /// Unit vector from the source to the target, global frame
    current_direction: Vector3<f64>,
}

impl RadiationPressureInterface {
    pub fn new(
        source: impl Into<String>,
        reference_pressure: f64,
        reference_distance: f64,
        area: f64,
        coefficient: f64,
    ) -> Self {
        Self {
            source: source.into(),
            reference_pressure,
            reference_distance,
            area,
            coefficient,
            current_time: Epoch::NAN,
            current_pressure: 0.0,
            current_direction: Vector3::zeros(),
        }
    }

    /// Solar source with the pressure at 1 AU derived from the solar constant
    pub fn solar(source: impl Into<String>, area: f64, coefficient: f64) -> Self {
        Self::new(
            source,
            SOLAR_CONSTANT / SPEED_OF_LIGHT,
            ASTRONOMICAL_UNIT,
            area,
            coefficient,
        )
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn current_time(&self) -> Epoch {
        self.current_time
    }

    /// [N/m^2]
    pub fn current_pressure(&self) -> f64 {
        self.current_pressure
    }

    pub fn current_direction(&self) -> Vector3<f64> {
        self.current_direction
    }

    /// Positions in the global frame [m]
    pub fn update(&mut self, time: Epoch, source_position: &Vector3<f64>, target_position: &Vector3<f64>) {
        if time == self.current_time {
            return;
        }
        let separation = target_position - source_position;
        let distance = separation.norm();
        if distance > 0.0 {
            let ratio = self.reference_distance / distance;
            self.current_pressure = self.reference_pressure * ratio * ratio;
            self.current_direction = separation / distance;
        } else {
            self.current_pressure = 0.0;
            self.current_direction = Vector3::zeros();
        }
        self.current_time = time;
    }

    /// Force on the target, global frame [N]
    pub fn current_force(&self) -> Vector3<f64> {
        self.current_direction * (self.current_pressure * self.area * self.coefficient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_square_falloff() {
        let mut rp = RadiationPressureInterface::solar("Sun", 4.0, 1.2);
        let sun = Vector3::zeros();
        rp.update(0.0, &sun, &Vector3::new(ASTRONOMICAL_UNIT, 0.0, 0.0));
        let at_one_au = rp.current_pressure();
        assert_relative_eq!(at_one_au, SOLAR_CONSTANT / SPEED_OF_LIGHT);

        rp.update(1.0, &sun, &Vector3::new(0.0, 2.0 * ASTRONOMICAL_UNIT, 0.0));
        assert_relative_eq!(rp.current_pressure(), at_one_au / 4.0);
        assert_relative_eq!(rp.current_direction(), Vector3::y());
        assert_relative_eq!(
            rp.current_force(),
            Vector3::y() * (at_one_au / 4.0 * 4.0 * 1.2)
        );
    }

    #[test]
    fn cached_on_time() {
        let mut rp = RadiationPressureInterface::new("Sun", 1.0, 1.0, 1.0, 1.0);
        rp.update(3.0, &Vector3::zeros(), &Vector3::x());
        rp.update(3.0, &Vector3::zeros(), &(Vector3::x() * 2.0));
        assert_eq!(rp.current_pressure(), 1.0);
    }
}
