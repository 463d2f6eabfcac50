use bodytypes::prelude::Epoch;

/// Body mass as a function of time, used when the mass is not integrated.
pub trait MassModel: std::fmt::Debug {
    fn mass(&self, time: Epoch) -> f64;

    /// [kg/s]
    fn mass_rate(&self, _time: Epoch) -> f64 {
        0.0
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ConstantMass(pub f64);

impl MassModel for ConstantMass {
    fn mass(&self, _time: Epoch) -> f64 {
        self.0
    }
}

/// Mass changing at a fixed rate from a reference epoch, floored at `dry_mass`
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LinearMassRate {
    pub initial_mass: f64,
    pub dry_mass: f64,
    /// [kg/s], negative when expelling propellant
    pub rate: f64,
    pub reference_epoch: Epoch,
}

impl MassModel for LinearMassRate {
    fn mass(&self, time: Epoch) -> f64 {
        (self.initial_mass + self.rate * (time - self.reference_epoch)).max(self.dry_mass)
    }

    fn mass_rate(&self, time: Epoch) -> f64 {
        if self.mass(time) > self.dry_mass {
            self.rate
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_rate_floors_at_dry_mass() {
        let m = LinearMassRate {
            initial_mass: 100.0,
            dry_mass: 60.0,
            rate: -1.0,
            reference_epoch: 10.0,
        };
        assert_eq!(m.mass(10.0), 100.0);
        assert_eq!(m.mass(30.0), 80.0);
        assert_eq!(m.mass(1000.0), 60.0);
        assert_eq!(m.mass_rate(30.0), -1.0);
        assert_eq!(m.mass_rate(1000.0), 0.0);
        assert_eq!(ConstantMass(5.0).mass_rate(0.0), 0.0);
    }
}
