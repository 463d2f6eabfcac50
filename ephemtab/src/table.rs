use bodytypes::prelude::{CartesianState, Epoch};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EphemerisRecord {
    /// Seconds since J2000
    pub epoch: Epoch,
    /// Position [m] and velocity [m/s] wrt the table origin
    pub state: CartesianState,
}

/// A time-ordered table of Cartesian states.
///
/// Epochs are strictly increasing; the parser rejects anything else.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EphemerisTable {
    /// Name of the body the states are relative to, if declared
    pub origin: Option<String>,
    /// Name of the frame orientation, if declared
    pub frame: Option<String>,
    pub records: Vec<EphemerisRecord>,
}

impl EphemerisTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First and last epoch
    pub fn span(&self) -> Option<(Epoch, Epoch)> {
        Some((self.records.first()?.epoch, self.records.last()?.epoch))
    }

    /// Linearly interpolated state, held constant outside the table span.
    pub fn interpolate(&self, epoch: Epoch) -> Option<CartesianState> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        if epoch <= first.epoch {
            return Some(first.state);
        }
        if epoch >= last.epoch {
            return Some(last.state);
        }

        // First record strictly after epoch; a NaN epoch lands outside 1..len
        let upper = self.records.partition_point(|r| r.epoch <= epoch);
        let r0 = self.records.get(upper.checked_sub(1)?)?;
        let r1 = self.records.get(upper)?;
        let frac = (epoch - r0.epoch) / (r1.epoch - r0.epoch);
        Some(r0.state + (r1.state - r0.state) * frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EphemerisTable {
        EphemerisTable {
            origin: None,
            frame: None,
            records: vec![
                EphemerisRecord {
                    epoch: 0.0,
                    state: CartesianState::new(0.0, 0.0, 0.0, 1.0, 0.0, 0.0),
                },
                EphemerisRecord {
                    epoch: 10.0,
                    state: CartesianState::new(10.0, 0.0, 0.0, 1.0, 0.0, 0.0),
                },
                EphemerisRecord {
                    epoch: 20.0,
                    state: CartesianState::new(30.0, 0.0, 0.0, 3.0, 0.0, 0.0),
                },
            ],
        }
    }

    #[test]
    fn interpolate_inside_span() {
        let t = table();
        assert_eq!(t.span(), Some((0.0, 20.0)));
        assert_eq!(t.interpolate(5.0).unwrap()[0], 5.0);
        assert_eq!(t.interpolate(10.0).unwrap()[0], 10.0);
        assert_eq!(t.interpolate(15.0).unwrap()[0], 20.0);
        assert_eq!(t.interpolate(15.0).unwrap()[3], 2.0);
    }

    #[test]
    fn clamp_outside_span() {
        let t = table();
        assert_eq!(t.interpolate(-5.0), Some(t.records[0].state));
        assert_eq!(t.interpolate(25.0), Some(t.records[2].state));
        assert_eq!(EphemerisTable::default().interpolate(0.0), None);
    }

    #[test]
    fn nan_never_indexes_out_of_span() {
        let mut t = table();
        assert_eq!(t.interpolate(f64::NAN), None);

        t.records[0].epoch = f64::NAN;
        assert_eq!(t.interpolate(5.0), None);
    }
}
