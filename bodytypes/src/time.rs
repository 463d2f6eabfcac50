//! Simulation epochs are seconds since J2000 (2000-01-01T12:00:00).
//!
//! Leap seconds and the TT/UTC offset are not modelled.

use chrono::{DateTime, Duration, NaiveDate, Utc};

pub type UtcTimestamp = DateTime<Utc>;

/// Seconds since J2000
pub type Epoch = f64;

pub fn j2000() -> UtcTimestamp {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

pub fn seconds_since_j2000(t: &UtcTimestamp) -> Epoch {
    let dt = *t - j2000();
    match dt.num_nanoseconds() {
        Some(ns) => ns as f64 * 1e-9,
        None => dt.num_milliseconds() as f64 * 1e-3,
    }
}

pub fn from_seconds_since_j2000(epoch: Epoch) -> UtcTimestamp {
    j2000() + Duration::nanoseconds((epoch * 1e9).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_is_zero() {
        assert_eq!(seconds_since_j2000(&j2000()), 0.0);
    }

    #[test]
    fn one_day_after() {
        let t: UtcTimestamp = "2000-01-02T12:00:00Z".parse().unwrap();
        assert_eq!(seconds_since_j2000(&t), 86400.0);
        assert_eq!(from_seconds_since_j2000(86400.0), t);
    }
}
