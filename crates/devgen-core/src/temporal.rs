//! # Temporal Types: Time Periods
//!
//! Defines [`TimePeriod`], the validated form of duration literals such as
//! `0s`, `250ms`, `1.5min` or `2h`.
//!
//! ## Invariant
//!
//! A time period always carries an explicit unit. A bare number is only
//! accepted when it is zero, since `0` means the same thing in every unit.
//! Internally the period is stored in whole microseconds, so two literals
//! that denote the same span (`1000ms`, `1s`) compare equal.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::CoercionError;

/// Units accepted after the numeric part, with their length in microseconds.
const UNITS: &[(&str, u64)] = &[
    ("us", 1),
    ("ms", 1_000),
    ("s", 1_000_000),
    ("sec", 1_000_000),
    ("min", 60_000_000),
    ("h", 3_600_000_000),
    ("d", 86_400_000_000),
];

/// A non-negative span of time with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimePeriod {
    micros: u64,
}

impl TimePeriod {
    /// The zero-length period.
    pub const ZERO: TimePeriod = TimePeriod { micros: 0 };

    /// Create a period from whole milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self {
            micros: millis.saturating_mul(1_000),
        }
    }

    /// Parse a duration literal.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::Invalid`] if the literal has no unit (other than
    /// `0`), an unknown unit, a malformed or negative number, or overflows.
    pub fn parse(s: &str) -> Result<Self, CoercionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoercionError::invalid("expected a time period, got an empty string"));
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let unit = unit.trim_start();

        let value: f64 = number
            .parse()
            .map_err(|_| CoercionError::invalid(format!("invalid time period {s:?}")))?;

        if unit.is_empty() {
            if value == 0.0 {
                return Ok(Self::ZERO);
            }
            return Err(CoercionError::invalid(format!(
                "time period {s:?} has no unit, did you mean '{number}s'?"
            )));
        }

        let factor = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, factor)| *factor)
            .ok_or_else(|| {
                CoercionError::invalid(format!(
                    "unknown time unit {unit:?} in {s:?}, expected one of: us, ms, s, min, h, d"
                ))
            })?;

        let micros = (value * factor as f64).round();
        if !micros.is_finite() || micros < 0.0 || micros > u64::MAX as f64 {
            return Err(CoercionError::invalid(format!("time period {s:?} is out of range")));
        }

        Ok(Self {
            micros: micros as u64,
        })
    }

    /// Total length in whole milliseconds, truncating sub-millisecond parts.
    pub fn total_milliseconds(&self) -> u64 {
        self.micros / 1_000
    }

    /// Total length in microseconds.
    pub fn total_microseconds(&self) -> u64 {
        self.micros
    }

    /// Convert to a standard library duration.
    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(self.micros)
    }
}

impl fmt::Display for TimePeriod {
    /// Renders using the largest unit that divides the period exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.micros == 0 {
            return f.write_str("0s");
        }
        let display_units: [(&str, u64); 5] = [
            ("d", 86_400_000_000),
            ("h", 3_600_000_000),
            ("min", 60_000_000),
            ("s", 1_000_000),
            ("ms", 1_000),
        ];
        for (name, factor) in display_units {
            if self.micros % factor == 0 {
                return write!(f, "{}{name}", self.micros / factor);
            }
        }
        write!(f, "{}us", self.micros)
    }
}

impl FromStr for TimePeriod {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Millisecond literals survive parsing exactly.
        #[test]
        fn millis_literal_exact(ms in 0u64..10_000_000_000) {
            let period = TimePeriod::parse(&format!("{ms}ms")).unwrap();
            prop_assert_eq!(period.total_milliseconds(), ms);
        }

        /// Rendering and re-parsing yields the same period.
        #[test]
        fn display_reparses(ms in 0u64..1_000_000_000) {
            let period = TimePeriod::from_millis(ms);
            prop_assert_eq!(TimePeriod::parse(&period.to_string()).unwrap(), period);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_never_panics(s in "\\PC{0,16}") {
            let _ = TimePeriod::parse(&s);
        }
    }
}
