//! Human-readable durations such as `500ms`, `2s` or `1m`.

use std::{fmt, str::FromStr, time::Duration};

use subjunctive_core::ConfigError;

/// A duration written as `<integer><unit>` with unit `ms`, `s` or `m`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timespec(Duration);

impl Timespec {
    /// The parsed duration.
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }
}

impl FromStr for Timespec {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTimespec(value.to_owned());
        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (magnitude, unit) = value.split_at(split);
        if magnitude.is_empty() {
            return Err(invalid());
        }
        let magnitude: u64 = magnitude.parse().map_err(|_| invalid())?;
        let millis_per_unit = match unit {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            _ => return Err(invalid()),
        };
        let millis = magnitude.checked_mul(millis_per_unit).ok_or_else(invalid)?;
        Ok(Self(Duration::from_millis(millis)))
    }
}

impl From<Timespec> for Duration {
    fn from(timespec: Timespec) -> Self {
        timespec.0
    }
}

impl fmt::Display for Timespec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
