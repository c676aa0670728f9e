//! Type-safe wrappers for lap telemetry units
//!
//! Newtype wrappers around f64 so lap times, pace deltas and wear values
//! cannot be mixed up.
//!
//! All unit types serialize with 4 decimal places to keep JSON payloads compact.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Round f64 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 10000.0).round() / 10000.0)
}

/// Seconds (sector times, lap times, signed pace deltas)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(#[serde(serialize_with = "round4")] pub f64);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0.0);

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_gain(self) -> bool {
        self.0 < 0.0
    }
}

impl Add for Seconds {
    type Output = Seconds;

    fn add(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 + rhs.0)
    }
}

impl Sub for Seconds {
    type Output = Seconds;

    fn sub(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 - rhs.0)
    }
}

impl Sum for Seconds {
    fn sum<I: Iterator<Item = Seconds>>(iter: I) -> Seconds {
        iter.fold(Seconds::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Seconds> for Seconds {
    fn sum<I: Iterator<Item = &'a Seconds>>(iter: I) -> Seconds {
        iter.copied().sum()
    }
}

/// Percentage on the 0-100 scale (tire wear, wear thresholds)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percent(#[serde(serialize_with = "round4")] pub f64);

impl Percent {
    pub fn is_valid(&self) -> bool {
        (0.0..=100.0).contains(&self.0)
    }
}
