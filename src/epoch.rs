//! Absolute timestamps for the simulation master clock.
//!
//! An [`Epoch`] is stored as integer nanoseconds since the J2000 reference
//! instant, so differencing two epochs is exact integer arithmetic followed
//! by a single float rounding. Over multi-year propagation spans this keeps
//! elapsed-time computation free of the cancellation error that a plain
//! `f64` seconds-since-reference representation accumulates.

use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// An instant in time, internally stored as nanoseconds since J2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch {
    /// Nanoseconds since the J2000 reference instant.
    ns: i128,
}

impl Epoch {
    /// The J2000 reference instant itself.
    pub const J2000: Epoch = Epoch { ns: 0 };

    /// Create an Epoch from raw nanoseconds since J2000.
    pub const fn from_ns(ns: i128) -> Self {
        Self { ns }
    }

    /// Create an Epoch from seconds since J2000.
    pub fn from_seconds(secs: f64) -> Self {
        Self {
            ns: (secs * NANOS_PER_SEC as f64) as i128,
        }
    }

    /// Raw nanoseconds since J2000.
    pub const fn as_ns(&self) -> i128 {
        self.ns
    }

    /// Seconds since J2000 (floating point).
    pub fn to_seconds(&self) -> f64 {
        self.ns as f64 / NANOS_PER_SEC as f64
    }

    /// Signed duration from `other` to `self`, in seconds.
    ///
    /// Computed as an exact integer difference before conversion to `f64`.
    pub fn duration_since(&self, other: &Epoch) -> f64 {
        (self.ns - other.ns) as f64 / NANOS_PER_SEC as f64
    }

    /// Add seconds to this epoch, returning a new instant.
    pub fn add_seconds(&self, secs: f64) -> Self {
        Self {
            ns: self.ns + (secs * NANOS_PER_SEC as f64) as i128,
        }
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Epoch({:.9} s past J2000)", self.to_seconds())
    }
}

impl std::ops::Sub for Epoch {
    type Output = f64;
    /// Returns duration in seconds.
    fn sub(self, rhs: Self) -> f64 {
        self.duration_since(&rhs)
    }
}
