//! Shared data model for the rangefinder workspace.
//!
//! Every driver in `rangefinder-hal` produces a [`DistanceReading`] and is
//! configured through a [`RangingConfig`].  Failures of the collaborators
//! around a measurement (GPIO faults, bad configuration) are reported as
//! [`RangingError`]; a measurement that simply found nothing is *not* an
//! error and is expressed through the reading itself.

pub mod config;
pub mod constants;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{HardwarePins, RangingConfig, SensorVariant};

/// Outcome of a single ranging attempt.
///
/// Produced fresh by every call to a driver and never persisted.  The two
/// failure variants are kept apart for diagnostics; consumers that only care
/// about "usable or not" should call [`DistanceReading::centimeters`] or the
/// single-value [`DistanceReading::to_sentinel_f32`] view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DistanceReading {
    /// A distance inside the driver's plausible band, in centimetres.
    Valid { cm: f32 },
    /// The echo pulse did not complete before the timeout.
    NoEcho,
    /// The computed distance was outside the transducer's valid band.
    /// Carries the raw computed value.
    OutOfRange { cm: f32 },
}

impl DistanceReading {
    /// `true` only for [`DistanceReading::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The usable distance in centimetres, if any.
    pub fn centimeters(&self) -> Option<f32> {
        match *self {
            Self::Valid { cm } => Some(cm),
            Self::NoEcho | Self::OutOfRange { .. } => None,
        }
    }

    /// Collapse the reading into the single-float contract used by simple
    /// consumers: the distance for a valid reading, `NaN` otherwise.
    ///
    /// Test the result with [`f32::is_nan`], never with `==`.
    pub fn to_sentinel_f32(&self) -> f32 {
        self.centimeters().unwrap_or(f32::NAN)
    }

    /// Inverse of [`to_sentinel_f32`][Self::to_sentinel_f32].  Any non-finite
    /// value maps to [`DistanceReading::NoEcho`]; finite values are taken as
    /// valid without a range check.
    pub fn from_sentinel_f32(value: f32) -> Self {
        if value.is_finite() {
            Self::Valid { cm: value }
        } else {
            Self::NoEcho
        }
    }
}

impl std::fmt::Display for DistanceReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid { cm } => write!(f, "{cm:.2} cm"),
            Self::NoEcho => write!(f, "no echo"),
            Self::OutOfRange { cm } => write!(f, "out of range ({cm:.2} cm)"),
        }
    }
}

/// Errors raised around a measurement: pin I/O, configuration, and platform
/// support.  Timeouts and implausible distances are readings, not errors.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangingError {
    #[error("Pin Fault on {pin}: {details}")]
    Pin { pin: String, details: String },

    #[error("Invalid Ranging Config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported Sensor Variant: {0}")]
    Unsupported(String),

    #[error("Driver '{0}' used before initialize()")]
    NotInitialized(String),
}
