//! Generic `RangingDriver` trait for single-value distance sensors.
//!
//! Callers only ever talk to the trait, so the ultrasonic driver and the
//! simulator can be swapped without touching obstacle-avoidance or telemetry
//! logic.

use rangefinder_types::{DistanceReading, RangingError};

/// A sensor that returns one distance per call.
///
/// Calls are synchronous and must be serialised by the caller: a driver owns
/// its pins (or its simulated state) exclusively and never starts a new
/// measurement while one is in flight.
pub trait RangingDriver {
    /// Stable identifier for this sensor, e.g. `"front_sonar"`.
    fn id(&self) -> &str;

    /// One-time setup: pin configuration or RNG seeding.  Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RangingError::Pin`] if a pin cannot be driven.
    fn initialize(&mut self) -> Result<(), RangingError>;

    /// Take one reading.
    ///
    /// A missing echo or an implausible distance is reported through the
    /// returned [`DistanceReading`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`RangingError::Pin`] on GPIO failure and
    /// [`RangingError::NotInitialized`] when the driver requires
    /// [`initialize`][Self::initialize] first.
    fn measure_distance(&mut self) -> Result<DistanceReading, RangingError>;
}

impl<T: RangingDriver + ?Sized> RangingDriver for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn initialize(&mut self) -> Result<(), RangingError> {
        (**self).initialize()
    }

    fn measure_distance(&mut self) -> Result<DistanceReading, RangingError> {
        (**self).measure_distance()
    }
}
