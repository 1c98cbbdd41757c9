//! Distance-ranging drivers.
//!
//! Two interchangeable implementations of [`RangingDriver`]:
//!
//! - [`HardwareRangingDriver`] fires an ultrasonic transducer and times the
//!   echo pulse on `embedded-hal` pins.
//! - [`SimulatedRangingDriver`] produces a bounded random walk with
//!   occasional obstacle jumps, for exercising consumers without hardware.
//!
//! [`select_driver`] builds whichever one a [`RangingConfig`] asks for.
//!
//! [`RangingConfig`]: rangefinder_types::RangingConfig

pub mod clock;
pub mod ranging;
pub mod selector;
pub mod sim;
pub mod ultrasonic;

pub use clock::{MicrosClock, StdClock};
pub use ranging::RangingDriver;
pub use selector::{AnyRangingDriver, select_driver};
pub use sim::SimulatedRangingDriver;
pub use ultrasonic::{HardwareRangingDriver, echo_to_reading, pulse_in};
