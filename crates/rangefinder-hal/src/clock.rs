//! Microsecond time source for pulse timing.
//!
//! `embedded-hal` covers pins and delays but not timestamps, so the echo
//! timer reads time through [`MicrosClock`].  Firmware wires it to a hardware
//! timer; hosted builds use [`StdClock`].

use std::time::Instant;

/// A monotonic microsecond counter.
pub trait MicrosClock {
    /// Microseconds since an arbitrary fixed origin.  Never decreases.
    fn now_us(&mut self) -> u64;
}

impl<T: MicrosClock + ?Sized> MicrosClock for &mut T {
    fn now_us(&mut self) -> u64 {
        (**self).now_us()
    }
}

/// [`MicrosClock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrosClock for StdClock {
    fn now_us(&mut self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}
