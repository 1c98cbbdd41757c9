//! Pulse-echo ultrasonic driver (HC-SR04 style transducers).
//!
//! One measurement is a 10 µs trigger pulse followed by timing how long the
//! echo line stays high.  The echo width is the sound's round-trip time, so
//!
//! ```text
//! distance_cm = duration_us × speed_of_sound_cm_per_us / 2
//! ```
//!
//! Readings outside the transducer's 2–400 cm band are rejected as
//! [`DistanceReading::OutOfRange`]; an echo that never completes within the
//! timeout is [`DistanceReading::NoEcho`].  Each call is a single attempt,
//! there are no retries.
//!
//! `measure_distance` busy-waits on the echo line for up to the timeout
//! (30 ms by default).  It takes `&mut self`, so overlapping measurements on
//! the same pins cannot be expressed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use tracing::{debug, info};

use rangefinder_types::constants::{
    DEFAULT_ECHO_TIMEOUT_US, HARDWARE_MAX_CM, HARDWARE_MIN_CM, SETTLE_DELAY_MS,
    SPEED_OF_SOUND_CM_PER_US, TRIGGER_PULSE_US, TRIGGER_SETTLE_US,
};
use rangefinder_types::{DistanceReading, RangingConfig, RangingError};

use crate::clock::MicrosClock;
use crate::ranging::RangingDriver;

/// Classify an echo duration.
///
/// `0` means the echo never completed and yields
/// [`DistanceReading::NoEcho`].  Otherwise the round-trip time is converted
/// to centimetres and checked against the inclusive 2–400 cm band.
pub fn echo_to_reading(duration_us: u32, speed_of_sound_cm_per_us: f32) -> DistanceReading {
    if duration_us == 0 {
        return DistanceReading::NoEcho;
    }
    let cm = (duration_us as f32 * speed_of_sound_cm_per_us) / 2.0;
    if (HARDWARE_MIN_CM..=HARDWARE_MAX_CM).contains(&cm) {
        DistanceReading::Valid { cm }
    } else {
        DistanceReading::OutOfRange { cm }
    }
}

/// Measure the width of the next high pulse on `pin`, in microseconds.
///
/// A pulse already in progress when the call starts is skipped.  The timeout
/// covers the whole operation: waiting for the line to settle low, for the
/// rising edge, and for the falling edge.  If any of these does not happen
/// in time the result is `0`.
///
/// # Errors
///
/// Returns [`RangingError::Pin`] if the pin cannot be read.
pub fn pulse_in<P, C>(pin: &mut P, clock: &mut C, timeout_us: u32) -> Result<u32, RangingError>
where
    P: InputPin,
    C: MicrosClock,
{
    let deadline = clock.now_us().saturating_add(u64::from(timeout_us));

    while read_echo(pin)? {
        if clock.now_us() >= deadline {
            return Ok(0);
        }
    }
    while !read_echo(pin)? {
        if clock.now_us() >= deadline {
            return Ok(0);
        }
    }
    let rise = clock.now_us();
    while read_echo(pin)? {
        if clock.now_us() >= deadline {
            return Ok(0);
        }
    }
    let fall = clock.now_us();

    Ok(u32::try_from(fall.saturating_sub(rise)).unwrap_or(u32::MAX))
}

fn read_echo<P: InputPin>(pin: &mut P) -> Result<bool, RangingError> {
    pin.is_high().map_err(|e| pin_fault("echo", e))
}

fn pin_fault(pin: &str, err: impl core::fmt::Debug) -> RangingError {
    RangingError::Pin {
        pin: pin.to_string(),
        details: format!("{err:?}"),
    }
}

/// Ultrasonic ranging driver over `embedded-hal` pins.
///
/// The driver exclusively owns the trigger/echo pair, a delay provider and a
/// [`MicrosClock`].  Use [`release`][Self::release] to get them back.
pub struct HardwareRangingDriver<Trig, Echo, Delay, Clock> {
    id: String,
    trigger: Trig,
    echo: Echo,
    delay: Delay,
    clock: Clock,
    echo_timeout_us: u32,
    speed_of_sound_cm_per_us: f32,
    initialized: bool,
}

impl<Trig, Echo, Delay, Clock> HardwareRangingDriver<Trig, Echo, Delay, Clock>
where
    Trig: OutputPin,
    Echo: InputPin,
    Delay: DelayNs,
    Clock: MicrosClock,
{
    /// Create a driver with the default 30 ms timeout and 0.0343 cm/µs speed
    /// of sound.  Call [`RangingDriver::initialize`] before measuring.
    pub fn new(id: impl Into<String>, trigger: Trig, echo: Echo, delay: Delay, clock: Clock) -> Self {
        Self {
            id: id.into(),
            trigger,
            echo,
            delay,
            clock,
            echo_timeout_us: DEFAULT_ECHO_TIMEOUT_US,
            speed_of_sound_cm_per_us: SPEED_OF_SOUND_CM_PER_US,
            initialized: false,
        }
    }

    /// Take the timeout and speed of sound from `config`.
    pub fn with_config(mut self, config: &RangingConfig) -> Self {
        self.echo_timeout_us = config.echo_timeout_us;
        self.speed_of_sound_cm_per_us = config.speed_of_sound_cm_per_us;
        self
    }

    /// Echo timeout in microseconds.
    pub fn echo_timeout_us(&self) -> u32 {
        self.echo_timeout_us
    }

    /// Consume the driver and hand back its resources.
    pub fn release(self) -> (Trig, Echo, Delay, Clock) {
        (self.trigger, self.echo, self.delay, self.clock)
    }

    fn fire_trigger(&mut self) -> Result<(), RangingError> {
        self.trigger.set_low().map_err(|e| pin_fault("trigger", e))?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high().map_err(|e| pin_fault("trigger", e))?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|e| pin_fault("trigger", e))
    }
}

impl<Trig, Echo, Delay, Clock> RangingDriver for HardwareRangingDriver<Trig, Echo, Delay, Clock>
where
    Trig: OutputPin,
    Echo: InputPin,
    Delay: DelayNs,
    Clock: MicrosClock,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn initialize(&mut self) -> Result<(), RangingError> {
        self.trigger.set_low().map_err(|e| pin_fault("trigger", e))?;
        self.delay.delay_ms(SETTLE_DELAY_MS);
        if !self.initialized {
            info!(
                sensor = %self.id,
                timeout_us = self.echo_timeout_us,
                "ultrasonic ranging driver initialised"
            );
        }
        self.initialized = true;
        Ok(())
    }

    fn measure_distance(&mut self) -> Result<DistanceReading, RangingError> {
        if !self.initialized {
            return Err(RangingError::NotInitialized(self.id.clone()));
        }
        self.fire_trigger()?;
        let duration_us = pulse_in(&mut self.echo, &mut self.clock, self.echo_timeout_us)?;
        let reading = echo_to_reading(duration_us, self.speed_of_sound_cm_per_us);
        debug!(sensor = %self.id, duration_us, %reading, "echo measured");
        Ok(reading)
    }
}
