//! Linux character-device GPIO backend for the hardware variant.

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, Delay};

use rangefinder_hal::{HardwareRangingDriver, RangingDriver, StdClock};
use rangefinder_types::{HardwarePins, RangingConfig, RangingError};

const CONSUMER: &str = "rangefinder";

fn gpio_fault(pin: &str, err: impl std::fmt::Display) -> RangingError {
    RangingError::Pin {
        pin: pin.to_string(),
        details: err.to_string(),
    }
}

/// Open the trigger and echo lines on `pins.gpio_chip` and wrap them in a
/// [`HardwareRangingDriver`].
pub fn open(
    sensor_id: &str,
    pins: &HardwarePins,
    config: &RangingConfig,
) -> Result<Box<dyn RangingDriver>, RangingError> {
    let mut chip = Chip::new(&pins.gpio_chip).map_err(|e| gpio_fault(&pins.gpio_chip, e))?;

    let trigger = chip
        .get_line(pins.trigger_pin)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, CONSUMER))
        .map_err(|e| gpio_fault("trigger", e))?;
    let echo = chip
        .get_line(pins.echo_pin)
        .and_then(|line| line.request(LineRequestFlags::INPUT, 0, CONSUMER))
        .map_err(|e| gpio_fault("echo", e))?;

    let trigger = CdevPin::new(trigger).map_err(|e| gpio_fault("trigger", e))?;
    let echo = CdevPin::new(echo).map_err(|e| gpio_fault("echo", e))?;

    Ok(Box::new(
        HardwareRangingDriver::new(sensor_id, trigger, echo, Delay, StdClock::new())
            .with_config(config),
    ))
}
