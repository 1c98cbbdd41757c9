//! [`RangingConfig`] – immutable driver configuration, read once at startup
//! and injected into a driver at construction.

use serde::{Deserialize, Serialize};

use crate::RangingError;
use crate::constants::{
    DEFAULT_ECHO_PIN, DEFAULT_ECHO_TIMEOUT_US, DEFAULT_GPIO_CHIP, DEFAULT_TRIGGER_PIN,
    SPEED_OF_SOUND_CM_PER_US,
};

/// Physical wiring of an ultrasonic transducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwarePins {
    /// GPIO line driving the trigger input.
    #[serde(default = "default_trigger_pin")]
    pub trigger_pin: u32,
    /// GPIO line reading the echo output.
    #[serde(default = "default_echo_pin")]
    pub echo_pin: u32,
    /// Character device of the GPIO controller (Linux hosts only).
    #[serde(default = "default_gpio_chip")]
    pub gpio_chip: String,
}

impl Default for HardwarePins {
    fn default() -> Self {
        Self {
            trigger_pin: default_trigger_pin(),
            echo_pin: default_echo_pin(),
            gpio_chip: default_gpio_chip(),
        }
    }
}

/// Which driver implementation to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SensorVariant {
    /// Statistical simulator.  `seed: None` seeds from OS entropy.
    Simulated {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Pulse-echo ultrasonic transducer on real pins.
    Hardware(HardwarePins),
}

impl Default for SensorVariant {
    fn default() -> Self {
        Self::Simulated { seed: None }
    }
}

impl std::fmt::Display for SensorVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated { seed: Some(seed) } => write!(f, "simulated (seed {seed})"),
            Self::Simulated { seed: None } => write!(f, "simulated (entropy seed)"),
            Self::Hardware(pins) => write!(
                f,
                "hardware (trigger {}, echo {}, {})",
                pins.trigger_pin, pins.echo_pin, pins.gpio_chip
            ),
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangingConfig {
    /// Upper bound on the echo wait, in microseconds.
    #[serde(default = "default_echo_timeout_us")]
    pub echo_timeout_us: u32,

    /// Speed of sound used for the time-to-distance conversion.
    #[serde(default = "default_speed_of_sound")]
    pub speed_of_sound_cm_per_us: f32,

    // Must stay last: TOML tables follow scalar keys.
    #[serde(default)]
    pub variant: SensorVariant,
}

fn default_trigger_pin() -> u32 {
    DEFAULT_TRIGGER_PIN
}
fn default_echo_pin() -> u32 {
    DEFAULT_ECHO_PIN
}
fn default_gpio_chip() -> String {
    DEFAULT_GPIO_CHIP.to_string()
}
fn default_echo_timeout_us() -> u32 {
    DEFAULT_ECHO_TIMEOUT_US
}
fn default_speed_of_sound() -> f32 {
    SPEED_OF_SOUND_CM_PER_US
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            echo_timeout_us: default_echo_timeout_us(),
            speed_of_sound_cm_per_us: default_speed_of_sound(),
            variant: SensorVariant::default(),
        }
    }
}

impl RangingConfig {
    /// Check the values a driver cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`RangingError::InvalidConfig`] for a zero timeout, a
    /// non-positive speed of sound, or a trigger/echo pin collision.
    pub fn validate(&self) -> Result<(), RangingError> {
        if self.echo_timeout_us == 0 {
            return Err(RangingError::InvalidConfig(
                "echo_timeout_us must be greater than zero".to_string(),
            ));
        }
        if !self.speed_of_sound_cm_per_us.is_finite() || self.speed_of_sound_cm_per_us <= 0.0 {
            return Err(RangingError::InvalidConfig(format!(
                "speed_of_sound_cm_per_us must be positive, got {}",
                self.speed_of_sound_cm_per_us
            )));
        }
        if let SensorVariant::Hardware(pins) = &self.variant
            && pins.trigger_pin == pins.echo_pin
        {
            return Err(RangingError::InvalidConfig(format!(
                "trigger and echo share pin {}",
                pins.trigger_pin
            )));
        }
        Ok(())
    }
}
