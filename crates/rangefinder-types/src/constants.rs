//! Physical and tuning constants shared by the drivers.

/// Speed of sound in dry air at 20 °C, in centimetres per microsecond.
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Upper bound on the echo wait (≈ 5 m round trip).
pub const DEFAULT_ECHO_TIMEOUT_US: u32 = 30_000;

/// Width of the trigger pulse that fires one ranging cycle.
pub const TRIGGER_PULSE_US: u32 = 10;

/// Low hold on the trigger line before the pulse.
pub const TRIGGER_SETTLE_US: u32 = 2;

/// Transducer settle time after pin setup.
pub const SETTLE_DELAY_MS: u32 = 50;

/// Plausible band of the ultrasonic transducer (inclusive).
pub const HARDWARE_MIN_CM: f32 = 2.0;
pub const HARDWARE_MAX_CM: f32 = 400.0;

pub const MOCK_BASELINE_INITIAL_CM: f32 = 100.0;
pub const MOCK_BASELINE_MIN_CM: f32 = 8.0;
pub const MOCK_BASELINE_MAX_CM: f32 = 200.0;
pub const MOCK_OUTPUT_MAX_CM: f32 = 400.0;

/// Default wiring of the reference robot.
pub const DEFAULT_TRIGGER_PIN: u32 = 5;
pub const DEFAULT_ECHO_PIN: u32 = 18;
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 1000;
