//! Config-driven driver selection.
//!
//! [`select_driver`] turns a [`RangingConfig`] into a ready-to-use driver.
//! The simulator is built here; the hardware driver needs platform pin
//! objects, so the caller supplies a factory that opens them.
//!
//! # Example
//!
//! ```rust
//! use rangefinder_hal::selector::{hardware_unsupported, select_driver};
//! use rangefinder_hal::RangingDriver;
//! use rangefinder_types::{RangingConfig, SensorVariant};
//!
//! let config = RangingConfig {
//!     variant: SensorVariant::Simulated { seed: Some(1) },
//!     ..RangingConfig::default()
//! };
//! let mut driver = select_driver("front_sonar", &config, hardware_unsupported).unwrap();
//! driver.initialize().unwrap();
//! assert!(driver.measure_distance().unwrap().is_valid());
//! ```

use tracing::info;

use rangefinder_types::{DistanceReading, HardwarePins, RangingConfig, RangingError, SensorVariant};

use crate::ranging::RangingDriver;
use crate::sim::SimulatedRangingDriver;

/// Either driver variant behind one concrete type.
pub enum AnyRangingDriver {
    Simulated(SimulatedRangingDriver),
    Hardware(Box<dyn RangingDriver>),
}

impl AnyRangingDriver {
    /// `"simulated"` or `"hardware"`.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Simulated(_) => "simulated",
            Self::Hardware(_) => "hardware",
        }
    }

    fn inner(&mut self) -> &mut (dyn RangingDriver + 'static) {
        match self {
            Self::Simulated(sim) => sim,
            Self::Hardware(hw) => hw.as_mut(),
        }
    }
}

impl std::fmt::Debug for AnyRangingDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyRangingDriver")
            .field("variant", &self.variant_name())
            .field("id", &self.id())
            .finish()
    }
}

impl RangingDriver for AnyRangingDriver {
    fn id(&self) -> &str {
        match self {
            Self::Simulated(sim) => sim.id(),
            Self::Hardware(hw) => hw.id(),
        }
    }

    fn initialize(&mut self) -> Result<(), RangingError> {
        self.inner().initialize()
    }

    fn measure_distance(&mut self) -> Result<DistanceReading, RangingError> {
        self.inner().measure_distance()
    }
}

/// Build the driver named by `config.variant`.
///
/// `hardware` is only called for [`SensorVariant::Hardware`]; pass
/// [`hardware_unsupported`] on platforms without GPIO access.
///
/// # Errors
///
/// Returns [`RangingError::InvalidConfig`] if the config fails validation,
/// or whatever the hardware factory returns.
pub fn select_driver<F>(
    id: &str,
    config: &RangingConfig,
    hardware: F,
) -> Result<AnyRangingDriver, RangingError>
where
    F: FnOnce(&HardwarePins, &RangingConfig) -> Result<Box<dyn RangingDriver>, RangingError>,
{
    config.validate()?;
    info!(sensor = id, variant = %config.variant, "selecting ranging driver");

    match &config.variant {
        SensorVariant::Simulated { seed: Some(seed) } => Ok(AnyRangingDriver::Simulated(
            SimulatedRangingDriver::with_seed(id, *seed),
        )),
        SensorVariant::Simulated { seed: None } => {
            Ok(AnyRangingDriver::Simulated(SimulatedRangingDriver::new(id)))
        }
        SensorVariant::Hardware(pins) => hardware(pins, config).map(AnyRangingDriver::Hardware),
    }
}

/// Hardware factory for builds without GPIO support.
///
/// # Errors
///
/// Always returns [`RangingError::Unsupported`].
pub fn hardware_unsupported(
    pins: &HardwarePins,
    _config: &RangingConfig,
) -> Result<Box<dyn RangingDriver>, RangingError> {
    Err(RangingError::Unsupported(format!(
        "no GPIO backend in this build for trigger {} / echo {}",
        pins.trigger_pin, pins.echo_pin
    )))
}
