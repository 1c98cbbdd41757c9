//! Configuration Vault – reads/writes `~/.rangefinder/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use rangefinder_types::constants::DEFAULT_SAMPLE_PERIOD_MS;
use rangefinder_types::{HardwarePins, RangingConfig, SensorVariant};

/// Persisted bench configuration stored in `~/.rangefinder/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier reported by the driver and in every output line.
    #[serde(default = "default_sensor_id")]
    pub sensor_id: String,

    /// Pause between consecutive readings.
    #[serde(default = "default_sample_period_ms")]
    pub sample_period_ms: u64,

    /// Driver selection and timing.
    #[serde(default)]
    pub ranging: RangingConfig,
}

fn default_sensor_id() -> String {
    "front_sonar".to_string()
}
fn default_sample_period_ms() -> u64 {
    DEFAULT_SAMPLE_PERIOD_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_id: default_sensor_id(),
            sample_period_ms: default_sample_period_ms(),
            ranging: RangingConfig::default(),
        }
    }
}

/// Return the path to `~/.rangefinder/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rangefinder").join("config.toml")
}

/// Load the config from a specific path, applying `RANGEFINDER_*`
/// overrides.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `RANGEFINDER_*` environment variable overrides to `cfg`.
///
/// | Variable | Effect |
/// |---|---|
/// | `RANGEFINDER_VARIANT` | `simulated` or `hardware` |
/// | `RANGEFINDER_SEED` | simulator seed (simulated variant only) |
/// | `RANGEFINDER_TRIGGER_PIN` | trigger line (hardware variant only) |
/// | `RANGEFINDER_ECHO_PIN` | echo line (hardware variant only) |
/// | `RANGEFINDER_TIMEOUT_US` | `ranging.echo_timeout_us` |
/// | `RANGEFINDER_PERIOD_MS` | `sample_period_ms` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_from(cfg, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides_from<F>(cfg: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("RANGEFINDER_VARIANT") {
        match v.trim().to_ascii_lowercase().as_str() {
            "simulated" | "mock" => {
                if !matches!(cfg.ranging.variant, SensorVariant::Simulated { .. }) {
                    cfg.ranging.variant = SensorVariant::Simulated { seed: None };
                }
            }
            "hardware" => {
                if !matches!(cfg.ranging.variant, SensorVariant::Hardware(_)) {
                    cfg.ranging.variant = SensorVariant::Hardware(HardwarePins::default());
                }
            }
            _ => {}
        }
    }
    if let Some(v) = lookup("RANGEFINDER_SEED")
        && let Ok(parsed) = v.trim().parse::<u64>()
        && let SensorVariant::Simulated { seed } = &mut cfg.ranging.variant
    {
        *seed = Some(parsed);
    }
    if let SensorVariant::Hardware(pins) = &mut cfg.ranging.variant {
        if let Some(v) = lookup("RANGEFINDER_TRIGGER_PIN")
            && let Ok(pin) = v.trim().parse::<u32>()
        {
            pins.trigger_pin = pin;
        }
        if let Some(v) = lookup("RANGEFINDER_ECHO_PIN")
            && let Ok(pin) = v.trim().parse::<u32>()
        {
            pins.echo_pin = pin;
        }
    }
    if let Some(v) = lookup("RANGEFINDER_TIMEOUT_US")
        && let Ok(timeout) = v.trim().parse::<u32>()
    {
        cfg.ranging.echo_timeout_us = timeout;
    }
    if let Some(v) = lookup("RANGEFINDER_PERIOD_MS")
        && let Ok(period) = v.trim().parse::<u64>()
    {
        cfg.sample_period_ms = period;
    }
}

/// Save the config to a specific path, creating the parent directory if
/// necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Owner-only directory (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
