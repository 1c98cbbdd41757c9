//! `rangefinder-cli` – bench tool for the ranging drivers.
//!
//! This binary:
//!
//! 1. Loads `~/.rangefinder/config.toml` (or `--config`), applies
//!    `RANGEFINDER_*` environment overrides, then command-line flags.
//! 2. Builds the configured driver (simulated, or hardware when compiled
//!    with the `gpio-cdev` feature) and initialises it.
//! 3. Takes `--samples` readings strictly one after another, printing each
//!    as coloured text or a JSON line, and finishes with a summary.
//! 4. Stops early on **Ctrl-C**, between readings only; a measurement in
//!    flight always runs to completion.

mod config;
#[cfg(feature = "gpio-cdev")]
mod gpio;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rangefinder_hal::{RangingDriver, select_driver};
use rangefinder_types::{RangingError, SensorVariant};

use crate::config::Config;
use crate::report::{SampleLine, Summary};

/// Take distance readings from a simulated or ultrasonic ranging sensor.
#[derive(Parser, Debug)]
#[command(name = "rangefinder", version)]
struct Args {
    /// Config file (default: ~/.rangefinder/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of readings to take.
    #[arg(short = 'n', long, default_value_t = 10)]
    samples: u32,

    /// Pause between readings, overriding the config.
    #[arg(short, long)]
    period_ms: Option<u64>,

    /// Use the simulator regardless of the configured variant.
    #[arg(long)]
    simulate: bool,

    /// Use the simulator with a fixed seed (implies --simulate).
    #[arg(long)]
    seed: Option<u64>,

    /// Print one JSON object per reading instead of text.
    #[arg(long)]
    json: bool,

    /// Write a default config file to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

impl Args {
    fn apply(&self, cfg: &mut Config) {
        if let Some(seed) = self.seed {
            cfg.ranging.variant = SensorVariant::Simulated { seed: Some(seed) };
        } else if self.simulate && !matches!(cfg.ranging.variant, SensorVariant::Simulated { .. })
        {
            cfg.ranging.variant = SensorVariant::Simulated { seed: None };
        }
        if let Some(period) = self.period_ms {
            cfg.sample_period_ms = period;
        }
    }
}

/// `RUST_LOG` directives, or `info` when unset or unparseable.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "info"); RANGEFINDER_LOG_FORMAT=json emits
    // JSON.  Logs go to stderr so stdout stays clean for readings.
    let env_filter = log_filter(std::env::var("RUST_LOG").ok());

    if std::env::var("RANGEFINDER_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let args = Args::parse();
    let path = args.config.clone().unwrap_or_else(config::config_path);

    if args.init_config {
        return init_config(&path);
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => {
            info!(path = %path.display(), "config loaded");
            cfg
        }
        Ok(None) => {
            info!(path = %path.display(), "no config file; using defaults");
            default_config()
        }
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            eprintln!("  Using default configuration.");
            default_config()
        }
    };
    args.apply(&mut cfg);

    // ── Shutdown flag ─────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; sampling can only end after --samples readings");
    }

    // ── Driver ────────────────────────────────────────────────────────────
    #[cfg(feature = "gpio-cdev")]
    let driver = select_driver(
        &cfg.sensor_id,
        &cfg.ranging,
        |pins: &rangefinder_types::HardwarePins, ranging: &rangefinder_types::RangingConfig| {
            gpio::open(&cfg.sensor_id, pins, ranging)
        },
    );
    #[cfg(not(feature = "gpio-cdev"))]
    let driver = select_driver(
        &cfg.sensor_id,
        &cfg.ranging,
        rangefinder_hal::selector::hardware_unsupported,
    );

    let mut driver = match driver {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("{}: {}", "Driver error".red(), e);
            if matches!(e, RangingError::Unsupported(_)) {
                eprintln!(
                    "  Rebuild with `{}` or pass `{}`.",
                    "--features gpio-cdev".bold(),
                    "--simulate".bold()
                );
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = driver.initialize() {
        eprintln!("{}: {}", "Initialisation failed".red(), e);
        return ExitCode::FAILURE;
    }

    if !args.json {
        println!(
            "  {} {} – {}",
            "Ranging with".bold(),
            driver.id().bold().cyan(),
            cfg.ranging.variant
        );
    }

    let period = Duration::from_millis(cfg.sample_period_ms);
    match run_session(&mut driver, args.samples, period, args.json, &shutdown) {
        Ok(summary) => {
            if args.json {
                match serde_json::to_string(&summary) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "failed to serialise summary"),
                }
            } else {
                println!("  {}", summary.to_string().bold());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Measurement failed".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn default_config() -> Config {
    let mut cfg = Config::default();
    config::apply_env_overrides(&mut cfg);
    cfg
}

fn init_config(path: &std::path::Path) -> ExitCode {
    if path.exists() {
        println!("  Config already exists at {}", path.display().to_string().bold());
        return ExitCode::SUCCESS;
    }
    match config::save_to(&Config::default(), path) {
        Ok(()) => {
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sampling loop
// ─────────────────────────────────────────────────────────────────────────────

/// Take up to `samples` readings, one at a time, `period` apart.
///
/// `shutdown` is checked between readings only.
fn run_session<D: RangingDriver>(
    driver: &mut D,
    samples: u32,
    period: Duration,
    json: bool,
    shutdown: &AtomicBool,
) -> Result<Summary, RangingError> {
    let started = Instant::now();
    let mut summary = Summary::default();

    for seq in 1..=samples {
        if shutdown.load(Ordering::SeqCst) {
            info!(taken = summary.total(), "sampling interrupted");
            break;
        }

        let reading = driver.measure_distance()?;
        summary.record(&reading);

        if json {
            let line = SampleLine {
                seq,
                sensor: driver.id(),
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                reading,
            };
            match serde_json::to_string(&line) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "failed to serialise reading"),
            }
        } else {
            println!("{}", report::format_text(seq, &reading));
        }

        if seq < samples {
            pause(period, shutdown);
        }
    }

    Ok(summary)
}

/// Sleep for `period`, waking early if `shutdown` is set.
fn pause(period: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + period;
    while !shutdown.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(50)));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
