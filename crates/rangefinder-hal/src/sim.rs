//! Statistical ranging simulator for running consumers without hardware.
//!
//! [`SimulatedRangingDriver`] keeps a persistent *baseline* distance and
//! perturbs it on every call:
//!
//! | Step | Behaviour |
//! |---|---|
//! | Obstacle event | 5 % of calls reset the baseline to an integer in 10–59 cm. |
//! | Drift | Otherwise the baseline moves by `k × 0.3` cm, `k ∈ [-5, 5]`. |
//! | Clamp | Baseline is held in [8, 200] cm and persisted. |
//! | Noise | `(a + b) × 0.1` cm with `a, b ∈ [-10, 10]`. |
//! | Output | `clamp(baseline + noise, 8, 400)` cm. |
//!
//! The noise term is a sum of two uniform draws (triangular, ±2 cm), a cheap
//! stand-in for Gaussian sensor noise that downstream filters are tuned
//! against.  It is not a true normal distribution.
//!
//! The simulator never reports [`DistanceReading::NoEcho`] or
//! [`DistanceReading::OutOfRange`]; failure paths must be exercised through
//! the hardware driver or a dedicated fault-injecting double.
//!
//! # Example
//!
//! ```rust
//! use rangefinder_hal::{RangingDriver, SimulatedRangingDriver};
//!
//! let mut sim = SimulatedRangingDriver::with_seed("front_sonar", 7);
//! sim.initialize().unwrap();
//!
//! let cm = sim.measure_distance().unwrap().centimeters().unwrap();
//! assert!((8.0..=400.0).contains(&cm));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use rangefinder_types::constants::{
    MOCK_BASELINE_INITIAL_CM, MOCK_BASELINE_MAX_CM, MOCK_BASELINE_MIN_CM, MOCK_OUTPUT_MAX_CM,
};
use rangefinder_types::{DistanceReading, RangingError};

use crate::ranging::RangingDriver;

/// Chance of an obstacle-appearance event, in percent.
const OBSTACLE_EVENT_PERCENT: u32 = 5;
const DRIFT_STEP_CM: f32 = 0.3;
const NOISE_STEP_CM: f32 = 0.1;

/// Simulated distance sensor: a bounded random walk with occasional jumps.
///
/// Each instance owns its baseline and RNG, so independent simulators can
/// run side by side.  Two instances built with the same seed produce the
/// same sequence.
#[derive(Debug, Clone)]
pub struct SimulatedRangingDriver {
    id: String,
    rng: Option<ChaCha8Rng>,
    baseline: f32,
    obstacle_events: u64,
}

impl SimulatedRangingDriver {
    /// Create an unseeded simulator.  [`initialize`][RangingDriver::initialize]
    /// seeds it from OS entropy.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rng: None,
            baseline: MOCK_BASELINE_INITIAL_CM,
            obstacle_events: 0,
        }
    }

    /// Create a simulator with a fixed seed for reproducible sequences.
    pub fn with_seed(id: impl Into<String>, seed: u64) -> Self {
        Self {
            rng: Some(ChaCha8Rng::seed_from_u64(seed)),
            ..Self::new(id)
        }
    }

    /// Current baseline in centimetres.
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Number of obstacle-appearance events so far.
    pub fn obstacle_events(&self) -> u64 {
        self.obstacle_events
    }

    /// Whether the RNG has been seeded yet.
    pub fn is_seeded(&self) -> bool {
        self.rng.is_some()
    }

    fn next_reading(&mut self) -> f32 {
        let rng = self.rng.get_or_insert_with(ChaCha8Rng::from_entropy);

        if rng.gen_range(0..100_u32) < OBSTACLE_EVENT_PERCENT {
            self.baseline = rng.gen_range(10..60_i32) as f32;
            self.obstacle_events += 1;
            debug!(sensor = %self.id, baseline_cm = self.baseline, "simulated obstacle appeared");
        } else {
            self.baseline += rng.gen_range(-5..=5_i32) as f32 * DRIFT_STEP_CM;
        }
        self.baseline = self
            .baseline
            .clamp(MOCK_BASELINE_MIN_CM, MOCK_BASELINE_MAX_CM);

        let noise = (rng.gen_range(-10..=10_i32) + rng.gen_range(-10..=10_i32)) as f32 * NOISE_STEP_CM;
        (self.baseline + noise).clamp(MOCK_BASELINE_MIN_CM, MOCK_OUTPUT_MAX_CM)
    }
}

impl RangingDriver for SimulatedRangingDriver {
    fn id(&self) -> &str {
        &self.id
    }

    fn initialize(&mut self) -> Result<(), RangingError> {
        if self.rng.is_none() {
            self.rng = Some(ChaCha8Rng::from_entropy());
            info!(sensor = %self.id, "simulated ranging driver seeded from entropy");
        }
        Ok(())
    }

    fn measure_distance(&mut self) -> Result<DistanceReading, RangingError> {
        let cm = self.next_reading();
        debug!(sensor = %self.id, cm, baseline_cm = self.baseline, "simulated reading");
        Ok(DistanceReading::Valid { cm })
    }
}
