//! Per-run tally of readings and how they are printed.

use colored::Colorize;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use rangefinder_types::DistanceReading;

/// One JSON output line.
#[derive(Debug, Serialize)]
pub struct SampleLine<'a> {
    pub seq: u32,
    pub sensor: &'a str,
    pub elapsed_ms: u64,
    pub reading: DistanceReading,
}

/// Running statistics over a sampling session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub valid: u32,
    pub no_echo: u32,
    pub out_of_range: u32,
    pub min_cm: Option<f32>,
    pub max_cm: Option<f32>,
    sum_cm: f64,
}

impl Summary {
    pub fn record(&mut self, reading: &DistanceReading) {
        match *reading {
            DistanceReading::Valid { cm } => {
                self.valid += 1;
                self.sum_cm += f64::from(cm);
                self.min_cm = Some(self.min_cm.map_or(cm, |m| m.min(cm)));
                self.max_cm = Some(self.max_cm.map_or(cm, |m| m.max(cm)));
            }
            DistanceReading::NoEcho => self.no_echo += 1,
            DistanceReading::OutOfRange { .. } => self.out_of_range += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.valid + self.no_echo + self.out_of_range
    }

    /// Mean of the valid readings.
    pub fn mean_cm(&self) -> Option<f32> {
        (self.valid > 0).then(|| (self.sum_cm / f64::from(self.valid)) as f32)
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut line = serializer.serialize_struct("Summary", 6)?;
        line.serialize_field("valid", &self.valid)?;
        line.serialize_field("no_echo", &self.no_echo)?;
        line.serialize_field("out_of_range", &self.out_of_range)?;
        line.serialize_field("min_cm", &self.min_cm)?;
        line.serialize_field("max_cm", &self.max_cm)?;
        line.serialize_field("mean_cm", &self.mean_cm())?;
        line.end()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} readings: {} valid, {} no echo, {} out of range",
            self.total(),
            self.valid,
            self.no_echo,
            self.out_of_range
        )?;
        if let (Some(min), Some(max), Some(mean)) = (self.min_cm, self.max_cm, self.mean_cm()) {
            write!(f, " | min {min:.2} cm, max {max:.2} cm, mean {mean:.2} cm")?;
        }
        Ok(())
    }
}

/// Human-readable line for one reading.
pub fn format_text(seq: u32, reading: &DistanceReading) -> String {
    let body = reading.to_string();
    let body = if reading.is_valid() {
        body.green()
    } else {
        body.yellow()
    };
    format!("  [{seq:>4}] {body}")
}
