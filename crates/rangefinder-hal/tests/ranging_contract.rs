//! Both driver variants behind the same trait, exercised the way a consumer
//! would: build from config, initialise, poll serially.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use rangefinder_hal::{
    HardwareRangingDriver, MicrosClock, RangingDriver, SimulatedRangingDriver, select_driver,
};
use rangefinder_types::{DistanceReading, HardwarePins, RangingConfig, SensorVariant};

// ─────────────────────────────────────────────────────────────────────────────
// A reflecting wall at a fixed distance
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Wall {
    now: Arc<AtomicU64>,
    trigger_high: Arc<AtomicBool>,
    fired_at: Arc<AtomicU64>,
    fired: Arc<AtomicBool>,
    round_trip_us: u64,
}

impl Wall {
    fn at_cm(cm: f32) -> Self {
        Self {
            round_trip_us: (cm * 2.0 / 0.0343).round() as u64,
            ..Self::default()
        }
    }

    fn absent() -> Self {
        Self::default()
    }
}

struct Trigger(Wall);
impl ErrorType for Trigger {
    type Error = core::convert::Infallible;
}
impl OutputPin for Trigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.0.trigger_high.swap(false, Ordering::SeqCst) {
            self.0
                .fired_at
                .store(self.0.now.load(Ordering::SeqCst), Ordering::SeqCst);
            self.0.fired.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.trigger_high.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct Echo(Wall);
impl ErrorType for Echo {
    type Error = core::convert::Infallible;
}
impl InputPin for Echo {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.0.round_trip_us == 0 || !self.0.fired.load(Ordering::SeqCst) {
            return Ok(false);
        }
        // Transducer raises echo ~100 µs after the trigger and holds it for
        // the round-trip time.
        let rise = self.0.fired_at.load(Ordering::SeqCst) + 100;
        let now = self.0.now.load(Ordering::SeqCst);
        Ok(now >= rise && now < rise + self.0.round_trip_us)
    }
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

struct Delay(Wall);
impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.0
            .now
            .fetch_add(u64::from(ns).div_ceil(1_000), Ordering::SeqCst);
    }
}

struct Clock(Wall);
impl MicrosClock for Clock {
    fn now_us(&mut self) -> u64 {
        self.0.now.fetch_add(1, Ordering::SeqCst)
    }
}

fn hardware_config() -> RangingConfig {
    RangingConfig {
        variant: SensorVariant::Hardware(HardwarePins::default()),
        ..RangingConfig::default()
    }
}

fn wall_factory(
    wall: Wall,
) -> impl FnOnce(&HardwarePins, &RangingConfig) -> Result<Box<dyn RangingDriver>, rangefinder_types::RangingError>
{
    move |_pins: &HardwarePins, config: &RangingConfig| {
        let driver: Box<dyn RangingDriver> = Box::new(
            HardwareRangingDriver::new(
                "front_sonar",
                Trigger(wall.clone()),
                Echo(wall.clone()),
                Delay(wall.clone()),
                Clock(wall),
            )
            .with_config(config),
        );
        Ok(driver)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn hardware_driver_ranges_a_wall() {
    let mut driver = select_driver("front_sonar", &hardware_config(), wall_factory(Wall::at_cm(75.0)))
        .expect("hardware driver builds");
    driver.initialize().unwrap();

    for _ in 0..5 {
        let cm = driver
            .measure_distance()
            .unwrap()
            .centimeters()
            .expect("wall is in range");
        assert!((cm - 75.0).abs() < 0.1, "got {cm}");
    }
}

#[test]
fn hardware_driver_reports_missing_wall_as_sentinel() {
    let mut driver = select_driver("front_sonar", &hardware_config(), wall_factory(Wall::absent()))
        .expect("hardware driver builds");
    driver.initialize().unwrap();

    let reading = driver.measure_distance().unwrap();
    assert_eq!(reading, DistanceReading::NoEcho);
    assert!(reading.to_sentinel_f32().is_nan());
}

#[test]
fn hardware_driver_rejects_wall_too_close() {
    let mut driver = select_driver("front_sonar", &hardware_config(), wall_factory(Wall::at_cm(1.0)))
        .expect("hardware driver builds");
    driver.initialize().unwrap();
    assert!(matches!(
        driver.measure_distance().unwrap(),
        DistanceReading::OutOfRange { .. }
    ));
}

#[test]
fn simulator_and_hardware_are_interchangeable() {
    let mut drivers: Vec<Box<dyn RangingDriver>> = vec![
        Box::new(SimulatedRangingDriver::with_seed("sim", 3)) as Box<dyn RangingDriver>,
        Box::new(
            select_driver("hw", &hardware_config(), wall_factory(Wall::at_cm(150.0))).unwrap(),
        ) as Box<dyn RangingDriver>,
    ];
    for driver in &mut drivers {
        driver.initialize().unwrap();
        let cm = driver.measure_distance().unwrap().centimeters().unwrap();
        assert!((8.0..=400.0).contains(&cm), "{} gave {cm}", driver.id());
    }
}

#[test]
fn golden_sequence_is_stable_across_construction_paths() {
    let config = RangingConfig {
        variant: SensorVariant::Simulated { seed: Some(2024) },
        ..RangingConfig::default()
    };
    let mut selected = select_driver("sim", &config, rangefinder_hal::selector::hardware_unsupported)
        .unwrap();
    let mut direct = SimulatedRangingDriver::with_seed("sim", 2024);
    selected.initialize().unwrap();
    direct.initialize().unwrap();

    for i in 0..10_000 {
        let a = selected.measure_distance().unwrap();
        let b = direct.measure_distance().unwrap();
        assert_eq!(a, b, "sequences diverged at call {i}");
    }
}

#[test]
fn configured_seed_reproduces_recorded_readings() {
    let config = RangingConfig {
        variant: SensorVariant::Simulated { seed: Some(3) },
        ..RangingConfig::default()
    };
    let mut driver = select_driver("sim", &config, rangefinder_hal::selector::hardware_unsupported)
        .unwrap();
    driver.initialize().unwrap();

    let recorded = [102.1, 100.3, 99.6, 102.6, 101.0, 101.1, 40.4, 41.0];
    for (i, want) in recorded.into_iter().enumerate() {
        let cm = driver.measure_distance().unwrap().to_sentinel_f32();
        assert!((cm - want).abs() < 1e-3, "call {i}: {cm} != {want}");
    }
}
