//! Rig configuration tables.
//!
//! One TOML document describes the whole rig. Every section is optional and
//! defaults to the values the firmware was commissioned with, so an empty
//! file yields a working configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::*;
use crate::hal::DriverSettings;

// ─── Axis Table ─────────────────────────────────────────────────────

/// Static configuration of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    /// Top speed [steps/s]. Pumps run at exactly this speed.
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Ramp acceleration [steps/s²].
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    /// Driver microstep resolution.
    #[serde(default = "default_microsteps")]
    pub microsteps: u16,
    /// Driver hold current register (0..=31).
    #[serde(default = "default_hold_current")]
    pub hold_current: u8,
    /// Driver RMS run current [mA].
    #[serde(default = "default_run_current")]
    pub run_current_ma: u16,
}

fn default_max_speed() -> f32 {
    DEFAULT_MAX_SPEED
}
fn default_acceleration() -> f32 {
    DEFAULT_ACCELERATION
}
fn default_microsteps() -> u16 {
    4
}
fn default_hold_current() -> u8 {
    1
}
fn default_run_current() -> u16 {
    DEFAULT_RUN_CURRENT_MA
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            max_speed: default_max_speed(),
            acceleration: default_acceleration(),
            microsteps: default_microsteps(),
            hold_current: default_hold_current(),
            run_current_ma: default_run_current(),
        }
    }
}

impl AxisConfig {
    /// Commissioned carriage settings.
    pub const fn carriage() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            acceleration: DEFAULT_CARRIAGE_ACCELERATION,
            microsteps: 4,
            hold_current: 15,
            run_current_ma: DEFAULT_RUN_CURRENT_MA,
        }
    }

    /// Commissioned band settings.
    pub const fn band() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            acceleration: DEFAULT_ACCELERATION,
            microsteps: 16,
            hold_current: 10,
            run_current_ma: DEFAULT_RUN_CURRENT_MA,
        }
    }

    /// Commissioned pump settings.
    pub const fn pump() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            acceleration: DEFAULT_ACCELERATION,
            microsteps: 4,
            hold_current: 1,
            run_current_ma: DEFAULT_RUN_CURRENT_MA,
        }
    }

    /// Driver settings derived from this entry.
    pub const fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            microsteps: self.microsteps,
            run_current_ma: self.run_current_ma,
            hold_current: self.hold_current,
        }
    }

    fn check(&self, index: usize) -> Result<(), ConfigError> {
        let fail = |what: &str| {
            Err(ConfigError::ValidationError(format!("axes[{index}]: {what}")))
        };
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return fail("max_speed must be > 0");
        }
        if !(self.acceleration.is_finite() && self.acceleration > 0.0) {
            return fail("acceleration must be > 0");
        }
        if !self.microsteps.is_power_of_two() || self.microsteps > 256 {
            return fail("microsteps must be a power of two <= 256");
        }
        if self.hold_current > 31 {
            return fail("hold_current must be in 0..=31");
        }
        if self.run_current_ma == 0 {
            return fail("run_current_ma must be > 0");
        }
        Ok(())
    }
}

/// Commissioned table: carriage, band, pumps 1..=10.
pub fn default_axes() -> heapless::Vec<AxisConfig, AXIS_COUNT> {
    let mut axes = heapless::Vec::new();
    for index in 0..AXIS_COUNT {
        let entry = match index {
            CARRIAGE_AXIS => AxisConfig::carriage(),
            BAND_AXIS => AxisConfig::band(),
            _ => AxisConfig::pump(),
        };
        // Capacity equals AXIS_COUNT.
        let _ = axes.push(entry);
    }
    axes
}

// ─── Sections ───────────────────────────────────────────────────────

/// Host bus endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Slave address answered on the bus.
    #[serde(default = "default_bus_address")]
    pub address: u8,
    /// UDP endpoint of the bus bridge.
    #[serde(default = "default_bus_bind")]
    pub bind: String,
}

fn default_bus_address() -> u8 {
    BUS_ADDRESS
}
fn default_bus_bind() -> String {
    DEFAULT_BUS_BIND.to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address: default_bus_address(),
            bind: default_bus_bind(),
        }
    }
}

/// Carriage scaling and loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionConfig {
    /// Carriage steps per millimetre.
    #[serde(default = "default_steps_per_mm")]
    pub steps_per_mm: i64,
    /// Dispatch tick pacing [µs]. Zero spins without sleeping.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_us: u64,
}

fn default_steps_per_mm() -> i64 {
    DEFAULT_STEPS_PER_MM
}
fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_US
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: default_steps_per_mm(),
            tick_interval_us: default_tick_interval(),
        }
    }
}

/// Homing search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomingConfig {
    /// Constant search speed [steps/s]; the sign is the search direction.
    #[serde(default = "default_homing_speed")]
    pub speed: f32,
    /// Absolute poll bound [ms].
    #[serde(default = "default_homing_timeout")]
    pub timeout_ms: u64,
}

fn default_homing_speed() -> f32 {
    DEFAULT_HOMING_SPEED
}
fn default_homing_timeout() -> u64 {
    DEFAULT_HOMING_TIMEOUT_MS
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            speed: default_homing_speed(),
            timeout_ms: default_homing_timeout(),
        }
    }
}

impl HomingConfig {
    /// Poll bound as a `Duration`.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Band transport parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    /// Unload run time before the decelerated stop [ms].
    #[serde(default = "default_band_timeout")]
    pub timeout_ms: u64,
    /// Sensor sampling interval while loading [ms].
    #[serde(default = "default_load_interval")]
    pub load_sample_interval_ms: u64,
}

fn default_band_timeout() -> u64 {
    DEFAULT_BAND_TIMEOUT_MS
}
fn default_load_interval() -> u64 {
    DEFAULT_LOAD_SAMPLE_INTERVAL_MS
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_band_timeout(),
            load_sample_interval_ms: default_load_interval(),
        }
    }
}

impl BandConfig {
    /// Unload run time.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load sampling interval.
    #[inline]
    pub fn load_sample_interval(&self) -> Duration {
        Duration::from_millis(self.load_sample_interval_ms)
    }
}

/// Object detector thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    /// Arrival threshold [cm] (inclusive).
    #[serde(default = "default_arrived")]
    pub arrived_cm: f32,
    /// Loss threshold [cm] (inclusive).
    #[serde(default = "default_lost")]
    pub lost_cm: f32,
    /// Movement threshold relative to the arrival reference [cm].
    #[serde(default = "default_moved")]
    pub moved_cm: f32,
    /// Consecutive samples per transition.
    #[serde(default = "default_confirm")]
    pub confirm_samples: u8,
    /// Idle monitor sampling interval [ms].
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_ms: u64,
}

fn default_arrived() -> f32 {
    DEFAULT_ARRIVED_CM
}
fn default_lost() -> f32 {
    DEFAULT_LOST_CM
}
fn default_moved() -> f32 {
    DEFAULT_MOVED_CM
}
fn default_confirm() -> u8 {
    DEFAULT_CONFIRM_SAMPLES
}
fn default_monitor_interval() -> u64 {
    DEFAULT_MONITOR_INTERVAL_MS
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            arrived_cm: default_arrived(),
            lost_cm: default_lost(),
            moved_cm: default_moved(),
            confirm_samples: default_confirm(),
            monitor_interval_ms: default_monitor_interval(),
        }
    }
}

impl DetectorConfig {
    /// Idle monitor interval.
    #[inline]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}

// ─── Rig Config ─────────────────────────────────────────────────────

/// Complete rig configuration.
///
/// ```toml
/// [motion]
/// steps_per_mm = 17
///
/// [detector]
/// arrived_cm = 5.0
///
/// [[axes]]
/// acceleration = 500.0
/// hold_current = 15
/// # ... 12 entries in total
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub homing: HomingConfig,
    #[serde(default)]
    pub band: BandConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Carriage, band, then pumps 1..=10.
    #[serde(default = "default_axes")]
    pub axes: heapless::Vec<AxisConfig, AXIS_COUNT>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            bus: BusConfig::default(),
            motion: MotionConfig::default(),
            homing: HomingConfig::default(),
            band: BandConfig::default(),
            detector: DetectorConfig::default(),
            axes: default_axes(),
        }
    }
}

impl RigConfig {
    /// Configuration entry for a registry index.
    #[inline]
    pub fn axis(&self, index: usize) -> Option<&AxisConfig> {
        self.axes.get(index)
    }
}

impl Validate for RigConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.axes.len() != AXIS_COUNT {
            return Err(ConfigError::ValidationError(format!(
                "expected {AXIS_COUNT} axes (carriage, band, {PUMP_COUNT} pumps), got {}",
                self.axes.len()
            )));
        }
        for (index, axis) in self.axes.iter().enumerate() {
            axis.check(index)?;
        }

        if self.motion.steps_per_mm < 1 {
            return Err(ConfigError::ValidationError(
                "motion.steps_per_mm must be >= 1".to_string(),
            ));
        }
        if !self.homing.speed.is_finite() || self.homing.speed == 0.0 {
            return Err(ConfigError::ValidationError(
                "homing.speed must be non-zero".to_string(),
            ));
        }
        if self.homing.timeout_ms == 0 || self.band.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "homing.timeout_ms and band.timeout_ms must be > 0".to_string(),
            ));
        }

        let d = &self.detector;
        if !(d.arrived_cm > 0.0 && d.arrived_cm < d.lost_cm) {
            return Err(ConfigError::ValidationError(format!(
                "detector thresholds must satisfy 0 < arrived_cm ({}) < lost_cm ({})",
                d.arrived_cm, d.lost_cm
            )));
        }
        if !(d.moved_cm > 0.0) {
            return Err(ConfigError::ValidationError(
                "detector.moved_cm must be > 0".to_string(),
            ));
        }
        if d.confirm_samples == 0 {
            return Err(ConfigError::ValidationError(
                "detector.confirm_samples must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
