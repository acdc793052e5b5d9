//! System-wide constants for the MIXmate workspace.
//!
//! Single source of truth for axis counts, wire constants and the default
//! tuning values used when no configuration file overrides them.

use static_assertions::const_assert_eq;

/// Number of pump axes on the rig.
pub const PUMP_COUNT: usize = 10;

/// Total number of axes: carriage + band + pumps.
pub const AXIS_COUNT: usize = 2 + PUMP_COUNT;

/// Registry index of the linear carriage axis.
pub const CARRIAGE_AXIS: usize = 0;

/// Registry index of the conveyor band axis.
pub const BAND_AXIS: usize = 1;

/// Registry index of pump 1. Pump `n` lives at `PUMP_AXIS_BASE + n - 1`.
pub const PUMP_AXIS_BASE: usize = 2;

const_assert_eq!(PUMP_AXIS_BASE + PUMP_COUNT, AXIS_COUNT);

// ─── Bus ────────────────────────────────────────────────────────────

/// Fixed slave address on the host bus.
pub const BUS_ADDRESS: u8 = 0x13;

/// Single-byte reply to any read request that does not follow a Status command.
pub const ACK_BYTE: u8 = 0x06;

/// Length of the status response frame.
pub const STATUS_FRAME_LEN: usize = 7;

/// Number of parameter bytes carried by Move and Pump frames.
pub const PARAM_LEN: usize = 2;

/// Default UDP endpoint of the bus bridge.
pub const DEFAULT_BUS_BIND: &str = "127.0.0.1:4713";

// ─── Motion ─────────────────────────────────────────────────────────

/// Carriage steps per millimetre.
pub const DEFAULT_STEPS_PER_MM: i64 = 17;

/// Relative target used for "run until told otherwise" band moves.
pub const CONTINUOUS_STEPS: i64 = 100_000_000;

/// Default dispatch tick pacing [µs].
pub const DEFAULT_TICK_INTERVAL_US: u64 = 200;

/// Default axis top speed [steps/s].
pub const DEFAULT_MAX_SPEED: f32 = 2000.0;

/// Default carriage acceleration [steps/s²].
pub const DEFAULT_CARRIAGE_ACCELERATION: f32 = 500.0;

/// Default band and pump acceleration [steps/s²].
pub const DEFAULT_ACCELERATION: f32 = 1000.0;

/// Default driver RMS run current [mA].
pub const DEFAULT_RUN_CURRENT_MA: u16 = 1200;

// ─── Homing ─────────────────────────────────────────────────────────

/// Constant homing speed [steps/s]. The sign fixes the search direction.
pub const DEFAULT_HOMING_SPEED: f32 = -400.0;

/// Absolute bound on the blocking homing poll [ms].
pub const DEFAULT_HOMING_TIMEOUT_MS: u64 = 200_000;

// ─── Band ───────────────────────────────────────────────────────────

/// Maximum unload run time before the band is stopped [ms].
pub const DEFAULT_BAND_TIMEOUT_MS: u64 = 10_000;

/// Sampling interval while a load is waiting for the object [ms].
pub const DEFAULT_LOAD_SAMPLE_INTERVAL_MS: u64 = 100;

// ─── Object detection ───────────────────────────────────────────────

/// Sensor reading returned when no echo was received.
pub const INVALID_DISTANCE_CM: f32 = -1.0;

/// Object counts as arrived at or below this distance [cm].
pub const DEFAULT_ARRIVED_CM: f32 = 5.0;

/// Object counts as lost at or above this distance [cm].
pub const DEFAULT_LOST_CM: f32 = 12.0;

/// Displacement from the arrival reference that counts as movement [cm].
pub const DEFAULT_MOVED_CM: f32 = 2.0;

/// Consecutive samples required for any detector transition.
pub const DEFAULT_CONFIRM_SAMPLES: u8 = 3;

/// Sampling interval of the idle object monitor [ms].
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 200;
