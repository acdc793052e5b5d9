//! Motion primitive, driver configurator and sensor traits.
//!
//! This module defines:
//! - `MotionPrimitive` - ramped and constant-speed stepping for one axis
//! - `DriverConfigurator` - one-shot stepper driver setup at start-up
//! - `DistanceSensor`, `HomeSwitch`, `Clock` - rig inputs
//! - `HalError` - start-up failures reported by collaborators

use crate::time::MonoTime;
use thiserror::Error;

/// Error types for collaborator operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver did not answer or rejected the configuration.
    #[error("Driver configuration failed on axis {axis}: {reason}")]
    DriverConfig {
        /// Registry index of the axis.
        axis: usize,
        /// Driver-reported reason.
        reason: String,
    },

    /// Collaborator could not be initialized.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Bus or serial communication error.
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),
}

/// Stepper driver settings applied once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    /// Microstep resolution (power of two).
    pub microsteps: u16,
    /// RMS run current [mA].
    pub run_current_ma: u16,
    /// Standstill hold current register value (0..=31).
    pub hold_current: u8,
}

/// Trapezoidal motion engine for a single axis.
///
/// Positions are absolute steps, speeds are steps/s, accelerations are
/// steps/s². `run` and `run_speed` are non-blocking: each call advances
/// the axis by whatever the elapsed time since the last call allows.
///
/// # Contract
///
/// | Operation              | Effect                                          |
/// |------------------------|-------------------------------------------------|
/// | `move_to`              | new absolute target, ramped by `run`            |
/// | `run`                  | one ramped step toward the target               |
/// | `set_speed` + `run_speed` | constant speed, no ramp, target untouched    |
/// | `stop`                 | retarget to the shortest decelerated stop       |
/// | `set_current_position` | redefine position, target = position, speed 0   |
pub trait MotionPrimitive: Send {
    /// Upper speed bound for ramped moves.
    fn set_max_speed(&mut self, steps_per_s: f32);

    /// Current upper speed bound.
    fn max_speed(&self) -> f32;

    /// Ramp acceleration for `run`.
    fn set_acceleration(&mut self, steps_per_s2: f32);

    /// Current ramp acceleration.
    fn acceleration(&self) -> f32;

    /// Set an absolute target position.
    fn move_to(&mut self, absolute_steps: i64);

    /// Advance the ramped move. Returns true while motion remains.
    fn run(&mut self) -> bool;

    /// Advance at the constant speed set by `set_speed`.
    /// Returns true if the axis stepped.
    fn run_speed(&mut self) -> bool;

    /// Constant speed for `run_speed` (sign selects direction).
    fn set_speed(&mut self, steps_per_s: f32);

    /// Current speed.
    fn speed(&self) -> f32;

    /// Decelerate to zero as fast as the acceleration allows.
    fn stop(&mut self);

    /// Remaining steps to the target (signed).
    fn distance_to_go(&self) -> i64;

    /// Absolute position.
    fn current_position(&self) -> i64;

    /// Redefine the absolute position. Also clears target and speed.
    fn set_current_position(&mut self, steps: i64);
}

/// One-shot stepper driver configuration.
pub trait DriverConfigurator: Send {
    /// Program current, microstepping and hold settings.
    fn apply(&mut self, settings: &DriverSettings) -> Result<(), HalError>;
}

/// Ultrasonic range sensor.
pub trait DistanceSensor: Send {
    /// Trigger one measurement. Returns centimetres, or
    /// [`crate::consts::INVALID_DISTANCE_CM`] when no echo was received.
    fn sample_cm(&mut self) -> f32;
}

/// Carriage home-limit input.
pub trait HomeSwitch: Send {
    /// Returns true while the carriage sits on the limit.
    fn is_triggered(&mut self) -> bool;
}

/// Monotonic millisecond clock.
pub trait Clock: Send {
    /// Current time.
    fn now(&self) -> MonoTime;
}
