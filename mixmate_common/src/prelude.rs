//! Prelude module for common re-exports.
//!
//! ```rust
//! use mixmate_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::control_unit::config::{AxisConfig, RigConfig};

// ─── State ──────────────────────────────────────────────────────────
pub use crate::control_unit::state::{AxisRole, HomingState, StatusFlags};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::{
    AxisHardware, Clock, DistanceSensor, DriverConfigurator, DriverSettings, HalError,
    HomeSwitch, MotionPrimitive, RigHardware,
};

// ─── Wire protocol ──────────────────────────────────────────────────
pub use crate::protocol::{Opcode, PumpId, SystemStatus};

// ─── Time ───────────────────────────────────────────────────────────
pub use crate::time::MonoTime;
