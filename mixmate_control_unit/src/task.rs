//! Task state machines.
//!
//! - [`homing`] - blocking carriage reference search
//! - [`band`] - Load/Unload band transport
//! - [`pump`] - exact-time constant-speed pump runs

pub mod band;
pub mod homing;
pub mod pump;

pub use band::{BandEvent, BandKind, BandMode, BandPhase, BandTransport};
pub use homing::{HomingOutcome, HomingSupervisor};
pub use pump::{ActivePump, PumpOutcome, PumpTask};
