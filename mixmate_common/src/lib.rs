//! MIXmate Common Library
//!
//! Shared constants, wire protocol, collaborator traits and configuration
//! loading for the MIXmate workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Axis layout, bus constants and firmware defaults
//! - [`protocol`] - Opcodes, pump ids and the status frame
//! - [`hal`] - Collaborator traits (motion primitive, sensors, clock)
//! - [`control_unit`] - Rig configuration and shared state types
//! - [`config`] - Configuration loading traits and types
//! - [`time`] - Monotonic millisecond timestamps
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! mixmate_common = { workspace = true }
//! ```
//!
//! ```rust
//! use mixmate_common::prelude::*;
//! use mixmate_common::consts::AXIS_COUNT;
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod hal;
pub mod prelude;
pub mod protocol;
pub mod time;
