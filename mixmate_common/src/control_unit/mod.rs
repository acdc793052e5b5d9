//! Control unit shared types.
//!
//! Rig configuration tables and the state enums/flags that cross from the
//! dispatch loop to the bus context.

pub mod config;
pub mod state;
