//! HAL driver implementations.
//!
//! - [`simulation`] - Software rig for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the collaborator traits from `mixmate_common::hal`
//! 3. Provide a constructor that returns a populated `RigHardware`

pub mod simulation;
