//! # MIXmate HAL Library
//!
//! Collaborator implementations for the MIXmate control unit. The traits live
//! in `mixmate_common::hal`; this crate provides the drivers behind them.
//!
//! # Module Structure
//!
//! - [`drivers`] - Driver implementations (currently the simulation rig)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   mixmate_hal::simulation                    │
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────────┐  │
//! │  │ SimClock  │──►│ SimStepper×12│──►│ SimHomeSwitch       │  │
//! │  └─────┬─────┘   └──────────────┘   │ (carriage position) │  │
//! │        │                            └─────────────────────┘  │
//! │        ▼                                                     │
//! │  ┌──────────────┐   ┌──────────────────────┐                 │
//! │  │SimRangeSensor│   │RecordingConfigurator │                 │
//! │  └──────────────┘   └──────────────────────┘                 │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             ▼  RigHardware (boxed traits)
//!                     mixmate_control_unit
//! ```

#![warn(missing_docs)]

pub mod drivers;

pub use crate::drivers::simulation::{RigProbes, SimClock, SimulatedRig, SimulatedRigBuilder};
