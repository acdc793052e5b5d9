//! Collaborator interfaces consumed by the control unit.
//!
//! The control unit never touches pins or driver registers; it talks to
//! these traits. `mixmate_hal` provides simulation implementations.

pub mod driver;
pub mod rig;

pub use driver::{
    Clock, DistanceSensor, DriverConfigurator, DriverSettings, HalError, HomeSwitch,
    MotionPrimitive,
};
pub use rig::{AxisHardware, RigHardware};
