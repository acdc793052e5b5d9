//! Hardware bundle handed to the control unit at start-up.

use super::driver::{Clock, DistanceSensor, DriverConfigurator, HomeSwitch, MotionPrimitive};

/// Motion primitive and driver configurator of one axis slot.
pub struct AxisHardware {
    /// Ramped/constant-speed stepping engine.
    pub motor: Box<dyn MotionPrimitive>,
    /// One-shot driver setup handle.
    pub driver: Box<dyn DriverConfigurator>,
}

/// Every collaborator the control unit consumes.
///
/// `axes` is ordered by registry index: carriage, band, pumps 1..=10.
pub struct RigHardware {
    /// Axis slots in registry order.
    pub axes: Vec<AxisHardware>,
    /// Range sensor in front of the band.
    pub sensor: Box<dyn DistanceSensor>,
    /// Carriage home-limit input.
    pub home_switch: Box<dyn HomeSwitch>,
    /// Monotonic clock shared by all tasks.
    pub clock: Box<dyn Clock>,
}

impl std::fmt::Debug for RigHardware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigHardware")
            .field("axes", &self.axes.len())
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}
