//! Simulation driver module.
//!
//! Software rig for development and testing without physical hardware.

mod clock;
mod driver;
mod io;
mod sensor;
mod stepper;

pub use clock::SimClock;
pub use driver::{
    DriverLog, RecordingConfigurator, RigProbes, SIM_IDLE_DISTANCE_CM, SimulatedRig,
    SimulatedRigBuilder,
};
pub use io::SimHomeSwitch;
pub use sensor::{SensorScript, SimRangeSensor};
pub use stepper::{SimStepper, StepperProbe};
