//! Start-up and runtime errors of the control unit binary.
//!
//! Nothing in the dispatch loop itself fails: malformed frames, rejected
//! pump ids and homing timeouts are reported through status and logs.
//! These errors only occur while wiring the rig.

use mixmate_common::config::ConfigError;
use mixmate_common::hal::HalError;
use thiserror::Error;

use crate::cycle::CycleError;

/// Top-level error for `run()`.
#[derive(Debug, Error)]
pub enum RigError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator failed to initialize.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// Bus bridge socket or thread failure.
    #[error("bus bridge: {0}")]
    Bus(#[from] std::io::Error),

    /// RT setup failure.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Signal handler could not be installed.
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
