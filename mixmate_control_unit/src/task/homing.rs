//! Carriage homing supervision.
//!
//! ## Lifecycle
//!
//! 1. `begin()` → `HomingState::Homing` (`homed` reads false from here on)
//! 2. `run()` saves the carriage profile, drives at constant homing speed
//!    and polls the home switch until it closes or the timeout elapses
//! 3. Switch closed → speed 0, position redefined as 0, `Homed`
//! 4. Timeout → position untouched, `Failed`
//!
//! In both outcomes the saved max speed and acceleration are restored.
//! `run()` blocks the calling thread for the whole search; it is the only
//! blocking operation in the dispatch loop.

use mixmate_common::control_unit::config::HomingConfig;
use mixmate_common::control_unit::state::HomingState;
use mixmate_common::hal::{Clock, HomeSwitch};
use std::time::Duration;
use tracing::{info, warn};

use crate::axis::AxisChannel;

/// Result of one homing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingOutcome {
    /// Switch reached; carriage position is now 0.
    Homed {
        /// Switch polls performed.
        polls: u64,
        /// Search duration.
        elapsed: Duration,
    },
    /// Switch not reached within the timeout.
    TimedOut {
        /// Switch polls performed.
        polls: u64,
    },
}

/// Homing state holder and search driver.
#[derive(Debug, Clone)]
pub struct HomingSupervisor {
    config: HomingConfig,
    state: HomingState,
}

impl HomingSupervisor {
    /// Supervisor in `Idle` (not homed).
    pub fn new(config: HomingConfig) -> Self {
        Self {
            config,
            state: HomingState::Idle,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> HomingState {
        self.state
    }

    /// True only after a successful search.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.state.is_homed()
    }

    /// Enter `Homing`. Call before publishing status for the search.
    pub fn begin(&mut self) {
        self.state = HomingState::Homing;
    }

    /// Run the blocking search on `carriage`.
    pub fn run(
        &mut self,
        carriage: &mut AxisChannel,
        switch: &mut dyn HomeSwitch,
        clock: &dyn Clock,
    ) -> HomingOutcome {
        self.state = HomingState::Homing;
        let acceleration = carriage.config().acceleration;
        let motor = carriage.motor_mut();

        let saved_max_speed = motor.max_speed();
        let saved_acceleration = motor.acceleration();

        motor.set_max_speed(self.config.speed.abs());
        motor.set_acceleration(acceleration);
        motor.set_speed(self.config.speed);

        let timeout = self.config.timeout();
        let started = clock.now();
        let mut polls = 0u64;

        info!(speed = self.config.speed, timeout_ms = self.config.timeout_ms, "Homing started");

        let outcome = loop {
            polls += 1;
            if switch.is_triggered() {
                break HomingOutcome::Homed {
                    polls,
                    elapsed: clock.now().saturating_since(started),
                };
            }
            motor.run_speed();
            if clock.now().saturating_since(started) > timeout {
                break HomingOutcome::TimedOut { polls };
            }
        };

        if let HomingOutcome::Homed { .. } = outcome {
            motor.set_speed(0.0);
            let here = motor.current_position();
            motor.move_to(here);
            motor.set_current_position(0);
        }
        motor.set_max_speed(saved_max_speed);
        motor.set_acceleration(saved_acceleration);

        match outcome {
            HomingOutcome::Homed { polls, elapsed } => {
                self.state = HomingState::Homed;
                info!(polls, elapsed_ms = elapsed.as_millis() as u64, "Homing complete");
            }
            HomingOutcome::TimedOut { polls } => {
                self.state = HomingState::Failed;
                warn!(polls, timeout_ms = self.config.timeout_ms, "Homing timed out, switch not reached");
            }
        }
        outcome
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
