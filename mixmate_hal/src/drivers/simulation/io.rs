//! Simulated carriage home-limit input.
//!
//! The switch is closed while the observed carriage position is at or below
//! the switch position. A switch built with [`SimHomeSwitch::never`] stays
//! open forever, which is how tests exercise the homing timeout.

use mixmate_common::hal::HomeSwitch;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

use super::stepper::StepperProbe;

/// Position-driven home switch.
#[derive(Debug, Clone)]
pub struct SimHomeSwitch {
    /// Carriage observer and switch position [steps]. `None` never triggers.
    watch: Option<(StepperProbe, i64)>,
    /// Number of polls so far.
    polls: Arc<AtomicU64>,
}

impl SimHomeSwitch {
    /// Switch closing once `carriage` reaches `switch_position` or below.
    pub fn at(carriage: StepperProbe, switch_position: i64) -> Self {
        Self {
            watch: Some((carriage, switch_position)),
            polls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Switch that is never reached.
    pub fn never() -> Self {
        Self {
            watch: None,
            polls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared poll counter.
    pub fn poll_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.polls)
    }
}

impl HomeSwitch for SimHomeSwitch {
    fn is_triggered(&mut self) -> bool {
        self.polls.fetch_add(1, Ordering::Relaxed);
        match &self.watch {
            Some((carriage, switch_position)) => {
                let position = carriage.position();
                let closed = position <= *switch_position;
                if closed {
                    trace!(position, "home switch closed");
                }
                closed
            }
            None => false,
        }
    }
}
