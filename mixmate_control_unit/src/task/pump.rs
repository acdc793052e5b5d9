//! Timed pump task (Idle → Running → Idle).
//!
//! Pumps run at constant speed through `run_speed`, so the run time is
//! exact with no ramp tail. At most one pump owns its axis at a time.

use mixmate_common::protocol::PumpId;
use mixmate_common::time::MonoTime;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::axis::AxisRegistry;

/// The pump currently owning its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePump {
    /// Which pump.
    pub id: PumpId,
    /// When it stops.
    pub deadline: MonoTime,
}

/// Result of a Pump command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Pump started (or restarted) and owns its axis.
    Started {
        /// Pump that was force-stopped to make room.
        displaced: Option<PumpId>,
    },
    /// Zero duration: the named pump was stopped.
    Stopped {
        /// The named pump had been the active one.
        was_active: bool,
    },
    /// Raw id outside `1..=10`.
    Rejected,
}

/// Owner of the single active pump.
#[derive(Debug, Default)]
pub struct PumpTask {
    active: Option<ActivePump>,
}

impl PumpTask {
    /// No pump running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a Pump command with an unvalidated id.
    pub fn command(
        &mut self,
        raw_id: u8,
        seconds: u8,
        axes: &mut AxisRegistry,
        now: MonoTime,
    ) -> PumpOutcome {
        let Some(id) = PumpId::new(raw_id) else {
            warn!(raw_id, "pump id out of range, command ignored");
            return PumpOutcome::Rejected;
        };

        if seconds == 0 {
            axes.pump_mut(id).motor_mut().set_speed(0.0);
            let was_active = self.active.is_some_and(|p| p.id == id);
            if was_active {
                self.active = None;
            }
            info!(pump = id.get(), was_active, "Pump stopped");
            return PumpOutcome::Stopped { was_active };
        }

        let displaced = match self.active {
            Some(other) if other.id != id => {
                self.release(axes);
                debug!(pump = other.id.get(), "pump displaced");
                Some(other.id)
            }
            _ => None,
        };

        let channel = axes.pump_mut(id);
        let speed = channel.config().max_speed;
        channel.motor_mut().set_speed(speed);
        let deadline = now + Duration::from_secs(u64::from(seconds));
        self.active = Some(ActivePump { id, deadline });
        info!(pump = id.get(), seconds, speed, "Pump started");
        PumpOutcome::Started { displaced }
    }

    /// Step the active pump; stop and release it at its deadline.
    ///
    /// Returns the pump that finished on this call.
    pub fn advance(&mut self, axes: &mut AxisRegistry, now: MonoTime) -> Option<PumpId> {
        let pump = self.active?;
        let motor = axes.pump_mut(pump.id).motor_mut();
        motor.run_speed();
        if now.has_reached(pump.deadline) {
            motor.set_speed(0.0);
            self.active = None;
            info!(pump = pump.id.get(), "Pump run complete");
            return Some(pump.id);
        }
        None
    }

    /// Stop the active pump immediately and release its axis.
    pub fn release(&mut self, axes: &mut AxisRegistry) -> Option<PumpId> {
        let pump = self.active.take()?;
        axes.pump_mut(pump.id).motor_mut().set_speed(0.0);
        Some(pump.id)
    }

    /// The active pump, if any.
    #[inline]
    pub fn active(&self) -> Option<ActivePump> {
        self.active
    }

    /// A pump owns its axis.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
