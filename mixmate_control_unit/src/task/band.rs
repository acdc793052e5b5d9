//! Band transport task (Idle → Running → Stopping → Idle).
//!
//! | Kind   | Direction | Mode             | Running ends when               |
//! |--------|-----------|------------------|---------------------------------|
//! | Unload | negative  | timer deadline   | the band timeout expires        |
//! | Load   | positive  | sensor triggered | the dispatcher reports arrival  |
//!
//! Both kinds decelerate with `stop()` and return to Idle once the band has
//! no distance left. At most one band task exists; starting a new one
//! supersedes the old.

use mixmate_common::consts::CONTINUOUS_STEPS;
use mixmate_common::time::MonoTime;
use std::time::Duration;
use tracing::{debug, info};

use crate::axis::AxisChannel;

/// Which band job was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    /// Toward the load side until an object arrives.
    Load,
    /// Away from the load side for a fixed time.
    Unload,
}

/// How a running band task ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMode {
    /// Stop at the deadline.
    TimerDeadline(MonoTime),
    /// Stop on an arrival reading.
    SensorTriggered,
}

/// Band task phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandPhase {
    /// No band task.
    #[default]
    Idle,
    /// Continuous move in progress.
    Running,
    /// Decelerating to standstill.
    Stopping,
}

/// In-flight band task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BandTask {
    kind: BandKind,
    mode: BandMode,
    phase: BandPhase,
    started: MonoTime,
}

/// Outcome of advancing the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandEvent {
    /// Timer expired, band decelerating.
    DeadlineReached,
    /// Band came to rest; task gone.
    Finished(BandKind),
}

/// Owner of the single band task.
#[derive(Debug, Default)]
pub struct BandTransport {
    task: Option<BandTask>,
    unload_timeout: Duration,
}

impl BandTransport {
    /// Idle transport with the given Unload run time.
    pub fn new(unload_timeout: Duration) -> Self {
        Self {
            task: None,
            unload_timeout,
        }
    }

    /// Start a band task, superseding any in flight.
    ///
    /// Applies the band's table profile and starts a quasi-endless move in
    /// the kind's direction.
    pub fn start(&mut self, kind: BandKind, band: &mut AxisChannel, now: MonoTime) {
        if let Some(old) = self.task.take() {
            band.motor_mut().stop();
            debug!(kind = ?old.kind, "band task superseded");
        }

        band.apply_profile();
        let motor = band.motor_mut();
        let (mode, offset) = match kind {
            BandKind::Load => (BandMode::SensorTriggered, CONTINUOUS_STEPS),
            BandKind::Unload => (
                BandMode::TimerDeadline(now + self.unload_timeout),
                -CONTINUOUS_STEPS,
            ),
        };
        let target = motor.current_position() + offset;
        motor.move_to(target);

        self.task = Some(BandTask {
            kind,
            mode,
            phase: BandPhase::Running,
            started: now,
        });
        info!(?kind, ?mode, "Band task started");
    }

    /// Step the band and run the phase machine.
    pub fn advance(&mut self, band: &mut AxisChannel, now: MonoTime) -> Option<BandEvent> {
        let task = self.task.as_mut()?;
        let motor = band.motor_mut();
        motor.run();

        match (task.phase, task.mode) {
            (BandPhase::Running, BandMode::TimerDeadline(deadline)) if now.has_reached(deadline) => {
                motor.stop();
                task.phase = BandPhase::Stopping;
                debug!(kind = ?task.kind, "band deadline reached, stopping");
                Some(BandEvent::DeadlineReached)
            }
            (BandPhase::Stopping, _) if motor.distance_to_go() == 0 => {
                let kind = task.kind;
                let elapsed = now.saturating_since(task.started);
                self.task = None;
                info!(?kind, elapsed_ms = elapsed.as_millis() as u64, "Band task finished");
                Some(BandEvent::Finished(kind))
            }
            _ => None,
        }
    }

    /// Decelerate a running Load task after an arrival reading.
    ///
    /// Returns false if no Load task is running.
    pub fn arrival_stop(&mut self, band: &mut AxisChannel) -> bool {
        match self.task.as_mut() {
            Some(task) if task.kind == BandKind::Load && task.phase == BandPhase::Running => {
                band.motor_mut().stop();
                task.phase = BandPhase::Stopping;
                debug!("object arrived, band stopping");
                true
            }
            _ => false,
        }
    }

    /// Any band task in flight.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// A Load task is still in its Running phase.
    #[inline]
    pub fn is_load_running(&self) -> bool {
        matches!(
            self.task,
            Some(BandTask {
                kind: BandKind::Load,
                phase: BandPhase::Running,
                ..
            })
        )
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> BandPhase {
        self.task.map_or(BandPhase::Idle, |t| t.phase)
    }

    /// Current mode, if a task exists.
    #[inline]
    pub fn mode(&self) -> Option<BandMode> {
        self.task.map(|t| t.mode)
    }

    /// Current kind, if a task exists.
    #[inline]
    pub fn kind(&self) -> Option<BandKind> {
        self.task.map(|t| t.kind)
    }
}
