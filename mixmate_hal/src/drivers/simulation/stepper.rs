//! Simulated stepper axis.
//!
//! `SimStepper` implements [`MotionPrimitive`] with a time-based trapezoidal
//! model: every `run`/`run_speed` call integrates the time elapsed on the
//! shared [`SimClock`] since the previous call. Ramped moves are integrated
//! in 1 ms sub-steps so coarse test clocks still produce a clean profile.
//!
//! A [`StepperProbe`] observes the same state from tests and from the
//! simulated home switch.

use mixmate_common::hal::MotionPrimitive;
use mixmate_common::time::MonoTime;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

use super::clock::SimClock;

/// Integration sub-step for ramped moves [s].
const SUBSTEP_S: f64 = 0.001;

/// Distance below which a ramped move snaps onto its target [steps].
const SNAP_STEPS: f64 = 0.5;

#[derive(Debug, Clone)]
struct StepperState {
    /// Continuous position [steps].
    position: f64,
    /// Signed speed [steps/s].
    speed: f64,
    /// Absolute target [steps].
    target: i64,
    /// Ramp speed bound [steps/s].
    max_speed: f64,
    /// Ramp acceleration [steps/s²].
    acceleration: f64,
    /// Time of the last integration or command.
    last_update: MonoTime,
}

impl StepperState {
    fn current(&self) -> i64 {
        self.position.round() as i64
    }

    fn distance_to_go(&self) -> i64 {
        self.target - self.current()
    }

    fn settle(&mut self) {
        self.position = self.target as f64;
        self.speed = 0.0;
    }

    /// One ramped integration step of length `h`. Returns false once settled.
    fn ramp_step(&mut self, h: f64) -> bool {
        let error = self.target as f64 - self.position;
        if error.abs() <= SNAP_STEPS && self.speed.abs() <= self.acceleration * SUBSTEP_S {
            self.settle();
            return false;
        }

        let accel = self.acceleration.max(f64::EPSILON);
        let v = self.speed;
        let stopping = v * v / (2.0 * accel);
        let desired = if error.abs() <= stopping {
            error.signum() * (2.0 * accel * error.abs()).sqrt().min(self.max_speed)
        } else {
            error.signum() * self.max_speed
        };

        let dv = (desired - v).clamp(-accel * h, accel * h);
        self.speed = (v + dv).clamp(-self.max_speed, self.max_speed);
        self.position += self.speed * h;

        let after = self.target as f64 - self.position;
        let crossed = after != 0.0 && after.signum() != error.signum();
        if crossed || after.abs() <= SNAP_STEPS {
            self.settle();
            return false;
        }
        true
    }
}

/// Simulated stepper implementing [`MotionPrimitive`].
pub struct SimStepper {
    index: usize,
    clock: SimClock,
    state: Arc<Mutex<StepperState>>,
}

impl SimStepper {
    /// Axis at rest at `position` with the given ramp limits.
    pub fn new(index: usize, clock: SimClock, position: i64, max_speed: f32, acceleration: f32) -> Self {
        let now = clock.peek();
        Self {
            index,
            clock,
            state: Arc::new(Mutex::new(StepperState {
                position: position as f64,
                speed: 0.0,
                target: position,
                max_speed: f64::from(max_speed.abs()),
                acceleration: f64::from(acceleration.abs()),
                last_update: now,
            })),
        }
    }

    /// Observer sharing this axis' state.
    pub fn probe(&self) -> StepperProbe {
        StepperProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn elapsed_s(&self, s: &mut StepperState) -> f64 {
        let now = self.clock.peek();
        let dt = now.saturating_since(s.last_update).as_secs_f64();
        s.last_update = now;
        dt
    }

    fn touch(&self, s: &mut StepperState) {
        s.last_update = self.clock.peek();
    }
}

impl MotionPrimitive for SimStepper {
    fn set_max_speed(&mut self, steps_per_s: f32) {
        let mut s = self.state.lock();
        s.max_speed = f64::from(steps_per_s.abs());
    }

    fn max_speed(&self) -> f32 {
        self.state.lock().max_speed as f32
    }

    fn set_acceleration(&mut self, steps_per_s2: f32) {
        let mut s = self.state.lock();
        s.acceleration = f64::from(steps_per_s2.abs());
    }

    fn acceleration(&self) -> f32 {
        self.state.lock().acceleration as f32
    }

    fn move_to(&mut self, absolute_steps: i64) {
        let mut s = self.state.lock();
        self.touch(&mut s);
        s.target = absolute_steps;
        trace!(axis = self.index, target = absolute_steps, "move_to");
    }

    fn run(&mut self) -> bool {
        let mut s = self.state.lock();
        let mut remaining = self.elapsed_s(&mut s);
        if s.distance_to_go() == 0 && s.speed == 0.0 {
            return false;
        }
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP_S);
            remaining -= h;
            if !s.ramp_step(h) {
                break;
            }
        }
        s.distance_to_go() != 0 || s.speed != 0.0
    }

    fn run_speed(&mut self) -> bool {
        let mut s = self.state.lock();
        let dt = self.elapsed_s(&mut s);
        if s.speed == 0.0 {
            return false;
        }
        let before = s.current();
        s.position += s.speed * dt;
        s.current() != before
    }

    fn set_speed(&mut self, steps_per_s: f32) {
        let mut s = self.state.lock();
        self.touch(&mut s);
        let bound = s.max_speed;
        s.speed = f64::from(steps_per_s).clamp(-bound, bound);
    }

    fn speed(&self) -> f32 {
        self.state.lock().speed as f32
    }

    fn stop(&mut self) {
        let mut s = self.state.lock();
        self.touch(&mut s);
        if s.speed == 0.0 {
            s.target = s.current();
            return;
        }
        let accel = s.acceleration.max(f64::EPSILON);
        let to_stop = (s.speed * s.speed / (2.0 * accel)).ceil() as i64;
        s.target = s.current() + if s.speed > 0.0 { to_stop } else { -to_stop };
        trace!(axis = self.index, target = s.target, "stop");
    }

    fn distance_to_go(&self) -> i64 {
        self.state.lock().distance_to_go()
    }

    fn current_position(&self) -> i64 {
        self.state.lock().current()
    }

    fn set_current_position(&mut self, steps: i64) {
        let mut s = self.state.lock();
        self.touch(&mut s);
        s.position = steps as f64;
        s.target = steps;
        s.speed = 0.0;
    }
}

// ─── Probe ──────────────────────────────────────────────────────────

/// Read-only view of a [`SimStepper`].
#[derive(Clone)]
pub struct StepperProbe {
    state: Arc<Mutex<StepperState>>,
}

impl StepperProbe {
    /// Absolute position [steps].
    pub fn position(&self) -> i64 {
        self.state.lock().current()
    }

    /// Signed speed [steps/s].
    pub fn speed(&self) -> f32 {
        self.state.lock().speed as f32
    }

    /// Absolute target [steps].
    pub fn target(&self) -> i64 {
        self.state.lock().target
    }

    /// Remaining steps to the target.
    pub fn distance_to_go(&self) -> i64 {
        self.state.lock().distance_to_go()
    }

    /// Configured ramp speed bound.
    pub fn max_speed(&self) -> f32 {
        self.state.lock().max_speed as f32
    }

    /// Configured ramp acceleration.
    pub fn acceleration(&self) -> f32 {
        self.state.lock().acceleration as f32
    }

    /// True while the axis has speed or distance left.
    pub fn is_moving(&self) -> bool {
        let s = self.state.lock();
        s.speed != 0.0 || s.distance_to_go() != 0
    }
}

impl std::fmt::Debug for StepperProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock();
        f.debug_struct("StepperProbe")
            .field("position", &s.position)
            .field("speed", &s.speed)
            .field("target", &s.target)
            .finish()
    }
}
