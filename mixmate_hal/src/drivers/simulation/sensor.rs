//! Scripted ultrasonic range sensor.
//!
//! Samples are served from a FIFO script; once it runs dry the sensor keeps
//! returning its idle reading. A [`SensorScript`] handle feeds the same
//! queue from tests or from the host binary.

use mixmate_common::hal::DistanceSensor;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
struct SensorInner {
    script: VecDeque<f32>,
    idle_cm: f32,
    taken: u64,
}

/// Range sensor backed by a sample script.
#[derive(Debug)]
pub struct SimRangeSensor {
    inner: Arc<Mutex<SensorInner>>,
}

impl SimRangeSensor {
    /// Sensor reporting `idle_cm` whenever no scripted sample is queued.
    pub fn new(idle_cm: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SensorInner {
                script: VecDeque::new(),
                idle_cm,
                taken: 0,
            })),
        }
    }

    /// Handle feeding this sensor.
    pub fn script(&self) -> SensorScript {
        SensorScript {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DistanceSensor for SimRangeSensor {
    fn sample_cm(&mut self) -> f32 {
        let mut inner = self.inner.lock();
        inner.taken += 1;
        let sample = inner.script.pop_front().unwrap_or(inner.idle_cm);
        trace!(sample, "range sample");
        sample
    }
}

/// Feeding handle for a [`SimRangeSensor`].
#[derive(Debug, Clone)]
pub struct SensorScript {
    inner: Arc<Mutex<SensorInner>>,
}

impl SensorScript {
    /// Queue samples to be returned in order.
    pub fn push(&self, samples: &[f32]) {
        self.inner.lock().script.extend(samples.iter().copied());
    }

    /// Replace the idle reading.
    pub fn set_idle(&self, idle_cm: f32) {
        self.inner.lock().idle_cm = idle_cm;
    }

    /// Drop any queued samples.
    pub fn clear(&self) {
        self.inner.lock().script.clear();
    }

    /// Samples still queued.
    pub fn pending(&self) -> usize {
        self.inner.lock().script.len()
    }

    /// Total samples taken by the control unit.
    pub fn samples_taken(&self) -> u64 {
        self.inner.lock().taken
    }
}
