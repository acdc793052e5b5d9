//! Object presence and displacement detector.
//!
//! Fuses noisy range samples into two stable flags:
//!
//! | Flag      | Set after                                  | Cleared by          |
//! |-----------|--------------------------------------------|---------------------|
//! | `present` | K consecutive samples `<= arrived`         | K samples `>= lost` |
//! | `moved`   | K consecutive samples off the reference by | loss or reset       |
//! |           | at least the movement threshold            |                     |
//!
//! The reference distance is captured at arrival and never re-baselined.
//! Non-positive or non-finite samples (no echo) are ignored entirely.

use mixmate_common::control_unit::config::DetectorConfig;
use tracing::{debug, trace};

/// Snapshot of the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectionState {
    /// An object sits in front of the sensor.
    pub present: bool,
    /// The object moved away from its arrival position.
    pub moved: bool,
    /// Distance captured at arrival [cm].
    pub reference_cm: Option<f32>,
    /// Consecutive arrival-qualifying samples.
    pub present_count: u8,
    /// Consecutive loss-qualifying samples.
    pub lost_count: u8,
    /// Consecutive movement-qualifying samples.
    pub moved_count: u8,
}

/// Transition produced by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorEvent {
    /// No flag changed.
    Unchanged,
    /// Sample was invalid and ignored.
    Ignored,
    /// Presence confirmed.
    Arrived,
    /// Displacement confirmed.
    Moved,
    /// Object gone; state back at baseline.
    Lost,
}

/// Debounced presence/displacement detector.
#[derive(Debug, Clone)]
pub struct ObjectDetector {
    config: DetectorConfig,
    state: DetectionState,
}

impl ObjectDetector {
    /// Detector at baseline.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: DetectionState::default(),
        }
    }

    /// True for samples the detector would act on.
    #[inline]
    pub fn is_valid(sample_cm: f32) -> bool {
        sample_cm.is_finite() && sample_cm > 0.0
    }

    /// True for a valid sample at or inside the arrival threshold.
    #[inline]
    pub fn is_arrival_reading(&self, sample_cm: f32) -> bool {
        Self::is_valid(sample_cm) && sample_cm <= self.config.arrived_cm
    }

    /// Feed one sample.
    pub fn update(&mut self, sample_cm: f32) -> DetectorEvent {
        if !Self::is_valid(sample_cm) {
            trace!(sample_cm, "invalid range sample ignored");
            return DetectorEvent::Ignored;
        }
        let confirm = self.config.confirm_samples;
        let s = &mut self.state;

        if !s.present {
            if sample_cm <= self.config.arrived_cm {
                s.present_count = s.present_count.saturating_add(1);
                if s.present_count >= confirm {
                    *s = DetectionState {
                        present: true,
                        reference_cm: Some(sample_cm),
                        ..DetectionState::default()
                    };
                    debug!(reference_cm = sample_cm, "object arrived");
                    return DetectorEvent::Arrived;
                }
            } else {
                s.present_count = 0;
            }
            return DetectorEvent::Unchanged;
        }

        if sample_cm >= self.config.lost_cm {
            s.lost_count = s.lost_count.saturating_add(1);
            if s.lost_count >= confirm {
                self.reset();
                debug!(sample_cm, "object lost");
                return DetectorEvent::Lost;
            }
            return DetectorEvent::Unchanged;
        }
        s.lost_count = 0;

        let Some(reference) = s.reference_cm else {
            return DetectorEvent::Unchanged;
        };
        if (sample_cm - reference).abs() >= self.config.moved_cm {
            s.moved_count = s.moved_count.saturating_add(1);
            if s.moved_count >= confirm && !s.moved {
                s.moved = true;
                debug!(sample_cm, reference_cm = reference, "object moved");
                return DetectorEvent::Moved;
            }
        } else {
            s.moved_count = 0;
        }
        DetectorEvent::Unchanged
    }

    /// Lock presence immediately with `sample_cm` as the reference.
    pub fn force_arrived(&mut self, sample_cm: f32) {
        self.state = DetectionState {
            present: true,
            reference_cm: Some(sample_cm),
            ..DetectionState::default()
        };
        debug!(reference_cm = sample_cm, "arrival forced");
    }

    /// Back to baseline.
    pub fn reset(&mut self) {
        self.state = DetectionState::default();
    }

    /// Object present.
    #[inline]
    pub fn present(&self) -> bool {
        self.state.present
    }

    /// Object displaced.
    #[inline]
    pub fn moved(&self) -> bool {
        self.state.moved
    }

    /// Full snapshot.
    #[inline]
    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// Active thresholds.
    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
