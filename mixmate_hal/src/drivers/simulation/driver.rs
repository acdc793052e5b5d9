//! Simulated rig assembly.
//!
//! [`SimulatedRigBuilder`] wires twelve [`SimStepper`]s, a home switch on the
//! carriage, a scripted range sensor and recording driver configurators to
//! one shared [`SimClock`]. The result splits into the boxed
//! [`RigHardware`] the control unit consumes and the [`RigProbes`] that
//! observe it.

use mixmate_common::consts::{
    AXIS_COUNT, BAND_AXIS, CARRIAGE_AXIS, DEFAULT_ACCELERATION, DEFAULT_MAX_SPEED,
};
use mixmate_common::hal::{
    AxisHardware, DriverConfigurator, DriverSettings, HalError, RigHardware,
};
use mixmate_common::protocol::PumpId;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::clock::SimClock;
use super::io::SimHomeSwitch;
use super::sensor::{SensorScript, SimRangeSensor};
use super::stepper::{SimStepper, StepperProbe};

/// Idle reading of the simulated range sensor: nothing on the band [cm].
pub const SIM_IDLE_DISTANCE_CM: f32 = 60.0;

// ─── Driver configurator ────────────────────────────────────────────

/// Shared record of every applied driver configuration.
#[derive(Debug, Clone, Default)]
pub struct DriverLog {
    entries: Arc<Mutex<Vec<(usize, DriverSettings)>>>,
}

impl DriverLog {
    /// Applied configurations as `(axis, settings)`, in order.
    pub fn entries(&self) -> Vec<(usize, DriverSettings)> {
        self.entries.lock().clone()
    }

    /// Most recent settings applied to `axis`.
    pub fn settings_for(&self, axis: usize) -> Option<DriverSettings> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|(a, _)| *a == axis)
            .map(|(_, s)| *s)
    }

    /// Number of successful applications.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing was applied yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Driver configurator that records what it was asked to program.
#[derive(Debug)]
pub struct RecordingConfigurator {
    axis: usize,
    log: DriverLog,
    failure: Option<String>,
}

impl RecordingConfigurator {
    /// Configurator for `axis` appending to `log`.
    pub fn new(axis: usize, log: DriverLog) -> Self {
        Self {
            axis,
            log,
            failure: None,
        }
    }

    /// Configurator that rejects every application with `reason`.
    pub fn failing(axis: usize, log: DriverLog, reason: impl Into<String>) -> Self {
        Self {
            axis,
            log,
            failure: Some(reason.into()),
        }
    }
}

impl DriverConfigurator for RecordingConfigurator {
    fn apply(&mut self, settings: &DriverSettings) -> Result<(), HalError> {
        if let Some(reason) = &self.failure {
            return Err(HalError::DriverConfig {
                axis: self.axis,
                reason: reason.clone(),
            });
        }
        debug!(
            axis = self.axis,
            microsteps = settings.microsteps,
            run_current_ma = settings.run_current_ma,
            hold_current = settings.hold_current,
            "Driver configured"
        );
        self.log.entries.lock().push((self.axis, *settings));
        Ok(())
    }
}

// ─── Probes ─────────────────────────────────────────────────────────

/// Observers of a simulated rig.
#[derive(Debug, Clone)]
pub struct RigProbes {
    /// Shared time base.
    pub clock: SimClock,
    /// Stepper observers in registry order.
    pub axes: Vec<StepperProbe>,
    /// Range sensor feed.
    pub sensor: SensorScript,
    /// Driver configuration record.
    pub drivers: DriverLog,
    /// Home switch poll counter.
    pub home_polls: Arc<AtomicU64>,
}

impl RigProbes {
    /// Carriage observer.
    pub fn carriage(&self) -> &StepperProbe {
        &self.axes[CARRIAGE_AXIS]
    }

    /// Band observer.
    pub fn band(&self) -> &StepperProbe {
        &self.axes[BAND_AXIS]
    }

    /// Observer of the axis driving `pump`.
    pub fn pump(&self, pump: PumpId) -> &StepperProbe {
        &self.axes[pump.axis_index()]
    }

    /// Home switch polls so far.
    pub fn home_polls(&self) -> u64 {
        self.home_polls.load(Ordering::Relaxed)
    }
}

// ─── Rig ────────────────────────────────────────────────────────────

/// A fully wired simulated rig.
pub struct SimulatedRig {
    /// Collaborators for the control unit.
    pub hardware: RigHardware,
    /// Observers for tests and diagnostics.
    pub probes: RigProbes,
}

impl SimulatedRig {
    /// Builder with a manual clock, carriage at 0 and the switch at 0.
    pub fn builder() -> SimulatedRigBuilder {
        SimulatedRigBuilder::default()
    }

    /// Split into hardware and probes.
    pub fn into_parts(self) -> (RigHardware, RigProbes) {
        (self.hardware, self.probes)
    }
}

/// Builder for [`SimulatedRig`].
#[derive(Debug, Clone)]
pub struct SimulatedRigBuilder {
    clock: SimClock,
    carriage_start: i64,
    home_switch_at: Option<i64>,
    sensor_idle_cm: f32,
    failing_axis: Option<usize>,
}

impl Default for SimulatedRigBuilder {
    fn default() -> Self {
        Self {
            clock: SimClock::manual(),
            carriage_start: 0,
            home_switch_at: Some(0),
            sensor_idle_cm: SIM_IDLE_DISTANCE_CM,
            failing_axis: None,
        }
    }
}

impl SimulatedRigBuilder {
    /// Use `clock` as the shared time base.
    pub fn clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    /// Carriage power-on position [steps].
    pub fn carriage_start(mut self, steps: i64) -> Self {
        self.carriage_start = steps;
        self
    }

    /// Home switch position [steps].
    pub fn home_switch_at(mut self, steps: i64) -> Self {
        self.home_switch_at = Some(steps);
        self
    }

    /// Home switch that never closes.
    pub fn without_home_switch(mut self) -> Self {
        self.home_switch_at = None;
        self
    }

    /// Range sensor reading when no sample is scripted [cm].
    pub fn sensor_idle_cm(mut self, cm: f32) -> Self {
        self.sensor_idle_cm = cm;
        self
    }

    /// Make the driver configurator of `axis` fail at start-up.
    pub fn failing_driver(mut self, axis: usize) -> Self {
        self.failing_axis = Some(axis);
        self
    }

    /// Wire the rig.
    pub fn build(self) -> SimulatedRig {
        let log = DriverLog::default();
        let mut axes = Vec::with_capacity(AXIS_COUNT);
        let mut probes = Vec::with_capacity(AXIS_COUNT);

        for index in 0..AXIS_COUNT {
            let start = if index == CARRIAGE_AXIS {
                self.carriage_start
            } else {
                0
            };
            let motor = SimStepper::new(
                index,
                self.clock.clone(),
                start,
                DEFAULT_MAX_SPEED,
                DEFAULT_ACCELERATION,
            );
            probes.push(motor.probe());

            let driver = match self.failing_axis {
                Some(axis) if axis == index => {
                    RecordingConfigurator::failing(index, log.clone(), "simulated driver fault")
                }
                _ => RecordingConfigurator::new(index, log.clone()),
            };
            axes.push(AxisHardware {
                motor: Box::new(motor),
                driver: Box::new(driver),
            });
        }

        let home_switch = match self.home_switch_at {
            Some(at) => SimHomeSwitch::at(probes[CARRIAGE_AXIS].clone(), at),
            None => SimHomeSwitch::never(),
        };
        let sensor = SimRangeSensor::new(self.sensor_idle_cm);

        info!(
            axes = AXIS_COUNT,
            carriage_start = self.carriage_start,
            home_switch = ?self.home_switch_at,
            "Simulated rig assembled"
        );

        let probes = RigProbes {
            clock: self.clock.clone(),
            axes: probes,
            sensor: sensor.script(),
            drivers: log,
            home_polls: home_switch.poll_counter(),
        };

        SimulatedRig {
            hardware: RigHardware {
                axes,
                sensor: Box::new(sensor),
                home_switch: Box::new(home_switch),
                clock: Box::new(self.clock),
            },
            probes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixmate_common::hal::{Clock, DistanceSensor, HomeSwitch, MotionPrimitive};

    #[test]
    fn builds_twelve_axes() {
        let rig = SimulatedRig::builder().carriage_start(170).build();
        let (mut hw, probes) = rig.into_parts();
        assert_eq!(hw.axes.len(), AXIS_COUNT);
        assert_eq!(probes.axes.len(), AXIS_COUNT);
        assert_eq!(probes.carriage().position(), 170);
        assert_eq!(hw.axes[CARRIAGE_AXIS].motor.current_position(), 170);
        assert!(!hw.home_switch.is_triggered());
        assert_eq!(hw.sensor.sample_cm(), SIM_IDLE_DISTANCE_CM);
        assert_eq!(hw.clock.now().as_millis(), 0);
        assert_eq!(probes.home_polls(), 1);
    }

    #[test]
    fn configurators_record_settings() {
        let (mut hw, probes) = SimulatedRig::builder().build().into_parts();
        let settings = DriverSettings {
            microsteps: 16,
            run_current_ma: 1200,
            hold_current: 10,
        };
        hw.axes[BAND_AXIS].driver.apply(&settings).unwrap();
        assert_eq!(probes.drivers.len(), 1);
        assert_eq!(probes.drivers.settings_for(BAND_AXIS), Some(settings));
        assert!(probes.drivers.settings_for(CARRIAGE_AXIS).is_none());
    }

    #[test]
    fn failing_driver_reports_axis() {
        let (mut hw, probes) = SimulatedRig::builder().failing_driver(5).build().into_parts();
        let settings = DriverSettings {
            microsteps: 4,
            run_current_ma: 1200,
            hold_current: 1,
        };
        let err = hw.axes[5].driver.apply(&settings).unwrap_err();
        assert!(matches!(err, HalError::DriverConfig { axis: 5, .. }));
        assert!(probes.drivers.is_empty());
    }

    #[test]
    fn pump_probe_maps_to_axis() {
        let (mut hw, probes) = SimulatedRig::builder().build().into_parts();
        let pump = PumpId::new(3).unwrap();
        hw.axes[pump.axis_index()].motor.set_speed(500.0);
        assert_eq!(probes.pump(pump).speed(), 500.0);
    }
}
