//! Dispatch loop.
//!
//! Owns every axis, task and sensor. One [`Dispatcher::tick`] runs, in order:
//!
//! | Step | Action                                                        |
//! |------|---------------------------------------------------------------|
//! | a    | advance the carriage ramp (`run`)                             |
//! | b    | clear `busy` once carriage, band and pumps are all idle        |
//! | c    | advance the band task                                         |
//! | d    | rate-limited range sample into the detector; arrival stop     |
//! | e    | advance the pump task                                         |
//! | f    | take the pending command, if any, and dispatch it             |
//! | g    | publish live status to the board                              |
//!
//! Handlers never wait, except Home which blocks for the whole search.

use mixmate_common::control_unit::config::RigConfig;
use mixmate_common::control_unit::state::StatusFlags;
use mixmate_common::hal::{Clock, DistanceSensor, HalError, HomeSwitch, RigHardware};
use mixmate_common::protocol::mm_to_steps;
use mixmate_common::time::MonoTime;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::axis::AxisRegistry;
use crate::command::{Command, CommandChannel, LatchedCommand};
use crate::cycle::{CycleStats, TickPacer};
use crate::detector::{DetectorEvent, ObjectDetector};
use crate::task::{BandEvent, BandKind, BandTransport, HomingSupervisor, PumpOutcome, PumpTask};

// ─── Counters ───────────────────────────────────────────────────────

/// Dispatch-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchCounters {
    /// Commands taken from the inbox.
    pub dispatched: u64,
    /// Taken commands with an unknown opcode.
    pub unknown: u64,
    /// Range samples taken.
    pub samples: u64,
}

// ─── Dispatcher ─────────────────────────────────────────────────────

/// The dispatch loop and everything it owns.
pub struct Dispatcher {
    channel: Arc<CommandChannel>,
    axes: AxisRegistry,
    detector: ObjectDetector,
    band: BandTransport,
    pumps: PumpTask,
    homing: HomingSupervisor,
    sensor: Box<dyn DistanceSensor>,
    home_switch: Box<dyn HomeSwitch>,
    clock: Box<dyn Clock>,
    /// A command is being executed.
    busy: bool,
    last_sample: Option<MonoTime>,
    monitor_interval: Duration,
    load_interval: Duration,
    steps_per_mm: i64,
    tick_interval: Duration,
    stats: CycleStats,
    counters: DispatchCounters,
}

impl Dispatcher {
    /// Bring up every axis and wire the tasks.
    ///
    /// Fails if any driver rejects its settings.
    pub fn new(
        config: &RigConfig,
        hardware: RigHardware,
        channel: Arc<CommandChannel>,
    ) -> Result<Self, HalError> {
        let RigHardware {
            axes,
            sensor,
            home_switch,
            clock,
        } = hardware;
        let axes = AxisRegistry::initialize(&config.axes, axes)?;

        let mut dispatcher = Self {
            channel,
            axes,
            detector: ObjectDetector::new(config.detector),
            band: BandTransport::new(config.band.timeout()),
            pumps: PumpTask::new(),
            homing: HomingSupervisor::new(config.homing),
            sensor,
            home_switch,
            clock,
            busy: false,
            last_sample: None,
            monitor_interval: config.detector.monitor_interval(),
            load_interval: config.band.load_sample_interval(),
            steps_per_mm: config.motion.steps_per_mm,
            tick_interval: Duration::from_micros(config.motion.tick_interval_us),
            stats: CycleStats::new(),
            counters: DispatchCounters::default(),
        };
        dispatcher.publish();
        info!(
            steps_per_mm = dispatcher.steps_per_mm,
            tick_us = config.motion.tick_interval_us,
            "Dispatcher ready"
        );
        Ok(dispatcher)
    }

    /// Run one dispatch tick.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        // a
        self.axes.carriage_mut().motor_mut().run();

        // b
        if !self.axes.carriage().is_moving() && !self.band.is_active() && !self.pumps.is_active() {
            self.busy = false;
        }

        // c
        if let Some(BandEvent::Finished(_)) = self.band.advance(self.axes.band_mut(), now) {
            self.busy = false;
        }

        // d
        self.sample_if_due(now);

        // e
        if self.pumps.advance(&mut self.axes, now).is_some() {
            self.busy = false;
        }

        // f
        if let Some(latched) = self.channel.take_pending() {
            self.dispatch(latched, now);
        }

        // g
        self.publish();
    }

    /// Tick until `running` clears, pacing at the configured interval.
    pub fn run(&mut self, running: &AtomicBool) -> &CycleStats {
        let mut pacer = TickPacer::new(self.tick_interval);
        info!(interval_us = self.tick_interval.as_micros() as u64, "Dispatch loop started");
        while running.load(Ordering::Acquire) {
            pacer.begin();
            self.tick();
            let elapsed = pacer.finish();
            self.stats.record(elapsed, self.tick_interval);
        }
        info!(
            ticks = self.stats.cycle_count,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            overruns = self.stats.overruns,
            "Dispatch loop stopped"
        );
        &self.stats
    }

    fn sample_if_due(&mut self, now: MonoTime) {
        let load_running = self.band.is_load_running();
        let interval = if load_running {
            self.load_interval
        } else {
            self.monitor_interval
        };
        let due = self
            .last_sample
            .is_none_or(|last| now.saturating_since(last) >= interval);
        if !due {
            return;
        }
        self.last_sample = Some(now);
        self.counters.samples += 1;

        let sample = self.sensor.sample_cm();
        let event = self.detector.update(sample);
        if event != DetectorEvent::Unchanged && event != DetectorEvent::Ignored {
            debug!(?event, sample_cm = sample, "detector transition");
        }

        if load_running && self.detector.is_arrival_reading(sample) {
            self.detector.force_arrived(sample);
            self.band.arrival_stop(self.axes.band_mut());
            info!(sample_cm = sample, "Object arrived, band stopping");
        }
    }

    fn dispatch(&mut self, latched: LatchedCommand, now: MonoTime) {
        self.counters.dispatched += 1;
        let Some(command) = latched.command() else {
            self.counters.unknown += 1;
            debug!(opcode = latched.opcode, "unknown opcode ignored");
            return;
        };

        match command {
            Command::Move { mm } => {
                self.busy = true;
                let target = mm_to_steps(mm, self.steps_per_mm);
                self.axes.carriage_mut().motor_mut().move_to(target);
                info!(mm, target, "Move");
            }
            Command::Home => self.home(),
            Command::Status => {}
            Command::Pump { id, seconds } => {
                match self.pumps.command(id, seconds, &mut self.axes, now) {
                    PumpOutcome::Started { .. } => self.busy = true,
                    PumpOutcome::Stopped { .. } | PumpOutcome::Rejected => self.busy = false,
                }
            }
            Command::Load => self.start_band(BandKind::Load, now),
            Command::Unload => self.start_band(BandKind::Unload, now),
        }
    }

    fn home(&mut self) {
        self.busy = true;
        self.homing.begin();
        self.publish();
        self.homing.run(
            self.axes.carriage_mut(),
            self.home_switch.as_mut(),
            self.clock.as_ref(),
        );
        self.busy = false;
    }

    fn start_band(&mut self, kind: BandKind, now: MonoTime) {
        self.detector.reset();
        if let Some(pump) = self.pumps.release(&mut self.axes) {
            debug!(pump = pump.get(), "pump released for band task");
        }
        self.band.start(kind, self.axes.band_mut(), now);
        self.axes.carriage_mut().motor_mut().stop();
        self.busy = true;
    }

    fn publish(&self) {
        self.channel
            .status_board()
            .publish(self.status_flags(), self.carriage_position());
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Live status flags as they would be published now.
    pub fn status_flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::BUSY, self.busy);
        flags.set(
            StatusFlags::CARRIAGE_MOVING,
            self.axes.carriage().motor().distance_to_go() != 0,
        );
        flags.set(StatusFlags::BAND_ACTIVE, self.band.is_active());
        flags.set(StatusFlags::PUMP_ACTIVE, self.pumps.is_active());
        flags.set(StatusFlags::HOMED, self.homing.is_homed());
        flags.set(StatusFlags::GLASS_PRESENT, self.detector.present());
        flags.set(StatusFlags::GLASS_MOVED, self.detector.moved());
        flags
    }

    /// Carriage position [steps].
    #[inline]
    pub fn carriage_position(&self) -> i64 {
        self.axes.carriage().motor().current_position()
    }

    /// Internal busy flag.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Axis registry.
    #[inline]
    pub fn axes(&self) -> &AxisRegistry {
        &self.axes
    }

    /// Object detector.
    #[inline]
    pub fn detector(&self) -> &ObjectDetector {
        &self.detector
    }

    /// Band task.
    #[inline]
    pub fn band(&self) -> &BandTransport {
        &self.band
    }

    /// Pump task.
    #[inline]
    pub fn pumps(&self) -> &PumpTask {
        &self.pumps
    }

    /// Homing supervisor.
    #[inline]
    pub fn homing(&self) -> &HomingSupervisor {
        &self.homing
    }

    /// Shared command channel.
    #[inline]
    pub fn channel(&self) -> &Arc<CommandChannel> {
        &self.channel
    }

    /// Tick statistics from [`Dispatcher::run`].
    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Dispatch counters.
    #[inline]
    pub fn counters(&self) -> DispatchCounters {
        self.counters
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("busy", &self.busy)
            .field("flags", &self.status_flags())
            .field("carriage_position", &self.carriage_position())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
