//! Shared rig fixture for the integration tests.

use mixmate_common::control_unit::config::RigConfig;
use mixmate_common::protocol::SystemStatus;
use mixmate_control_unit::command::{BusResponse, CommandChannel, CommandFrame};
use mixmate_control_unit::dispatch::Dispatcher;
use mixmate_hal::{RigProbes, SimulatedRig, SimulatedRigBuilder};
use std::sync::Arc;

/// Monitor sampling period with the default configuration [ms].
pub const MONITOR_MS: u64 = 200;

/// Dispatcher, channel and probes of one simulated rig.
pub struct Rig {
    pub dispatcher: Dispatcher,
    pub channel: Arc<CommandChannel>,
    pub probes: RigProbes,
}

impl Rig {
    pub fn new() -> Self {
        Self::with(SimulatedRig::builder(), RigConfig::default())
    }

    pub fn with(builder: SimulatedRigBuilder, config: RigConfig) -> Self {
        let (hardware, probes) = builder.build().into_parts();
        let channel = Arc::new(CommandChannel::new(config.motion.steps_per_mm));
        let dispatcher = Dispatcher::new(&config, hardware, Arc::clone(&channel)).unwrap();
        Self {
            dispatcher,
            channel,
            probes,
        }
    }

    /// Host write.
    pub fn send(&self, frame: CommandFrame) {
        self.channel.on_receive(&frame.encode());
    }

    /// Host write of raw bytes.
    pub fn send_raw(&self, raw: &[u8]) {
        self.channel.on_receive(raw);
    }

    /// Host read.
    pub fn request(&self) -> BusResponse {
        self.channel.on_request()
    }

    /// Published status without touching the last opcode.
    pub fn status(&self) -> SystemStatus {
        self.channel.status_board().system_status()
    }

    pub fn tick(&mut self) {
        self.dispatcher.tick();
    }

    /// Advance simulated time by `ms` in `step_ms` ticks.
    pub fn run_for(&mut self, ms: u64, step_ms: u64) {
        let mut elapsed = 0;
        while elapsed < ms {
            self.probes.clock.advance(step_ms);
            self.dispatcher.tick();
            elapsed += step_ms;
        }
    }

    /// Tick in `step_ms` steps until the host would see `busy == false`.
    ///
    /// Always ticks at least once so a freshly sent command is dispatched.
    /// Returns the simulated time it took.
    pub fn settle(&mut self, limit_ms: u64, step_ms: u64) -> u64 {
        let mut elapsed = 0;
        loop {
            self.probes.clock.advance(step_ms);
            self.dispatcher.tick();
            elapsed += step_ms;
            if !self.status().busy {
                return elapsed;
            }
            assert!(elapsed < limit_ms, "rig still busy after {limit_ms} ms");
        }
    }

    /// Run `n` ticks spaced one monitor period apart, each taking a sample.
    pub fn monitor_samples(&mut self, n: usize) {
        for _ in 0..n {
            self.probes.clock.advance(MONITOR_MS);
            self.dispatcher.tick();
        }
    }
}
