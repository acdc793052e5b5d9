//! # MIXmate Control Unit
//!
//! Loads the rig configuration, wires the simulated rig, starts the UDP bus
//! bridge and enters the dispatch loop until Ctrl-C.

use clap::Parser;
use mixmate_control_unit::bus::BusBridge;
use mixmate_control_unit::command::CommandChannel;
use mixmate_control_unit::config::{LoadedConfig, Overrides, load_config};
use mixmate_control_unit::cycle::rt_setup;
use mixmate_control_unit::dispatch::Dispatcher;
use mixmate_control_unit::error::RigError;
use mixmate_hal::{SimClock, SimulatedRig};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// MIXmate Control Unit: command dispatch for the drink rig
#[derive(Parser, Debug)]
#[command(name = "mixmate_control_unit")]
#[command(version)]
#[command(about = "Command dispatch loop for the MIXmate drink rig")]
struct Args {
    /// Path to the rig configuration TOML.
    #[arg(long, value_name = "FILE", default_value = "config/mixmate.toml")]
    config: PathBuf,

    /// UDP endpoint of the bus bridge (overrides `[bus] bind`).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// CPU core to pin the dispatch thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority of the dispatch thread.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let overrides = Overrides {
        bind: args.bind.clone(),
    };
    let loaded = load_config(&args.config, &overrides);

    let directive = match (&loaded, args.verbose) {
        (_, true) => "debug",
        (Ok(l), false) => l.rig.shared.log_level.as_directive(),
        (Err(_), false) => "info",
    };
    setup_tracing(directive, args.json);

    info!("MIXmate Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded.map_err(RigError::from).and_then(|l| run(&args, l));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("MIXmate Control Unit shutdown complete");
}

fn run(args: &Args, loaded: LoadedConfig) -> Result<(), RigError> {
    let rig = loaded.rig;
    info!(
        path = %loaded.source.display(),
        service = %rig.shared.service_name,
        address = format_args!("{:#04x}", rig.bus.address),
        steps_per_mm = rig.motion.steps_per_mm,
        "Config OK"
    );

    let (hardware, _probes) = SimulatedRig::builder()
        .clock(SimClock::wall())
        .build()
        .into_parts();
    warn!("No rig hardware backend configured, running the simulated rig");

    let channel = Arc::new(CommandChannel::new(rig.motion.steps_per_mm));
    let mut dispatcher = Dispatcher::new(&rig, hardware, Arc::clone(&channel))?;

    let running = Arc::new(AtomicBool::new(true));
    let bridge = BusBridge::bind(&rig.bus.bind, channel)?;
    let bus_thread = bridge.spawn(Arc::clone(&running))?;

    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        cpu_core = args.cpu_core,
        priority = args.rt_priority,
        "RT setup complete"
    );

    let stats = dispatcher.run(&running).clone();
    let counters = dispatcher.counters();
    info!(
        ticks = stats.cycle_count,
        min_ns = stats.min_cycle_ns,
        avg_ns = stats.avg_cycle_ns(),
        max_ns = stats.max_cycle_ns,
        overruns = stats.overruns,
        commands = counters.dispatched,
        unknown = counters.unknown,
        "Cycle statistics"
    );

    if bus_thread.join().is_err() {
        warn!("bus bridge thread panicked");
    }
    Ok(())
}

/// Setup tracing subscriber; `RUST_LOG` replaces the base directive when set.
fn setup_tracing(directive: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
