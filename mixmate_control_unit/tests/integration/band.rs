//! Integration test: Load/Unload band transport.

use mixmate_common::consts::INVALID_DISTANCE_CM;
use mixmate_common::protocol::{Opcode, PumpId};
use mixmate_control_unit::command::CommandFrame;
use mixmate_control_unit::task::BandPhase;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

/// Rig with a glass detected and displaced.
fn rig_with_moved_glass() -> Rig {
    let mut rig = Rig::new();
    rig.probes.sensor.push(&[4.0, 4.0, 4.0, 8.0, 8.0, 8.0]);
    rig.monitor_samples(6);
    let status = rig.status();
    assert!(status.glass_present && status.glass_moved);
    rig
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn unload_runs_until_timeout_then_stops() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::bare(Opcode::Unload));
    rig.tick();
    assert!(rig.status().band_active);

    rig.run_for(9_900, 100);
    assert!(rig.status().band_active);
    assert_eq!(rig.dispatcher.band().phase(), BandPhase::Running);
    assert!(rig.probes.band().position() < 0);

    rig.run_for(100, 100);
    assert_eq!(rig.dispatcher.band().phase(), BandPhase::Stopping);

    let took = rig.settle(10_000, 100);
    assert!(took > 0);
    let status = rig.status();
    assert!(!status.band_active);
    assert!(!status.busy);
    assert!(!rig.probes.band().is_moving());
}

#[test]
fn load_and_unload_reset_glass_flags() {
    for opcode in [Opcode::Load, Opcode::Unload] {
        let mut rig = rig_with_moved_glass();
        rig.send(CommandFrame::bare(opcode));
        rig.tick();
        let status = rig.status();
        assert!(!status.glass_present, "{opcode:?}");
        assert!(!status.glass_moved, "{opcode:?}");
        assert!(status.band_active);
    }
}

#[test]
fn glass_flags_clear_once_load_is_dispatched() {
    let mut rig = rig_with_moved_glass();
    rig.send(CommandFrame::bare(Opcode::Load));

    // Latched but not yet dispatched: the board still holds the last tick.
    let status = rig.status();
    assert!(status.glass_present && status.glass_moved);
    assert!(!status.band_active);

    rig.tick();
    let status = rig.status();
    assert!(!status.glass_present && !status.glass_moved);
    assert!(status.band_active);
}

#[test]
fn load_stops_on_arrival() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::bare(Opcode::Load));
    rig.tick();

    // Idle distance and invalid readings keep the band running.
    rig.probes.sensor.push(&[INVALID_DISTANCE_CM, 25.0]);
    rig.run_for(200, 100);
    assert!(rig.dispatcher.band().is_load_running());
    assert!(rig.probes.band().position() > 0);

    rig.probes.sensor.push(&[4.5]);
    rig.run_for(100, 100);
    let status = rig.status();
    assert!(status.glass_present);
    assert!(!status.glass_moved);
    assert_eq!(rig.dispatcher.band().phase(), BandPhase::Stopping);
    assert_eq!(rig.dispatcher.detector().state().reference_cm, Some(4.5));

    // Keep the glass in view while the band decelerates.
    rig.probes.sensor.set_idle(4.5);
    rig.settle(10_000, 100);
    let status = rig.status();
    assert!(!status.band_active);
    assert!(status.glass_present);
}

#[test]
fn load_without_arrival_keeps_running() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::bare(Opcode::Load));
    rig.run_for(30_000, 100);
    assert!(rig.dispatcher.band().is_load_running());
    assert!(rig.status().band_active);
    assert!(rig.status().busy);
}

#[test]
fn band_task_releases_pump_and_stops_carriage() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::pump(2, 30));
    rig.tick();
    rig.send(CommandFrame::move_to(200));
    rig.run_for(1_000, 50);
    let carriage_before = rig.probes.carriage().position();

    rig.send(CommandFrame::bare(Opcode::Load));
    rig.tick();
    assert!(!rig.dispatcher.pumps().is_active());
    assert_eq!(rig.probes.pump(PumpId::new(2).unwrap()).speed(), 0.0);

    // Carriage decelerates instead of finishing the 3400-step move.
    rig.run_for(5_000, 50);
    let carriage_after = rig.probes.carriage().position();
    assert!(carriage_after > carriage_before);
    assert!(carriage_after < 200 * 17);
    assert!(!rig.probes.carriage().is_moving());
}

#[test]
fn new_band_command_supersedes_running_task() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::bare(Opcode::Load));
    rig.run_for(1_000, 100);
    rig.send(CommandFrame::bare(Opcode::Unload));
    rig.tick();
    assert_eq!(rig.dispatcher.band().phase(), BandPhase::Running);
    assert!(!rig.dispatcher.band().is_load_running());
    assert!(rig.probes.band().target() < rig.probes.band().position());
}
