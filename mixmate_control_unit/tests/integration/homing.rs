//! Integration test: homing through the command channel.
//!
//! Home blocks one dispatch tick; the simulated clock auto-steps on every
//! read so the search makes progress.

use mixmate_common::control_unit::config::RigConfig;
use mixmate_common::control_unit::state::HomingState;
use mixmate_common::protocol::Opcode;
use mixmate_control_unit::command::CommandFrame;
use mixmate_hal::SimulatedRig;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn short_timeout() -> RigConfig {
    let mut config = RigConfig::default();
    config.homing.timeout_ms = 1_500;
    config
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn switch_reached_sets_homed_and_zero() {
    let mut rig = Rig::with(
        SimulatedRig::builder().carriage_start(850).home_switch_at(-10),
        RigConfig::default(),
    );
    rig.probes.clock.set_auto_step(1);
    assert!(!rig.status().homed);

    rig.send(CommandFrame::bare(Opcode::Home));
    rig.tick();

    let status = rig.status();
    assert!(status.homed);
    assert!(!status.busy);
    assert_eq!(status.position_mm, 0);
    assert_eq!(rig.probes.carriage().position(), 0);
    assert_eq!(rig.dispatcher.homing().state(), HomingState::Homed);
    assert!(rig.probes.home_polls() > 1);
}

#[test]
fn switch_never_reached_leaves_unhomed() {
    let mut rig = Rig::with(
        SimulatedRig::builder()
            .carriage_start(5_000)
            .without_home_switch(),
        short_timeout(),
    );
    rig.probes.clock.set_auto_step(1);

    rig.send(CommandFrame::bare(Opcode::Home));
    rig.tick();

    let status = rig.status();
    assert!(!status.homed);
    assert!(!status.busy);
    assert_eq!(rig.dispatcher.homing().state(), HomingState::Failed);
    // Position moved toward the switch but was not redefined.
    let position = rig.probes.carriage().position();
    assert!(position < 5_000 && position > 4_000);
    // Carriage configuration restored.
    assert_eq!(rig.probes.carriage().max_speed(), 2000.0);
    assert_eq!(rig.probes.carriage().acceleration(), 500.0);
}

#[test]
fn failed_rehome_clears_homed() {
    let mut rig = Rig::with(SimulatedRig::builder(), short_timeout());
    rig.probes.clock.set_auto_step(1);
    rig.send(CommandFrame::bare(Opcode::Home));
    rig.tick();
    assert!(rig.status().homed);

    // Park the carriage far away from the switch and let it arrive.
    rig.probes.clock.set_auto_step(0);
    rig.send(CommandFrame::move_to(100));
    rig.settle(20_000, 10);
    rig.probes.clock.set_auto_step(1);

    // 1.5 s at 400 steps/s cannot cover 1700 steps.
    rig.send(CommandFrame::bare(Opcode::Home));
    rig.tick();
    assert!(!rig.status().homed);
}

#[test]
fn move_after_homing_uses_new_origin() {
    let mut rig = Rig::with(
        SimulatedRig::builder().carriage_start(400).home_switch_at(-50),
        RigConfig::default(),
    );
    rig.probes.clock.set_auto_step(1);
    rig.send(CommandFrame::bare(Opcode::Home));
    rig.tick();
    rig.probes.clock.set_auto_step(0);

    rig.send(CommandFrame::move_to(20));
    rig.settle(20_000, 10);
    assert_eq!(rig.probes.carriage().position(), 340);
    assert_eq!(rig.status().position_mm, 20);
}
