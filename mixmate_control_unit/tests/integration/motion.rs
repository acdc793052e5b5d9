//! Integration test: carriage Move commands.

use mixmate_common::consts::DEFAULT_STEPS_PER_MM;
use mixmate_common::control_unit::config::RigConfig;
use mixmate_control_unit::command::CommandFrame;
use mixmate_hal::SimulatedRig;

use super::harness::Rig;

#[test]
fn move_round_trip_within_one_unit() {
    let mut rig = Rig::new();
    for mm in [10i16, 123, -40, 0, 350] {
        rig.send(CommandFrame::move_to(mm));
        rig.settle(60_000, 10);
        let reported = rig.status().position_mm;
        assert!(
            (reported - mm).abs() <= 1,
            "commanded {mm} mm, reported {reported} mm"
        );
        assert_eq!(
            rig.probes.carriage().position(),
            i64::from(mm) * DEFAULT_STEPS_PER_MM
        );
    }
}

#[test]
fn move_allowed_before_homing() {
    let mut rig = Rig::new();
    assert!(!rig.status().homed);
    rig.send(CommandFrame::move_to(5));
    rig.settle(10_000, 10);
    assert_eq!(rig.status().position_mm, 5);
    assert!(!rig.status().homed);
}

#[test]
fn busy_while_carriage_travels() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(60));
    rig.tick();
    rig.run_for(500, 10);
    let status = rig.status();
    assert!(status.busy);
    assert!(!status.band_active);

    let took = rig.settle(30_000, 10);
    assert!(took > 1_000);
    assert!(!rig.dispatcher.is_busy());
}

#[test]
fn new_target_replaces_old() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(200));
    rig.run_for(300, 10);
    rig.send(CommandFrame::move_to(20));
    rig.settle(30_000, 10);
    assert_eq!(rig.probes.carriage().position(), 20 * DEFAULT_STEPS_PER_MM);
}

#[test]
fn reported_position_truncates_toward_zero() {
    let mut rig = Rig::with(
        SimulatedRig::builder().carriage_start(-50),
        RigConfig::default(),
    );
    rig.tick();
    // -50 / 17 = -2.94
    assert_eq!(rig.status().position_mm, -2);
}
