//! Integration test: pump ownership and timing.

use mixmate_common::protocol::PumpId;
use mixmate_control_unit::command::CommandFrame;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn pump(n: u8) -> PumpId {
    PumpId::new(n).unwrap()
}

fn running_pumps(rig: &Rig) -> Vec<u8> {
    PumpId::all()
        .filter(|&id| rig.probes.pump(id).speed() != 0.0)
        .map(PumpId::get)
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn second_pump_takes_ownership() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::pump(1, 3));
    rig.run_for(500, 50);
    assert_eq!(running_pumps(&rig), vec![1]);

    rig.send(CommandFrame::pump(2, 5));
    rig.tick();
    assert_eq!(rig.probes.pump(pump(1)).speed(), 0.0);
    assert_eq!(running_pumps(&rig), vec![2]);
    assert_eq!(rig.dispatcher.pumps().active().unwrap().id, pump(2));
}

#[test]
fn at_most_one_pump_at_any_time() {
    let mut rig = Rig::new();
    let script: [(u8, u8); 8] = [(1, 3), (4, 2), (4, 0), (9, 1), (10, 4), (3, 0), (2, 2), (7, 5)];
    for (id, seconds) in script {
        rig.send(CommandFrame::pump(id, seconds));
        for _ in 0..10 {
            rig.run_for(100, 100);
            assert!(running_pumps(&rig).len() <= 1);
        }
    }
}

#[test]
fn run_lasts_exactly_the_duration() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::pump(6, 3));
    rig.tick();
    assert!(rig.status().busy);

    let took = rig.settle(10_000, 50);
    assert_eq!(took, 3_000);
    assert_eq!(rig.probes.pump(pump(6)).position(), 6_000);
    assert!(!rig.dispatcher.pumps().is_active());
}

#[test]
fn zero_duration_is_idempotent() {
    let mut rig = Rig::new();
    for _ in 0..3 {
        rig.send(CommandFrame::pump(8, 0));
        rig.tick();
        assert_eq!(rig.probes.pump(pump(8)).speed(), 0.0);
        assert!(!rig.status().busy);
    }
    assert!(running_pumps(&rig).is_empty());
}

#[test]
fn zero_duration_stops_active_pump() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::pump(5, 20));
    rig.run_for(1_000, 100);
    rig.send(CommandFrame::pump(5, 0));
    rig.tick();
    assert!(running_pumps(&rig).is_empty());
    assert!(!rig.dispatcher.pumps().is_active());
    assert!(!rig.status().busy);
}

#[test]
fn out_of_range_ids_do_nothing() {
    let mut rig = Rig::new();
    for id in [0u8, 11, 0xFF] {
        rig.send(CommandFrame::pump(id, 5));
        rig.tick();
        assert!(running_pumps(&rig).is_empty());
        assert!(!rig.status().busy);
    }
}
