//! Integration test: object detection through the idle monitor.
//!
//! Samples are scripted on the simulated range sensor and taken one per
//! monitor period by the dispatch loop.

use mixmate_common::consts::INVALID_DISTANCE_CM;

use super::harness::Rig;

#[test]
fn presence_on_kth_sample() {
    let mut rig = Rig::new();
    rig.probes.sensor.push(&[4.0, 4.5, 3.5]);

    rig.monitor_samples(2);
    assert!(!rig.status().glass_present);

    rig.monitor_samples(1);
    let status = rig.status();
    assert!(status.glass_present);
    assert!(!status.glass_moved);
    assert_eq!(rig.dispatcher.detector().state().reference_cm, Some(3.5));
}

#[test]
fn interrupted_run_restarts_count() {
    let mut rig = Rig::new();
    rig.probes.sensor.push(&[4.0, 4.0, 8.0, 4.0, 4.0]);
    rig.monitor_samples(5);
    assert!(!rig.status().glass_present);

    rig.probes.sensor.push(&[4.0]);
    rig.monitor_samples(1);
    assert!(rig.status().glass_present);
}

#[test]
fn invalid_samples_do_not_break_the_run() {
    let mut rig = Rig::new();
    rig.probes
        .sensor
        .push(&[4.0, INVALID_DISTANCE_CM, 4.0, 0.0, 4.0]);
    rig.monitor_samples(4);
    assert!(!rig.status().glass_present);
    rig.monitor_samples(1);
    assert!(rig.status().glass_present);
}

#[test]
fn moved_is_sticky_until_loss() {
    let mut rig = Rig::new();
    rig.probes.sensor.push(&[4.0, 4.0, 4.0]);
    rig.monitor_samples(3);
    assert!(rig.status().glass_present);

    // Two displaced samples, then back in place: no movement yet.
    rig.probes.sensor.push(&[7.0, 7.0, 4.0]);
    rig.monitor_samples(3);
    assert!(!rig.status().glass_moved);

    rig.probes.sensor.push(&[6.5, 6.5, 6.5]);
    rig.monitor_samples(3);
    assert!(rig.status().glass_moved);

    // A single in-threshold sample does not clear it.
    rig.probes.sensor.push(&[4.0, 4.1]);
    rig.monitor_samples(2);
    let status = rig.status();
    assert!(status.glass_present);
    assert!(status.glass_moved);

    // Only loss clears it.
    rig.probes.sensor.push(&[12.0, 30.0, 12.5]);
    rig.monitor_samples(3);
    let status = rig.status();
    assert!(!status.glass_present);
    assert!(!status.glass_moved);
}

#[test]
fn brief_gap_keeps_presence() {
    let mut rig = Rig::new();
    rig.probes.sensor.push(&[4.0, 4.0, 4.0, 20.0, 20.0, 4.0, 20.0, 20.0]);
    rig.monitor_samples(8);
    assert!(rig.status().glass_present);
}

#[test]
fn sampling_runs_without_any_band_task() {
    let mut rig = Rig::new();
    rig.run_for(2_000, 50);
    // One sample per monitor period.
    assert_eq!(rig.probes.sensor.samples_taken(), 10);
    assert!(!rig.dispatcher.band().is_active());
}
