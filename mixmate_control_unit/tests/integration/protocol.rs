//! Integration test: host bus protocol end to end.
//!
//! Frames enter through the command channel (and once through the UDP
//! bridge); responses are checked byte for byte.

use mixmate_common::consts::{ACK_BYTE, DEFAULT_STEPS_PER_MM, STATUS_FRAME_LEN};
use mixmate_common::protocol::{Opcode, SystemStatus};
use mixmate_control_unit::bus::BusBridge;
use mixmate_control_unit::command::CommandFrame;
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::harness::Rig;

#[test]
fn read_after_non_status_command_is_ack() {
    let mut rig = Rig::new();
    assert_eq!(rig.request().as_slice(), &[ACK_BYTE]);

    rig.send(CommandFrame::move_to(3));
    rig.tick();
    assert_eq!(rig.request().as_slice(), &[ACK_BYTE]);

    rig.send(CommandFrame::pump(1, 0));
    assert_eq!(rig.request().as_slice(), &[ACK_BYTE]);
}

#[test]
fn status_frame_layout() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(30));
    rig.settle(20_000, 10);
    rig.send(CommandFrame::bare(Opcode::Unload));
    rig.tick();

    rig.send(CommandFrame::bare(Opcode::Status));
    rig.tick();
    let frame = rig.request();
    assert_eq!(frame.len(), STATUS_FRAME_LEN);
    let [lo, hi] = 30i16.to_le_bytes();
    assert_eq!(frame.as_slice(), &[1, 1, lo, hi, 0, 0, 0]);

    // Every further read repeats the status until another command arrives.
    assert_eq!(rig.request().len(), STATUS_FRAME_LEN);
    rig.send(CommandFrame::bare(Opcode::Load));
    assert_eq!(rig.request().as_slice(), &[ACK_BYTE]);
}

#[test]
fn negative_position_is_twos_complement() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(-12));
    rig.settle(20_000, 10);
    rig.send(CommandFrame::bare(Opcode::Status));
    let status = SystemStatus::from_frame(&rig.request()).unwrap();
    assert_eq!(status.position_mm, -12);
}

#[test]
fn short_frame_keeps_previous_parameters() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(15));
    rig.settle(20_000, 10);

    rig.send_raw(&[Opcode::Move as u8]);
    rig.settle(20_000, 10);
    assert_eq!(rig.probes.carriage().position(), 15 * DEFAULT_STEPS_PER_MM);

    rig.send(CommandFrame::pump(4, 2));
    rig.tick();
    rig.send_raw(&[Opcode::Pump as u8, 7]);
    assert_eq!(rig.channel.latched().pump_id, 4);
    assert_eq!(rig.channel.latched().pump_seconds, 2);
}

#[test]
fn trailing_bytes_are_discarded() {
    let mut rig = Rig::new();
    rig.send_raw(&[Opcode::Pump as u8, 4, 2, 0xAA, 0xBB, 0xCC]);
    rig.tick();
    assert_eq!(rig.dispatcher.pumps().active().unwrap().id.get(), 4);
    assert_eq!(rig.settle(10_000, 100), 2_000);
}

#[test]
fn latest_command_wins() {
    let mut rig = Rig::new();
    rig.send(CommandFrame::move_to(40));
    rig.send(CommandFrame::move_to(10));
    rig.settle(20_000, 10);
    assert_eq!(rig.probes.carriage().position(), 10 * DEFAULT_STEPS_PER_MM);
    assert_eq!(rig.dispatcher.counters().dispatched, 1);
    assert_eq!(rig.channel.counters().superseded, 1);
}

#[test]
fn empty_write_is_drained() {
    let mut rig = Rig::new();
    rig.send_raw(&[]);
    rig.tick();
    assert_eq!(rig.channel.counters().frames, 0);
    assert_eq!(rig.dispatcher.counters().dispatched, 0);
}

#[test]
fn status_over_udp_bridge() {
    let mut rig = Rig::new();
    let bridge = BusBridge::bind("127.0.0.1:0", Arc::clone(&rig.channel)).unwrap();
    let addr = bridge.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let thread = bridge.spawn(Arc::clone(&running)).unwrap();

    let host = UdpSocket::bind("127.0.0.1:0").unwrap();
    host.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    host.send_to(&CommandFrame::move_to(2).encode(), addr).unwrap();

    // Tick until the bridge has latched and the loop has dispatched it.
    let deadline = Instant::now() + Duration::from_secs(2);
    while rig.dispatcher.counters().dispatched == 0 {
        assert!(Instant::now() < deadline, "frame never arrived");
        rig.run_for(10, 10);
        std::thread::sleep(Duration::from_millis(1));
    }
    rig.settle(20_000, 10);

    host.send_to(&[Opcode::Status as u8], addr).unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    while rig.channel.counters().frames < 2 {
        assert!(Instant::now() < deadline, "status frame never arrived");
        std::thread::sleep(Duration::from_millis(1));
    }
    host.send_to(&[], addr).unwrap();

    let mut buf = [0u8; 16];
    let (len, _) = host.recv_from(&mut buf).unwrap();
    let status = SystemStatus::from_frame(&buf[..len]).unwrap();
    assert_eq!(status.position_mm, 2);
    assert!(!status.busy);

    running.store(false, Ordering::Release);
    thread.join().unwrap();
}
