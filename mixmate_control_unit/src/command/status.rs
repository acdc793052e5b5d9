//! Status board.
//!
//! Written by the dispatch loop at the end of every tick, read by the bus
//! context when the host asks for a status frame. Flags and position are
//! two independent atomics; a reader may see a position one tick newer than
//! the flags, never a torn value.
//!
//! A status frame is built from the board on every read request, so it is
//! as fresh as the last completed tick. A command latched since then is not
//! reflected until the dispatch loop has taken it and published again: a
//! read between a Load frame and its dispatch still shows the old glass
//! flags.

use mixmate_common::control_unit::state::StatusFlags;
use mixmate_common::protocol::{SystemStatus, steps_to_reported_mm};
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

/// Live values published for the bus context.
#[derive(Debug)]
pub struct StatusBoard {
    flags: AtomicU8,
    position_steps: AtomicI64,
    steps_per_mm: i64,
}

impl StatusBoard {
    /// Board reporting positions with `steps_per_mm`.
    pub fn new(steps_per_mm: i64) -> Self {
        Self {
            flags: AtomicU8::new(0),
            position_steps: AtomicI64::new(0),
            steps_per_mm: steps_per_mm.max(1),
        }
    }

    /// Publish the dispatch loop's current view.
    #[inline]
    pub fn publish(&self, flags: StatusFlags, position_steps: i64) {
        self.position_steps.store(position_steps, Ordering::Relaxed);
        self.flags.store(flags.bits(), Ordering::Release);
    }

    /// Last published flags.
    #[inline]
    pub fn flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Last published carriage position [steps].
    #[inline]
    pub fn position_steps(&self) -> i64 {
        self.position_steps.load(Ordering::Relaxed)
    }

    /// Derive the status frame contents.
    pub fn system_status(&self) -> SystemStatus {
        let flags = self.flags();
        SystemStatus {
            busy: flags.reported_busy(),
            band_active: flags.contains(StatusFlags::BAND_ACTIVE),
            position_mm: steps_to_reported_mm(self.position_steps(), self.steps_per_mm),
            homed: flags.contains(StatusFlags::HOMED),
            glass_present: flags.contains(StatusFlags::GLASS_PRESENT),
            glass_moved: flags.contains(StatusFlags::GLASS_MOVED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_is_idle_at_zero() {
        let board = StatusBoard::new(17);
        assert_eq!(board.system_status(), SystemStatus::default());
    }

    #[test]
    fn busy_is_derived_from_activity() {
        let board = StatusBoard::new(17);
        board.publish(StatusFlags::PUMP_ACTIVE | StatusFlags::HOMED, 1700);
        let status = board.system_status();
        assert!(status.busy);
        assert!(!status.band_active);
        assert!(status.homed);
        assert_eq!(status.position_mm, 100);

        board.publish(StatusFlags::GLASS_PRESENT | StatusFlags::GLASS_MOVED, -1716);
        let status = board.system_status();
        assert!(!status.busy);
        assert!(status.glass_present && status.glass_moved);
        assert_eq!(status.position_mm, -100);
    }

    #[test]
    fn reads_repeat_the_last_publish() {
        let board = StatusBoard::new(17);
        board.publish(StatusFlags::GLASS_PRESENT, 340);
        let first = board.system_status();
        assert_eq!(board.system_status(), first);

        board.publish(StatusFlags::empty(), 340);
        assert!(!board.system_status().glass_present);
    }

    #[test]
    fn band_active_counts_as_busy() {
        let board = StatusBoard::new(17);
        board.publish(StatusFlags::BAND_ACTIVE, 0);
        let status = board.system_status();
        assert!(status.busy && status.band_active);
    }
}
