//! Bus-facing command channel.
//!
//! `on_receive` and `on_request` run in the bus-event context and must stay
//! short: they touch only the inbox critical section and the status board
//! atomics. The dispatch loop holds the same `Arc` and calls
//! [`CommandChannel::take_pending`] / [`CommandChannel::status_board`].

use heapless::Vec;
use mixmate_common::consts::{ACK_BYTE, STATUS_FRAME_LEN};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

use super::frame::CommandFrame;
use super::inbox::{CommandInbox, LatchedCommand};
use super::status::StatusBoard;

/// Reply to a read request: status frame or single ack byte.
pub type BusResponse = Vec<u8, STATUS_FRAME_LEN>;

/// Bus-context counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCounters {
    /// Non-empty frames latched.
    pub frames: u64,
    /// Latched frames that replaced an undispatched one.
    pub superseded: u64,
    /// Read requests served.
    pub requests: u64,
}

/// Shared command channel between bus context and dispatch loop.
#[derive(Debug)]
pub struct CommandChannel {
    inbox: CommandInbox,
    board: StatusBoard,
    frames: AtomicU64,
    superseded: AtomicU64,
    requests: AtomicU64,
}

impl CommandChannel {
    /// Channel whose status frames scale positions by `steps_per_mm`.
    pub fn new(steps_per_mm: i64) -> Self {
        Self {
            inbox: CommandInbox::new(),
            board: StatusBoard::new(steps_per_mm),
            frames: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
            requests: AtomicU64::new(0),
        }
    }

    /// Handle a write frame from the host.
    ///
    /// Empty frames are dropped. Anything else is latched, replacing any
    /// command the dispatch loop has not taken yet.
    pub fn on_receive(&self, raw: &[u8]) {
        let Some(frame) = CommandFrame::decode(raw) else {
            return;
        };
        if self.inbox.latch(&frame) {
            self.superseded.fetch_add(1, Ordering::Relaxed);
        }
        self.frames.fetch_add(1, Ordering::Relaxed);
        trace!(opcode = frame.opcode, discarded = frame.discarded, "frame latched");
    }

    /// Handle a read request from the host.
    pub fn on_request(&self) -> BusResponse {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let mut out = BusResponse::new();
        if self.inbox.status_selected() {
            let frame = self.board.system_status().to_frame();
            // Capacity is exactly one status frame.
            let _ = out.extend_from_slice(&frame);
        } else {
            let _ = out.push(ACK_BYTE);
        }
        out
    }

    /// Take the pending command, if any.
    #[inline]
    pub fn take_pending(&self) -> Option<LatchedCommand> {
        self.inbox.take()
    }

    /// Board the dispatch loop publishes to.
    #[inline]
    pub fn status_board(&self) -> &StatusBoard {
        &self.board
    }

    /// Copy of the latched record.
    pub fn latched(&self) -> LatchedCommand {
        self.inbox.snapshot()
    }

    /// Bus-context counters.
    pub fn counters(&self) -> ChannelCounters {
        ChannelCounters {
            frames: self.frames.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
        }
    }
}
