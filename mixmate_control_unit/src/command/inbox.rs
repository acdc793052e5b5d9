//! Latched command inbox.
//!
//! The bus context writes, the dispatch loop takes. There is no queue: a
//! new frame overwrites whatever is latched, dispatched or not. Move and
//! Pump parameters live in separate fields so a short frame keeps each
//! opcode's own previous values.
//!
//! Both sides touch the record only inside `Mutex::lock`, which is held for
//! a handful of field copies and never across motion or I/O. The opcode
//! that selects the read reply lives in the same record, so a read request
//! never sees a half-applied frame.

use mixmate_common::protocol::Opcode;
use parking_lot::Mutex;

use super::frame::CommandFrame;

/// "Nothing received yet" marker for the latched opcode.
pub const NO_OPCODE: u8 = u8::MAX;

/// Most recently received command plus its pending flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchedCommand {
    /// Raw opcode of the last frame, [`NO_OPCODE`] before the first one.
    pub opcode: u8,
    /// Last Move target [mm].
    pub move_mm: i16,
    /// Last raw pump id.
    pub pump_id: u8,
    /// Last pump run time [s].
    pub pump_seconds: u8,
    /// Set on receive, cleared when the dispatch loop takes it.
    pub pending: bool,
}

/// Dispatchable view of a latched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Carriage to an absolute position [mm].
    Move { mm: i16 },
    /// Blocking homing search.
    Home,
    /// Status selection; nothing to execute.
    Status,
    /// Pump start/stop with unvalidated id.
    Pump { id: u8, seconds: u8 },
    /// Band toward the load side until an object arrives.
    Load,
    /// Band away from the load side for the band timeout.
    Unload,
}

impl Default for LatchedCommand {
    fn default() -> Self {
        Self {
            opcode: NO_OPCODE,
            move_mm: 0,
            pump_id: 0,
            pump_seconds: 0,
            pending: false,
        }
    }
}

impl LatchedCommand {
    /// Resolve the opcode. `None` for unknown opcodes.
    pub fn command(&self) -> Option<Command> {
        Some(match Opcode::from_u8(self.opcode)? {
            Opcode::Move => Command::Move { mm: self.move_mm },
            Opcode::Home => Command::Home,
            Opcode::Status => Command::Status,
            Opcode::Pump => Command::Pump {
                id: self.pump_id,
                seconds: self.pump_seconds,
            },
            Opcode::Load => Command::Load,
            Opcode::Unload => Command::Unload,
        })
    }
}

/// Cross-context latch for the latest command.
#[derive(Debug, Default)]
pub struct CommandInbox {
    latched: Mutex<LatchedCommand>,
}

impl CommandInbox {
    /// Empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a decoded frame. Returns true if an undispatched command was
    /// superseded.
    pub fn latch(&self, frame: &CommandFrame) -> bool {
        let mut latched = self.latched.lock();
        let superseded = latched.pending;
        latched.opcode = frame.opcode;
        if let Some([a, b]) = frame.params {
            match frame.opcode() {
                Some(Opcode::Move) => latched.move_mm = i16::from_le_bytes([a, b]),
                Some(Opcode::Pump) => {
                    latched.pump_id = a;
                    latched.pump_seconds = b;
                }
                _ => {}
            }
        }
        latched.pending = true;
        superseded
    }

    /// Take the pending command and clear the flag in one step.
    pub fn take(&self) -> Option<LatchedCommand> {
        let mut latched = self.latched.lock();
        if !latched.pending {
            return None;
        }
        latched.pending = false;
        Some(*latched)
    }

    /// Whether the last latched frame selected the status reply.
    pub fn status_selected(&self) -> bool {
        self.latched.lock().opcode == Opcode::Status as u8
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> LatchedCommand {
        *self.latched.lock()
    }
}
