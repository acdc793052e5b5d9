//! State enums and status flags for the control unit.
//!
//! `HomingState` and `AxisRole` are `#[repr(u8)]`-style compact types;
//! `StatusFlags` is the packed form of the live status values the dispatch
//! loop publishes for the bus context.

use bitflags::bitflags;

use crate::consts::{BAND_AXIS, CARRIAGE_AXIS, PUMP_AXIS_BASE, PUMP_COUNT};
use crate::protocol::PumpId;

// ─── Homing ─────────────────────────────────────────────────────────

/// Carriage reference state for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HomingState {
    /// Never homed since power-on.
    #[default]
    Idle = 0,
    /// Search in progress (blocking).
    Homing = 1,
    /// Switch found, position zeroed.
    Homed = 2,
    /// Timed out; position untouched.
    Failed = 3,
}

impl HomingState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Homing),
            2 => Some(Self::Homed),
            3 => Some(Self::Failed),
            _ => None,
        }
    }

    /// `homed` as reported on the wire.
    #[inline]
    pub const fn is_homed(self) -> bool {
        matches!(self, Self::Homed)
    }
}

// ─── Axis roles ─────────────────────────────────────────────────────

/// What a registry slot drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// Linear carriage, index 0.
    Carriage,
    /// Conveyor band, index 1.
    Band,
    /// Dosing pump, indices 2..=11.
    Pump(PumpId),
}

impl AxisRole {
    /// Role of a registry index. `None` beyond the rig's axis count.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            CARRIAGE_AXIS => Some(Self::Carriage),
            BAND_AXIS => Some(Self::Band),
            i if i >= PUMP_AXIS_BASE && i < PUMP_AXIS_BASE + PUMP_COUNT => {
                match PumpId::new((i - PUMP_AXIS_BASE + 1) as u8) {
                    Some(id) => Some(Self::Pump(id)),
                    None => None,
                }
            }
            _ => None,
        }
    }

    /// Registry index of this role.
    pub const fn index(self) -> usize {
        match self {
            Self::Carriage => CARRIAGE_AXIS,
            Self::Band => BAND_AXIS,
            Self::Pump(id) => id.axis_index(),
        }
    }
}

impl core::fmt::Display for AxisRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Carriage => f.write_str("carriage"),
            Self::Band => f.write_str("band"),
            Self::Pump(id) => write!(f, "pump{}", id.get()),
        }
    }
}

// ─── Status flags ───────────────────────────────────────────────────

bitflags! {
    /// Live boolean status published by the dispatch loop.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u8 {
        /// A command is being executed.
        const BUSY            = 0x01;
        /// Carriage has distance to go.
        const CARRIAGE_MOVING = 0x02;
        /// A band task is in flight.
        const BAND_ACTIVE     = 0x04;
        /// A pump owns its axis.
        const PUMP_ACTIVE     = 0x08;
        /// Homing succeeded this session.
        const HOMED           = 0x10;
        /// Detector reports an object.
        const GLASS_PRESENT   = 0x20;
        /// Detector reports displacement.
        const GLASS_MOVED     = 0x40;
    }
}

impl StatusFlags {
    /// Busy as reported to the host: any in-flight work counts.
    #[inline]
    pub const fn reported_busy(self) -> bool {
        self.intersects(
            Self::BUSY
                .union(Self::CARRIAGE_MOVING)
                .union(Self::BAND_ACTIVE)
                .union(Self::PUMP_ACTIVE),
        )
    }
}
