//! Host bus wire protocol.
//!
//! Command frames are `[opcode, param0, param1]` with the parameters only
//! present for Move and Pump. The status response is a fixed 7-byte frame:
//!
//! | Byte | Field           |
//! |------|-----------------|
//! | 0    | busy            |
//! | 1    | band_active     |
//! | 2    | position low    |
//! | 3    | position high   |
//! | 4    | homed           |
//! | 5    | glass_present   |
//! | 6    | glass_moved     |

use static_assertions::const_assert_eq;

use crate::consts::{PUMP_AXIS_BASE, PUMP_COUNT, STATUS_FRAME_LEN};

// ─── Opcodes ────────────────────────────────────────────────────────

/// Command opcode (byte 0 of every frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Move the carriage to an absolute millimetre position.
    Move = 0,
    /// Run the blocking homing search.
    Home = 1,
    /// Select the status frame for the next read request.
    Status = 2,
    /// Start or stop a pump.
    Pump = 3,
    /// Run the band toward the load side until an object arrives.
    Load = 4,
    /// Run the band away from the load side for a fixed time.
    Unload = 5,
}

impl Opcode {
    /// Convert from the raw wire byte. Returns `None` for unknown opcodes.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Move),
            1 => Some(Self::Home),
            2 => Some(Self::Status),
            3 => Some(Self::Pump),
            4 => Some(Self::Load),
            5 => Some(Self::Unload),
            _ => None,
        }
    }

    /// Returns true if the opcode carries two parameter bytes.
    #[inline]
    pub const fn has_params(self) -> bool {
        matches!(self, Self::Move | Self::Pump)
    }
}

// ─── Pump ids ───────────────────────────────────────────────────────

/// Validated pump identifier in `1..=PUMP_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PumpId(u8);

impl PumpId {
    /// Validate a raw wire id. Out-of-range ids are rejected.
    #[inline]
    pub const fn new(raw: u8) -> Option<Self> {
        if raw >= 1 && raw as usize <= PUMP_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw 1-based id.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Axis registry index driving this pump.
    #[inline]
    pub const fn axis_index(self) -> usize {
        PUMP_AXIS_BASE + self.0 as usize - 1
    }

    /// Iterate over every pump on the rig.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=PUMP_COUNT as u8).map(Self)
    }
}

// ─── Status frame ───────────────────────────────────────────────────

/// Status snapshot as transmitted to the host.
///
/// Derived on every request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemStatus {
    /// Any motion or task is in progress.
    pub busy: bool,
    /// A band task is in flight.
    pub band_active: bool,
    /// Carriage position [mm].
    pub position_mm: i16,
    /// Homing completed successfully in this session.
    pub homed: bool,
    /// An object sits in front of the range sensor.
    pub glass_present: bool,
    /// The present object moved away from its arrival position.
    pub glass_moved: bool,
}

const_assert_eq!(STATUS_FRAME_LEN, 7);

impl SystemStatus {
    /// Serialize into the fixed wire frame.
    pub fn to_frame(&self) -> [u8; STATUS_FRAME_LEN] {
        let [lo, hi] = self.position_mm.to_le_bytes();
        [
            self.busy as u8,
            self.band_active as u8,
            lo,
            hi,
            self.homed as u8,
            self.glass_present as u8,
            self.glass_moved as u8,
        ]
    }

    /// Parse a wire frame. Returns `None` if the frame is too short.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        if frame.len() < STATUS_FRAME_LEN {
            return None;
        }
        Some(Self {
            busy: frame[0] != 0,
            band_active: frame[1] != 0,
            position_mm: i16::from_le_bytes([frame[2], frame[3]]),
            homed: frame[4] != 0,
            glass_present: frame[5] != 0,
            glass_moved: frame[6] != 0,
        })
    }
}

/// Convert carriage steps to the reported millimetre value.
///
/// Integer division truncates toward zero; the result is clamped to ±32767.
#[inline]
pub fn steps_to_reported_mm(steps: i64, steps_per_mm: i64) -> i16 {
    let mm = steps / steps_per_mm.max(1);
    mm.clamp(-(i16::MAX as i64), i16::MAX as i64) as i16
}

/// Convert a commanded millimetre target to carriage steps.
#[inline]
pub fn mm_to_steps(mm: i16, steps_per_mm: i64) -> i64 {
    i64::from(mm) * steps_per_mm
}
