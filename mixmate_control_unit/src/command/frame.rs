//! Command frame decoding and encoding.
//!
//! A frame is `[opcode, param0, param1]`. Only Move and Pump carry
//! parameters; a short frame simply has none. Bytes beyond the parameters
//! are counted and dropped.

use heapless::Vec;
use mixmate_common::consts::PARAM_LEN;
use mixmate_common::protocol::Opcode;
use static_assertions::const_assert_eq;

/// Longest frame the rig understands.
pub const MAX_FRAME_LEN: usize = 1 + PARAM_LEN;

const_assert_eq!(MAX_FRAME_LEN, 3);

/// One decoded write frame. Transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// Raw opcode byte (unknown values are kept).
    pub opcode: u8,
    /// Parameter bytes, present only for Move/Pump frames of full length.
    pub params: Option<[u8; PARAM_LEN]>,
    /// Bytes discarded after the parameters.
    pub discarded: usize,
}

impl CommandFrame {
    /// Decode a raw frame. `None` for an empty frame.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        let (&opcode, rest) = raw.split_first()?;
        let wants_params = Opcode::from_u8(opcode).is_some_and(Opcode::has_params);

        let (params, used) = if wants_params && rest.len() >= PARAM_LEN {
            (Some([rest[0], rest[1]]), PARAM_LEN)
        } else {
            (None, 0)
        };

        Some(Self {
            opcode,
            params,
            discarded: rest.len() - used,
        })
    }

    /// Known opcode, if any.
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }

    /// Move frame to an absolute millimetre target.
    pub fn move_to(mm: i16) -> Self {
        let [lo, hi] = mm.to_le_bytes();
        Self {
            opcode: Opcode::Move as u8,
            params: Some([lo, hi]),
            discarded: 0,
        }
    }

    /// Pump frame for a raw id and run time in seconds.
    pub fn pump(id: u8, seconds: u8) -> Self {
        Self {
            opcode: Opcode::Pump as u8,
            params: Some([id, seconds]),
            discarded: 0,
        }
    }

    /// Parameterless frame.
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode: opcode as u8,
            params: None,
            discarded: 0,
        }
    }

    /// Wire bytes of this frame.
    pub fn encode(&self) -> Vec<u8, MAX_FRAME_LEN> {
        let mut out = Vec::new();
        // Capacity covers opcode plus both parameters.
        let _ = out.push(self.opcode);
        if let Some(params) = self.params {
            let _ = out.extend_from_slice(&params);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_is_nothing() {
        assert!(CommandFrame::decode(&[]).is_none());
    }

    #[test]
    fn move_frame_decodes_params() {
        let f = CommandFrame::decode(&[0x00, 0x64, 0x00]).unwrap();
        assert_eq!(f.opcode(), Some(Opcode::Move));
        assert_eq!(f.params, Some([0x64, 0x00]));
        assert_eq!(f.discarded, 0);
    }

    #[test]
    fn short_parameter_frame_has_no_params() {
        let f = CommandFrame::decode(&[0x03, 0x02]).unwrap();
        assert_eq!(f.opcode(), Some(Opcode::Pump));
        assert_eq!(f.params, None);
        assert_eq!(f.discarded, 1);
    }

    #[test]
    fn extra_bytes_are_discarded() {
        let f = CommandFrame::decode(&[0x03, 1, 5, 9, 9]).unwrap();
        assert_eq!(f.params, Some([1, 5]));
        assert_eq!(f.discarded, 2);

        let f = CommandFrame::decode(&[0x04, 7, 7]).unwrap();
        assert_eq!(f.params, None);
        assert_eq!(f.discarded, 2);
    }

    #[test]
    fn unknown_opcode_is_kept() {
        let f = CommandFrame::decode(&[0x2A]).unwrap();
        assert_eq!(f.opcode, 0x2A);
        assert!(f.opcode().is_none());
    }

    #[test]
    fn encode_matches_wire_layout() {
        assert_eq!(CommandFrame::move_to(-2).encode().as_slice(), &[0x00, 0xFE, 0xFF]);
        assert_eq!(CommandFrame::pump(2, 5).encode().as_slice(), &[0x03, 2, 5]);
        assert_eq!(CommandFrame::bare(Opcode::Status).encode().as_slice(), &[0x02]);
        let raw = CommandFrame::move_to(1234).encode();
        assert_eq!(CommandFrame::decode(&raw), Some(CommandFrame::move_to(1234)));
    }
}
