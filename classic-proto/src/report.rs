//! Report encoders for the three host-selectable layouts.
//!
//! Every encoder is a pure function from [`CanonicalPadState`] to a
//! zero-initialized, fully populated byte array.
//!
//! # Mode 1 (17 bytes)
//!
//! ```text
//!        |   7   |   6   |   5   |  4  |  3 |  2 |  1  |  0   |
//! -------+---------------+-------+----------------------------+
//!  0     |    RX<4:3>    |            LX<5:0>                 |
//!  1     |    RX<2:1>    |            LY<5:0>                 |
//!  2     | RX<0> |    LT<4:3>    |      RY<4:0>               |
//!  3     |        LT<2:0>        |      RT<4:0>               |
//!  4     | BDR   |  BDD  |  BL   |  B- | BH | B+ |  BR  |  1  |
//!  5     | BZL   |  BB   |  BY   |  BA | BX | BZR|  BDL | BDU |
//!  6     | 0x52 ('R')                                         |
//!  7..8  | controller id tag                                  |
//!  9..16 | family raw payload                                 |
//! ```
//!
//! Buttons are active-low on the wire.
//!
//! # Mode 2 (9 bytes) and Mode 3 (8 bytes)
//!
//! ```text
//! Mode 2: LX RX LY RY 00 LT RT B<15:8> B<7:0>
//! Mode 3: LX RX LY RY    LT RT B<15:8> B<7:0>
//! ```
//!
//! Axes are biased by +128 and kept at full 8-bit resolution. Both modes
//! interleave the sticks (LX, RX, LY, RY) where Mode 1 groups the left
//! stick first, and Mode 2 carries one extra byte between the sticks and
//! the triggers whose purpose is unknown (possibly a rumble motor). It is
//! always written as zero. The two are distinct host formats and are kept
//! separate on purpose.

use crate::types::{AnalogStick, CanonicalPadState, RAW_PAYLOAD_LEN};

/// Host register that selects the report layout.
pub const MODE_REGISTER: u8 = 0xFE;

/// Marker byte identifying a Mode 1 report from this adapter.
pub const MODE1_MARKER: u8 = b'R';

/// Length of the largest report (Mode 1).
pub const MAX_REPORT_LEN: usize = ReportMode::Mode1.len();

/// Error returned when a mode register value names no known layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeError(pub u8);

/// Report layout selected by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportMode {
    /// Bit-packed 17-byte layout.
    #[default]
    Mode1,
    /// Byte-per-axis 9-byte layout with a reserved byte.
    Mode2,
    /// Byte-per-axis 8-byte layout.
    Mode3,
}

impl ReportMode {
    /// Resolve a mode register value, falling back to Mode 1 for anything unknown.
    #[inline]
    #[must_use]
    pub fn from_register(value: u8) -> Self {
        Self::try_from(value).unwrap_or(Self::Mode1)
    }

    /// Report length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Mode1 => 17,
            Self::Mode2 => 9,
            Self::Mode3 => 8,
        }
    }
}

impl TryFrom<u8> for ReportMode {
    type Error = ModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Mode1),
            0x02 => Ok(Self::Mode2),
            0x03 => Ok(Self::Mode3),
            other => Err(ModeError(other)),
        }
    }
}

/// A finished report, sized for the largest mode.
///
/// Only the first [`ReportMode::len`] bytes are meaningful; the rest stay zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodedReport {
    mode: ReportMode,
    bytes: [u8; MAX_REPORT_LEN],
}

impl EncodedReport {
    /// Layout this report was encoded with.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Report length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mode.len()
    }

    /// Always false; every mode has a non-zero length.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The report bytes as sent to the host.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.mode.len()]
    }
}

/// Encode `state` using the given layout.
#[must_use]
pub fn encode(state: &CanonicalPadState, mode: ReportMode) -> EncodedReport {
    let mut bytes = [0u8; MAX_REPORT_LEN];
    match mode {
        ReportMode::Mode1 => bytes.copy_from_slice(&encode_mode1(state)),
        ReportMode::Mode2 => bytes[..9].copy_from_slice(&encode_mode2(state)),
        ReportMode::Mode3 => bytes[..8].copy_from_slice(&encode_mode3(state)),
    }
    EncodedReport { mode, bytes }
}

/// Center an axis on 128.
#[inline]
fn biased(axis: i8) -> u8 {
    0x80u8.wrapping_add(axis as u8)
}

/// Bias and drop the low `shift` bits.
#[inline]
fn quantize(axis: i8, shift: u32) -> u8 {
    biased(axis) >> shift
}

#[inline]
fn biased_stick(stick: AnalogStick) -> (u8, u8) {
    (biased(stick.x), biased(stick.y))
}

/// Mode 1: bit-packed layout with identity tag and raw payload.
#[must_use]
pub fn encode_mode1(state: &CanonicalPadState) -> [u8; 17] {
    let mut dst = [0u8; 17];

    let lx = quantize(state.left_stick.x, 2);
    let ly = quantize(state.left_stick.y, 2);
    let rx = quantize(state.right_stick.x, 3);
    let ry = quantize(state.right_stick.y, 3);
    let lt = state.left_trigger >> 3;
    let rt = state.right_trigger >> 3;

    dst[0] = ((rx << 3) & 0xC0) | lx;
    dst[1] = ((rx << 5) & 0xC0) | ly;
    dst[2] = (rx << 7) | ((lt & 0x18) << 2) | ry;
    dst[3] = (lt << 5) | rt;

    let [hi, lo] = state.buttons.to_wire();
    dst[4] = hi;
    dst[5] = lo;

    dst[6] = MODE1_MARKER;
    dst[7..9].copy_from_slice(&state.controller_id.0);
    dst[9..9 + RAW_PAYLOAD_LEN].copy_from_slice(&state.raw_payload);
    dst
}

/// Mode 2: byte-per-axis layout with the reserved byte at offset 4.
#[must_use]
pub fn encode_mode2(state: &CanonicalPadState) -> [u8; 9] {
    let mut dst = [0u8; 9];
    let (lx, ly) = biased_stick(state.left_stick);
    let (rx, ry) = biased_stick(state.right_stick);

    dst[0] = lx;
    dst[1] = rx;
    dst[2] = ly;
    dst[3] = ry;
    // dst[4] reserved
    dst[5] = state.left_trigger;
    dst[6] = state.right_trigger;
    let [hi, lo] = state.buttons.to_wire();
    dst[7] = hi;
    dst[8] = lo;
    dst
}

/// Mode 3: compact byte-per-axis layout.
#[must_use]
pub fn encode_mode3(state: &CanonicalPadState) -> [u8; 8] {
    let mut dst = [0u8; 8];
    let (lx, ly) = biased_stick(state.left_stick);
    let (rx, ry) = biased_stick(state.right_stick);

    dst[0] = lx;
    dst[1] = rx;
    dst[2] = ly;
    dst[3] = ry;
    dst[4] = state.left_trigger;
    dst[5] = state.right_trigger;
    let [hi, lo] = state.buttons.to_wire();
    dst[6] = hi;
    dst[7] = lo;
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Buttons, ControllerId};

    fn with_sticks(lx: i8, ly: i8, rx: i8, ry: i8) -> CanonicalPadState {
        CanonicalPadState {
            left_stick: AnalogStick::new(lx, ly),
            right_stick: AnalogStick::new(rx, ry),
            ..CanonicalPadState::neutral()
        }
    }

    /// Unpack Mode 1 axes back into biased 8-bit values.
    fn unpack_mode1_axes(r: &[u8; 17]) -> (u8, u8, u8, u8, u8, u8) {
        let lx = (r[0] & 0x3F) << 2;
        let ly = (r[1] & 0x3F) << 2;
        let rx5 = ((r[0] >> 6) << 3) | ((r[1] >> 6) << 1) | (r[2] >> 7);
        let ry5 = r[2] & 0x1F;
        let lt5 = (((r[2] >> 5) & 0x03) << 3) | (r[3] >> 5);
        let rt5 = r[3] & 0x1F;
        (lx, ly, rx5 << 3, ry5 << 3, lt5 << 3, rt5 << 3)
    }

    #[test]
    fn test_mode_from_register() {
        assert_eq!(ReportMode::from_register(1), ReportMode::Mode1);
        assert_eq!(ReportMode::from_register(2), ReportMode::Mode2);
        assert_eq!(ReportMode::from_register(3), ReportMode::Mode3);
        assert_eq!(ReportMode::from_register(0), ReportMode::Mode1);
        assert_eq!(ReportMode::from_register(0xFF), ReportMode::Mode1);
        assert_eq!(ReportMode::try_from(7), Err(ModeError(7)));
    }

    #[test]
    fn test_report_lengths() {
        let state = CanonicalPadState::neutral();
        assert_eq!(encode(&state, ReportMode::Mode1).as_bytes().len(), 17);
        assert_eq!(encode(&state, ReportMode::Mode2).as_bytes().len(), 9);
        assert_eq!(encode(&state, ReportMode::Mode3).as_bytes().len(), 8);
    }

    #[test]
    fn test_mode1_neutral_bytes() {
        let state = CanonicalPadState {
            controller_id: ControllerId::SNES,
            raw_payload: [1, 2, 3, 4, 5, 6, 7, 8],
            ..CanonicalPadState::neutral()
        };
        let r = encode_mode1(&state);
        // lx = ly = 0x20, rx = ry = 0x10
        assert_eq!(r[0], 0x80 | 0x20);
        assert_eq!(r[1], 0x00 | 0x20);
        assert_eq!(r[2], 0x10);
        assert_eq!(r[3], 0x00);
        assert_eq!(&r[4..6], &[0xFF, 0xFF]);
        assert_eq!(r[6], b'R');
        assert_eq!(&r[7..9], b"SF");
        assert_eq!(&r[9..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_mode1_secondary_x_split_across_bytes() {
        // rx = -128 + 0b10110 << 3 so the 5-bit field is 0b10110
        let rx = (0b10110u8 << 3).wrapping_sub(0x80) as i8;
        let r = encode_mode1(&with_sticks(0, 0, rx, 0));
        assert_eq!(r[0] >> 6, 0b10);
        assert_eq!(r[1] >> 6, 0b11);
        assert_eq!(r[2] >> 7, 0b0);
    }

    #[test]
    fn test_mode1_trigger_split_across_bytes() {
        let state = CanonicalPadState {
            left_trigger: 0b10101 << 3,
            right_trigger: 0b01110 << 3,
            ..CanonicalPadState::neutral()
        };
        let r = encode_mode1(&state);
        assert_eq!((r[2] >> 5) & 0x03, 0b10);
        assert_eq!(r[3] >> 5, 0b101);
        assert_eq!(r[3] & 0x1F, 0b01110);
    }

    #[test]
    fn test_mode1_quantization_error_bounded() {
        for v in i8::MIN..=i8::MAX {
            let r = encode_mode1(&with_sticks(v, v, v, v));
            let (lx, ly, rx, ry, _, _) = unpack_mode1_axes(&r);
            let expected = biased(v) as i16;
            for primary in [lx, ly] {
                let err = expected - primary as i16;
                assert!((0..4).contains(&err), "6-bit axis {v}: err {err}");
            }
            for secondary in [rx, ry] {
                let err = expected - secondary as i16;
                assert!((0..8).contains(&err), "5-bit axis {v}: err {err}");
            }
        }
    }

    #[test]
    fn test_mode1_axes_do_not_bleed() {
        let r = encode_mode1(&with_sticks(0, 0, 127, 0));
        let (lx, ly, _, ry, lt, rt) = unpack_mode1_axes(&r);
        assert_eq!((lx, ly, ry, lt, rt), (0x80, 0x80, 0x80, 0, 0));
    }

    #[test]
    fn test_byte_per_axis_modes_are_exact() {
        for v in i8::MIN..=i8::MAX {
            let state = with_sticks(v, v.wrapping_neg(), v / 2, v.wrapping_add(1));
            let m2 = encode_mode2(&state);
            let m3 = encode_mode3(&state);
            let recover = |b: u8| b.wrapping_sub(0x80) as i8;
            for bytes in [&m2[..4], &m3[..4]] {
                assert_eq!(recover(bytes[0]), state.left_stick.x);
                assert_eq!(recover(bytes[1]), state.right_stick.x);
                assert_eq!(recover(bytes[2]), state.left_stick.y);
                assert_eq!(recover(bytes[3]), state.right_stick.y);
            }
        }
    }

    #[test]
    fn test_mode2_reserved_byte_zero() {
        let state = CanonicalPadState {
            buttons: Buttons(0xFFFF),
            left_trigger: 0xFF,
            right_trigger: 0xFF,
            ..with_sticks(-100, 100, -100, 100)
        };
        assert_eq!(encode_mode2(&state)[4], 0);
    }

    #[test]
    fn test_button_bytes_inverted_for_every_mask() {
        for mask in 0..=u16::MAX {
            let state = CanonicalPadState {
                buttons: Buttons(mask),
                ..CanonicalPadState::neutral()
            };
            let hi = !(mask >> 8) as u8;
            let lo = !mask as u8;
            let m1 = encode_mode1(&state);
            let m2 = encode_mode2(&state);
            let m3 = encode_mode3(&state);
            assert_eq!((m1[4], m1[5]), (hi, lo));
            assert_eq!((m2[7], m2[8]), (hi, lo));
            assert_eq!((m3[6], m3[7]), (hi, lo));
        }
    }

    #[test]
    fn test_full_triggers_reach_field_maximum() {
        let state = CanonicalPadState {
            buttons: Buttons::L | Buttons::R,
            left_trigger: 0xFF,
            right_trigger: 0xFF,
            ..CanonicalPadState::neutral()
        };
        let m1 = encode_mode1(&state);
        let (_, _, _, _, lt, rt) = unpack_mode1_axes(&m1);
        assert_eq!((lt >> 3, rt >> 3), (0x1F, 0x1F));
        assert_eq!((encode_mode2(&state)[5], encode_mode2(&state)[6]), (0xFF, 0xFF));
        assert_eq!((encode_mode3(&state)[4], encode_mode3(&state)[5]), (0xFF, 0xFF));
    }

    #[test]
    fn test_encode_zero_fills_tail() {
        let state = CanonicalPadState {
            buttons: Buttons::A,
            ..CanonicalPadState::neutral()
        };
        let report = encode(&state, ReportMode::Mode3);
        assert_eq!(report.mode(), ReportMode::Mode3);
        assert_eq!(report.as_bytes(), &encode_mode3(&state));
        assert!(report.bytes[8..].iter().all(|&b| b == 0));
    }
}
