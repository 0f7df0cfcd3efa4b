//! Canonical pad types: Buttons, AnalogStick, ControllerId, CanonicalPadState.

use core::ops::BitOr;

/// Length of the family-specific payload echoed in Mode 1 reports.
pub const RAW_PAYLOAD_LEN: usize = 8;

/// Largest stick deflection the normalizer produces, in either direction.
pub const DEFLECTION_MAX: i8 = 100;

/// Canonical button mask.
///
/// The bit positions follow the classic controller wire layout so the
/// encoders only have to invert and split the mask:
///
/// | Bit | Button     | Bit | Button     |
/// |-----|------------|-----|------------|
/// | 15  | D-pad right| 7   | ZL         |
/// | 14  | D-pad down | 6   | B          |
/// | 13  | L          | 5   | Y          |
/// | 12  | Minus      | 4   | A          |
/// | 11  | Home       | 3   | X          |
/// | 10  | Plus       | 2   | ZR         |
/// | 9   | R          | 1   | D-pad left |
/// | 8   | (reserved) | 0   | D-pad up   |
///
/// # Example
///
/// ```
/// use classic_proto::Buttons;
///
/// let buttons = Buttons::A | Buttons::B;
/// assert!(buttons.contains(Buttons::A));
/// assert!(!buttons.contains(Buttons::X));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const DPAD_UP: Self = Self(1 << 0);
    pub const DPAD_LEFT: Self = Self(1 << 1);
    pub const ZR: Self = Self(1 << 2);
    pub const X: Self = Self(1 << 3);
    pub const A: Self = Self(1 << 4);
    pub const Y: Self = Self(1 << 5);
    pub const B: Self = Self(1 << 6);
    pub const ZL: Self = Self(1 << 7);
    // bit 8 has no button; it always reads back released
    pub const R: Self = Self(1 << 9);
    pub const PLUS: Self = Self(1 << 10);
    pub const HOME: Self = Self(1 << 11);
    pub const MINUS: Self = Self(1 << 12);
    pub const L: Self = Self(1 << 13);
    pub const DPAD_DOWN: Self = Self(1 << 14);
    pub const DPAD_RIGHT: Self = Self(1 << 15);

    pub const NONE: Self = Self(0);

    pub const DPAD: Self =
        Self(Self::DPAD_UP.0 | Self::DPAD_DOWN.0 | Self::DPAD_LEFT.0 | Self::DPAD_RIGHT.0);

    /// True when every bit of `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: Buttons) -> bool {
        self.0 & mask.0 == mask.0
    }

    /// Press or release every button in `mask`.
    pub fn set(&mut self, mask: Buttons, pressed: bool) {
        if pressed {
            self.0 |= mask.0;
        } else {
            self.0 &= !mask.0;
        }
    }

    /// Active-low wire form, high byte first.
    #[must_use]
    pub const fn to_wire(self) -> [u8; 2] {
        let inverted = !self.0;
        [(inverted >> 8) as u8, inverted as u8]
    }
}

impl BitOr for Buttons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Analog stick as a signed deflection from rest.
///
/// The normalizer keeps both axes within ±[`DEFLECTION_MAX`]; the
/// encoders accept the full `i8` range.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogStick {
    pub x: i8,
    pub y: i8,
}

impl AnalogStick {
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub const NEUTRAL: Self = Self { x: 0, y: 0 };

    /// Build a stick from wide values, clamping each axis to ±[`DEFLECTION_MAX`].
    #[must_use]
    pub fn clamped(x: i16, y: i16) -> Self {
        let limit = DEFLECTION_MAX as i16;
        Self {
            x: x.clamp(-limit, limit) as i8,
            y: y.clamp(-limit, limit) as i8,
        }
    }
}

/// Two-character controller family tag carried in Mode 1 reports.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerId(pub [u8; 2]);

impl ControllerId {
    pub const NES: Self = Self(*b"FC");
    pub const SNES: Self = Self(*b"SF");
    pub const CLASSIC: Self = Self(*b"CL");
    pub const LIGHT_GUN: Self = Self(*b"LG");
    pub const NONE: Self = Self([0, 0]);
}

/// The unified pad model every controller family is normalized into.
///
/// - 16 buttons ([`Buttons`])
/// - 2 analog sticks (signed deflection)
/// - 2 analog triggers (0-255)
/// - family tag and the family's native bytes, echoed for diagnostics
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanonicalPadState {
    pub buttons: Buttons,
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub controller_id: ControllerId,
    pub raw_payload: [u8; RAW_PAYLOAD_LEN],
}

impl CanonicalPadState {
    /// No buttons pressed, sticks centered, triggers released, no family tag.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            left_stick: AnalogStick::NEUTRAL,
            right_stick: AnalogStick::NEUTRAL,
            left_trigger: 0,
            right_trigger: 0,
            controller_id: ControllerId::NONE,
            raw_payload: [0; RAW_PAYLOAD_LEN],
        }
    }
}
