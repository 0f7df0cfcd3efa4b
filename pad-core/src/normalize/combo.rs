//! Five-button layout combos.
//!
//! Start + Select + L + R plus one direction selects a layout. The combo
//! fires once when it becomes held and re-arms after it is released or
//! changed, so holding it does not rewrite the configuration store.

use crate::config::PadConfig;
use crate::reader::raw;

/// Buttons every combo holds.
const COMBO_BASE: u16 = raw::START | raw::SELECT | raw::L | raw::R;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Combo {
    /// Base + Up: native SNES layout, digital D-pad.
    NativeLayout,
    /// Base + Down: NES layout (Y/B reported as B/A).
    NesLayout,
    /// Base + Left: D-pad reported on the left stick.
    AnalogDpad,
}

impl Combo {
    /// Combo held in `buttons`, if any. Left takes precedence over Down,
    /// Down over Up.
    #[must_use]
    pub const fn detect(buttons: u16) -> Option<Self> {
        if buttons & COMBO_BASE != COMBO_BASE {
            return None;
        }
        if buttons & raw::LEFT != 0 {
            Some(Self::AnalogDpad)
        } else if buttons & raw::DOWN != 0 {
            Some(Self::NesLayout)
        } else if buttons & raw::UP != 0 {
            Some(Self::NativeLayout)
        } else {
            None
        }
    }

    /// Flags this combo selects.
    #[must_use]
    pub const fn config(self) -> PadConfig {
        match self {
            Self::NativeLayout => PadConfig {
                remap_mode: false,
                analog_dpad_mode: false,
            },
            Self::NesLayout => PadConfig {
                remap_mode: true,
                analog_dpad_mode: false,
            },
            Self::AnalogDpad => PadConfig {
                remap_mode: false,
                analog_dpad_mode: true,
            },
        }
    }
}

/// Edge detector over [`Combo::detect`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ComboDetector {
    held: Option<Combo>,
}

impl ComboDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self { held: None }
    }

    /// Feed one cycle of raw buttons. Returns the combo on the cycle it
    /// becomes held.
    pub fn poll(&mut self, buttons: u16) -> Option<Combo> {
        let now = Combo::detect(buttons);
        let fired = match now {
            Some(combo) if self.held != Some(combo) => Some(combo),
            _ => None,
        };
        self.held = now;
        fired
    }
}
