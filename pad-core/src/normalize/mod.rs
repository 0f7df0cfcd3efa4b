//! Raw reader data to [`CanonicalPadState`].
//!
//! The mapping is total: every raw bit of every family either lands on a
//! canonical button or is deliberately dropped.
//!
//! | Raw         | NES       | SNES (native / remap) | 15-button | Light-gun |
//! |-------------|-----------|-----------------------|-----------|-----------|
//! | B (bit 7)   | A         | B / A                 | B         | A (trigger) |
//! | Y (bit 6)   | B         | Y / B                 | Y         | B (light) |
//! | A, X        | -         | A, X / dropped        | A, X      | -         |
//! | Select      | Minus     | Minus                 | Minus     | -         |
//! | Start       | Plus      | Plus                  | Plus      | -         |
//! | L, R        | -         | L, R + full trigger   | L, R      | -         |
//! | ZL, ZR      | -         | -                     | ZL, ZR    | -         |
//! | Home        | 9 buttons | 13 buttons            | Home      | -         |
//!
//! The 8- and 12-button pads have no Home line; Home is synthesized from a
//! Start triple-click instead. The NES A/B lines are labelled transposed on
//! the adapter schematic; the mapping above reports what existing boards
//! have always reported.

mod combo;
mod triple_click;

pub use combo::{Combo, ComboDetector};
pub use triple_click::{TripleClickDetector, TRIPLE_CLICK_COUNT, TRIPLE_CLICK_WINDOW};

use classic_proto::{AnalogStick, Buttons, CanonicalPadState, DEFLECTION_MAX};

use crate::config::{ConfigStore, PadConfig};
use crate::family::{BuildConfig, Family};
use crate::reader::{raw, slot, RawReport};

/// Trigger magnitude reported for a pressed digital shoulder button.
pub const DIGITAL_TRIGGER_FULL: u8 = u8::MAX;

/// Signed deflection of an 8-bit sample centered on 0x80, clamped to ±100.
#[must_use]
pub fn deflection(sample: u8) -> i16 {
    let limit = i16::from(DEFLECTION_MAX);
    ((i16::from(sample) - 128) * 100 / 127).clamp(-limit, limit)
}

fn stick(x: u8, y: u8) -> AnalogStick {
    AnalogStick::clamped(deflection(x), deflection(y))
}

/// Stateful mapper from [`RawReport`] to [`CanonicalPadState`].
///
/// The only state kept across cycles is the combo edge detector and the
/// triple-click detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Normalizer {
    build: BuildConfig,
    combo: ComboDetector,
    home_click: TripleClickDetector,
}

impl Normalizer {
    #[must_use]
    pub const fn new(build: BuildConfig) -> Self {
        Self {
            build,
            combo: ComboDetector::new(),
            home_click: TripleClickDetector::new(),
        }
    }

    /// Map one raw report.
    ///
    /// Flags are read from `store` before mapping. A layout combo writes
    /// new flags to the store and persists them; they apply from the next
    /// call.
    pub fn normalize<C: ConfigStore>(
        &mut self,
        report: &RawReport,
        store: &mut C,
    ) -> CanonicalPadState {
        let flags = store.get_flags();
        let mut state = CanonicalPadState::neutral();
        state.controller_id = report.family.controller_id();
        let len = report.payload.len().min(state.raw_payload.len());
        state.raw_payload[..len].copy_from_slice(&report.payload[..len]);

        match report.family {
            Family::Nes8 | Family::Nes9 => map_nes(report, &mut state),
            Family::Snes12 | Family::Snes13 => map_snes(report, flags, &mut state),
            Family::Classic15 => map_classic(report, self.build.analog_triggers, &mut state),
            Family::LightGun => map_gun(report, &mut state),
        }

        if report.family.has_home_line() {
            state.buttons.set(Buttons::HOME, report.is_pressed(raw::HOME));
        } else if report.family.synthesizes_home() {
            let home = self.home_click.update(report.is_pressed(raw::START));
            state.buttons.set(Buttons::HOME, home);
        }

        if report.family.has_layout_toggles() {
            self.apply_combo(report.buttons, flags, store);
        }

        state
    }

    fn apply_combo<C: ConfigStore>(&mut self, buttons: u16, current: PadConfig, store: &mut C) {
        let Some(combo) = self.combo.poll(buttons) else {
            return;
        };
        let next = combo.config();
        if next == current {
            return;
        }
        info!(
            "layout combo {}: remap={} analog_dpad={}",
            combo,
            next.remap_mode,
            next.analog_dpad_mode
        );
        store.set_flags(next);
        if let Err(e) = store.persist() {
            warn!("config persist failed: {}", e);
        }
    }
}

/// Select, Start and the D-pad, shared by the pad families.
fn map_common(report: &RawReport, buttons: &mut Buttons) {
    buttons.set(Buttons::MINUS, report.is_pressed(raw::SELECT));
    buttons.set(Buttons::PLUS, report.is_pressed(raw::START));
    buttons.set(Buttons::DPAD_UP, report.is_pressed(raw::UP));
    buttons.set(Buttons::DPAD_DOWN, report.is_pressed(raw::DOWN));
    buttons.set(Buttons::DPAD_LEFT, report.is_pressed(raw::LEFT));
    buttons.set(Buttons::DPAD_RIGHT, report.is_pressed(raw::RIGHT));
}

fn digital_trigger(pressed: bool) -> u8 {
    if pressed {
        DIGITAL_TRIGGER_FULL
    } else {
        0
    }
}

fn map_nes(report: &RawReport, state: &mut CanonicalPadState) {
    let buttons = &mut state.buttons;
    buttons.set(Buttons::A, report.is_pressed(raw::B));
    buttons.set(Buttons::B, report.is_pressed(raw::Y));
    map_common(report, buttons);
}

fn map_snes(report: &RawReport, flags: PadConfig, state: &mut CanonicalPadState) {
    let buttons = &mut state.buttons;
    if flags.remap_mode {
        buttons.set(Buttons::B, report.is_pressed(raw::Y));
        buttons.set(Buttons::A, report.is_pressed(raw::B));
    } else {
        buttons.set(Buttons::B, report.is_pressed(raw::B));
        buttons.set(Buttons::Y, report.is_pressed(raw::Y));
        buttons.set(Buttons::A, report.is_pressed(raw::A));
        buttons.set(Buttons::X, report.is_pressed(raw::X));
    }

    map_common(report, buttons);

    if flags.analog_dpad_mode {
        buttons.set(Buttons::DPAD, false);
        let full = DEFLECTION_MAX;
        let x = if report.is_pressed(raw::LEFT) {
            -full
        } else if report.is_pressed(raw::RIGHT) {
            full
        } else {
            0
        };
        let y = if report.is_pressed(raw::UP) {
            full
        } else if report.is_pressed(raw::DOWN) {
            -full
        } else {
            0
        };
        state.left_stick = AnalogStick::new(x, y);
    }

    let l = report.is_pressed(raw::L);
    let r = report.is_pressed(raw::R);
    state.buttons.set(Buttons::L, l);
    state.buttons.set(Buttons::R, r);
    state.left_trigger = digital_trigger(l);
    state.right_trigger = digital_trigger(r);
}

fn map_classic(report: &RawReport, analog_triggers: bool, state: &mut CanonicalPadState) {
    let buttons = &mut state.buttons;
    buttons.set(Buttons::A, report.is_pressed(raw::A));
    buttons.set(Buttons::B, report.is_pressed(raw::B));
    buttons.set(Buttons::X, report.is_pressed(raw::X));
    buttons.set(Buttons::Y, report.is_pressed(raw::Y));
    buttons.set(Buttons::ZL, report.is_pressed(raw::ZL));
    buttons.set(Buttons::ZR, report.is_pressed(raw::ZR));
    map_common(report, buttons);

    let l = report.is_pressed(raw::L);
    let r = report.is_pressed(raw::R);
    buttons.set(Buttons::L, l);
    buttons.set(Buttons::R, r);

    let a = &report.analog;
    state.left_stick = stick(a[slot::LEFT_X], a[slot::LEFT_Y]);
    state.right_stick = stick(a[slot::RIGHT_X], a[slot::RIGHT_Y]);
    if analog_triggers {
        state.left_trigger = a[slot::LEFT_TRIGGER];
        state.right_trigger = a[slot::RIGHT_TRIGGER];
    } else {
        state.left_trigger = digital_trigger(l);
        state.right_trigger = digital_trigger(r);
    }
}

fn map_gun(report: &RawReport, state: &mut CanonicalPadState) {
    state.buttons.set(Buttons::A, report.is_pressed(raw::GUN_TRIGGER));
    state.buttons.set(Buttons::B, report.is_pressed(raw::GUN_LIGHT));
}
