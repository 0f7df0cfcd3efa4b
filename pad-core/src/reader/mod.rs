//! Controller readers: raw sampling with change detection.
//!
//! Every family exposes the same four operations through
//! [`ControllerReader`]. Samples are kept active-high: a set bit is a
//! pressed button, whatever the line polarity on the connector.
//!
//! Two snapshots are kept per reader. `last_read` is overwritten by every
//! [`ControllerReader::update`]; `last_reported` only moves when the
//! scheduler fetches a report, so [`ControllerReader::changed`] tells
//! whether anything happened since the host last got fresh data.

mod classic;
mod gun;
mod pad;

pub use classic::ClassicReader;
pub use gun::GunReader;
pub use pad::PadReader;

use heapless::Vec;

use crate::family::{BuildConfig, Family};
use crate::hardware::{PadHardware, Port};

/// D-pad nibble tie-break, indexed by `right | left << 1 | down << 2 | up << 3`.
///
/// Right wins over left and up wins over down, so opposite directions are
/// never reported together.
pub const DPAD_TIE_BREAK: [u8; 16] = [0, 1, 2, 1, 4, 5, 6, 5, 8, 9, 10, 9, 8, 9, 10, 9];

/// Resolve opposite-direction glitches in the low nibble of a raw byte.
#[inline]
#[must_use]
pub const fn resolve_dpad(raw: u8) -> u8 {
    (raw & 0xF0) | DPAD_TIE_BREAK[(raw & 0x0F) as usize]
}

/// Raw button bits as carried in [`RawReport::buttons`].
///
/// The low byte is raw byte 0 (main port), the high byte raw byte 1.
pub mod raw {
    pub const RIGHT: u16 = 1 << 0;
    pub const LEFT: u16 = 1 << 1;
    pub const DOWN: u16 = 1 << 2;
    pub const UP: u16 = 1 << 3;
    pub const START: u16 = 1 << 4;
    pub const SELECT: u16 = 1 << 5;
    pub const Y: u16 = 1 << 6;
    pub const B: u16 = 1 << 7;

    pub const ZR: u16 = 1 << 9;
    pub const ZL: u16 = 1 << 10;
    pub const HOME: u16 = 1 << 11;
    pub const R: u16 = 1 << 12;
    pub const L: u16 = 1 << 13;
    pub const X: u16 = 1 << 14;
    pub const A: u16 = 1 << 15;

    /// Light-gun trigger (shares the B line).
    pub const GUN_TRIGGER: u16 = B;
    /// Light-gun light sensor (shares the Y line).
    pub const GUN_LIGHT: u16 = Y;
}

/// Analog slot order in [`RawSnapshot::analog`] and [`RawReport::analog`].
pub mod slot {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
    pub const RIGHT_X: usize = 2;
    pub const RIGHT_Y: usize = 3;
    pub const LEFT_TRIGGER: usize = 4;
    pub const RIGHT_TRIGGER: usize = 5;
}

/// Number of analog slots a snapshot carries.
pub const ANALOG_SLOTS: usize = 6;

/// One sample of every line a family has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSnapshot {
    pub digital: [u8; 2],
    pub analog: [u8; ANALOG_SLOTS],
}

impl RawSnapshot {
    /// Nothing pressed, sticks centered, triggers released.
    pub const IDLE: Self = Self {
        digital: [0; 2],
        analog: [0x80, 0x80, 0x80, 0x80, 0, 0],
    };

    /// First non-zero byte difference, digital bytes before analog slots.
    ///
    /// Zero iff the snapshots are identical. The sign and magnitude carry
    /// no meaning beyond that.
    #[must_use]
    pub fn diff(&self, other: &Self) -> i16 {
        self.digital
            .iter()
            .zip(other.digital.iter())
            .chain(self.analog.iter().zip(other.analog.iter()))
            .map(|(&a, &b)| i16::from(a) - i16::from(b))
            .find(|&d| d != 0)
            .unwrap_or(0)
    }
}

impl Default for RawSnapshot {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Freshest sample plus the sample last handed to the scheduler.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct SnapshotPair {
    pub last_read: RawSnapshot,
    last_reported: RawSnapshot,
}

impl SnapshotPair {
    #[must_use]
    pub fn changed(&self) -> i16 {
        self.last_read.diff(&self.last_reported)
    }

    #[must_use]
    pub const fn last_reported(&self) -> &RawSnapshot {
        &self.last_reported
    }

    /// Mark `last_read` as delivered. Only report fetches call this.
    pub(crate) fn commit(&mut self) {
        self.last_reported = self.last_read;
    }
}

/// Family-tagged raw data handed from a reader to the normalizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReport {
    pub family: Family,
    /// Active-high raw button bits, see [`raw`].
    pub buttons: u16,
    /// 8-bit analog samples, see [`slot`].
    pub analog: [u8; ANALOG_SLOTS],
    /// Native bytes forwarded verbatim in passthrough mode.
    pub payload: Vec<u8, 8>,
}

impl RawReport {
    #[must_use]
    pub const fn new(family: Family) -> Self {
        Self {
            family,
            buttons: 0,
            analog: RawSnapshot::IDLE.analog,
            payload: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_pressed(&self, bits: u16) -> bool {
        self.buttons & bits == bits
    }

    pub(crate) fn set_payload(&mut self, bytes: &[u8]) {
        self.payload.clear();
        self.payload.extend(bytes.iter().copied().take(8));
    }
}

/// Uniform contract every controller family implements.
pub trait ControllerReader {
    fn family(&self) -> Family;

    /// Configure the lines and take one warm-up sample.
    fn init(&mut self);

    /// Take one fresh sample into `last_read`.
    fn update(&mut self);

    /// Non-zero iff `last_read` differs from `last_reported`.
    fn changed(&self) -> i16;

    /// Copy `last_read` into `out` and commit it as reported.
    fn get_report(&mut self, out: &mut RawReport);
}

/// Sample the main port: invert to active-high and resolve the D-pad.
pub(crate) fn sample_main<H: PadHardware>(hw: &mut H) -> u8 {
    resolve_dpad(!hw.read_port(Port::Main))
}

/// The reader selected for this build.
pub enum Reader<H> {
    Pad(PadReader<H>),
    Classic(ClassicReader<H>),
    Gun(GunReader<H>),
}

impl<H: PadHardware> Reader<H> {
    #[must_use]
    pub fn new(build: BuildConfig, hw: H) -> Self {
        match build.family {
            Family::Nes8 | Family::Nes9 | Family::Snes12 | Family::Snes13 => {
                Self::Pad(PadReader::new(build.family, hw))
            }
            Family::Classic15 => Self::Classic(ClassicReader::new(hw, build.analog_triggers)),
            Family::LightGun => Self::Gun(GunReader::new(hw)),
        }
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        match self {
            Self::Pad(r) => r.hardware_mut(),
            Self::Classic(r) => r.hardware_mut(),
            Self::Gun(r) => r.hardware_mut(),
        }
    }
}

impl<H: PadHardware> ControllerReader for Reader<H> {
    fn family(&self) -> Family {
        match self {
            Self::Pad(r) => r.family(),
            Self::Classic(r) => r.family(),
            Self::Gun(r) => r.family(),
        }
    }

    fn init(&mut self) {
        match self {
            Self::Pad(r) => r.init(),
            Self::Classic(r) => r.init(),
            Self::Gun(r) => r.init(),
        }
    }

    fn update(&mut self) {
        match self {
            Self::Pad(r) => r.update(),
            Self::Classic(r) => r.update(),
            Self::Gun(r) => r.update(),
        }
    }

    fn changed(&self) -> i16 {
        match self {
            Self::Pad(r) => r.changed(),
            Self::Classic(r) => r.changed(),
            Self::Gun(r) => r.changed(),
        }
    }

    fn get_report(&mut self, out: &mut RawReport) {
        match self {
            Self::Pad(r) => r.get_report(out),
            Self::Classic(r) => r.get_report(out),
            Self::Gun(r) => r.get_report(out),
        }
    }
}
