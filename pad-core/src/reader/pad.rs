//! NES and SNES pad reader (8, 9, 12 and 13 button variants).
//!
//! All variants share the main port. The extra port carries the second
//! button row and is wired differently per variant:
//!
//! | Variant | Extra lines | Raw byte 1                          |
//! |---------|-------------|-------------------------------------|
//! | 13      | 0..=4       | lines 0..=3 shifted to bits 4..=7, line 4 is Home (bit 3) |
//! | 12      | 0..=3       | lines shifted to bits 4..=7         |
//! | 9       | 4           | line 4 is Home (bit 3)              |
//! | 8       | none        | `0xFF`, as an authentic NES pad reads |

use super::{sample_main, ControllerReader, RawReport, SnapshotPair};
use crate::family::Family;
use crate::hardware::{PadHardware, Port};

const HOME_LINE: u8 = 1 << 4;
const HOME_BIT: u8 = 1 << 3;

pub struct PadReader<H> {
    hw: H,
    family: Family,
    snapshots: SnapshotPair,
}

impl<H: PadHardware> PadReader<H> {
    /// Pad reader for one of the NES/SNES families.
    ///
    /// Any other family is treated as the 13-button SNES wiring.
    pub fn new(family: Family, hw: H) -> Self {
        let family = match family {
            Family::Nes8 | Family::Nes9 | Family::Snes12 | Family::Snes13 => family,
            _ => Family::Snes13,
        };
        Self {
            hw,
            family,
            snapshots: SnapshotPair::default(),
        }
    }

    const fn extra_mask(&self) -> u8 {
        match self.family {
            Family::Snes13 => 0x1F,
            Family::Snes12 => 0x0F,
            Family::Nes9 => HOME_LINE,
            _ => 0,
        }
    }

    fn sample_extra(&mut self) -> u8 {
        let lines = !self.hw.read_port(Port::Extra) & self.extra_mask();
        match self.family {
            Family::Snes13 => {
                let mut byte = (lines << 4) & 0xF0;
                if lines & HOME_LINE != 0 {
                    byte |= HOME_BIT;
                }
                byte
            }
            Family::Snes12 => lines << 4,
            Family::Nes9 => {
                if lines & HOME_LINE != 0 {
                    HOME_BIT
                } else {
                    0
                }
            }
            _ => 0xFF,
        }
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    #[must_use]
    pub const fn snapshots(&self) -> &SnapshotPair {
        &self.snapshots
    }
}

impl<H: PadHardware> ControllerReader for PadReader<H> {
    fn family(&self) -> Family {
        self.family
    }

    fn init(&mut self) {
        let extra = self.extra_mask();
        critical_section::with(|_| {
            self.hw.configure_inputs(Port::Main, 0xFF);
            if extra != 0 {
                self.hw.configure_inputs(Port::Extra, extra);
            }
        });
        self.update();
    }

    fn update(&mut self) {
        let low = sample_main(&mut self.hw);
        let high = self.sample_extra();
        self.snapshots.last_read.digital = [low, high];
    }

    fn changed(&self) -> i16 {
        self.snapshots.changed()
    }

    fn get_report(&mut self, out: &mut RawReport) {
        let [low, high] = self.snapshots.last_read.digital;
        out.family = self.family;
        out.analog = self.snapshots.last_read.analog;
        if self.family == Family::Nes8 {
            out.buttons = u16::from(low);
            out.set_payload(&[low, 0]);
        } else {
            out.buttons = u16::from(low) | u16::from(high) << 8;
            out.set_payload(&[low, high]);
        }
        self.snapshots.commit();
    }
}
