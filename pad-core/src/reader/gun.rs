//! Light-gun reader: trigger on D4, light sensor on D3.

use super::{ControllerReader, RawReport, SnapshotPair};
use crate::family::Family;
use crate::hardware::{PadHardware, Port};

/// Main-port lines carrying the trigger (bit 7) and light sensor (bit 6).
const GUN_MASK: u8 = 0xC0;

pub struct GunReader<H> {
    hw: H,
    snapshots: SnapshotPair,
}

impl<H: PadHardware> GunReader<H> {
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            snapshots: SnapshotPair::default(),
        }
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}

impl<H: PadHardware> ControllerReader for GunReader<H> {
    fn family(&self) -> Family {
        Family::LightGun
    }

    fn init(&mut self) {
        critical_section::with(|_| self.hw.configure_inputs(Port::Main, GUN_MASK));
        self.update();
    }

    fn update(&mut self) {
        // no D-pad on this connector, so no tie-break
        let low = !self.hw.read_port(Port::Main) & GUN_MASK;
        self.snapshots.last_read.digital = [low, 0];
    }

    fn changed(&self) -> i16 {
        self.snapshots.changed()
    }

    fn get_report(&mut self, out: &mut RawReport) {
        let low = self.snapshots.last_read.digital[0];
        out.family = Family::LightGun;
        out.buttons = u16::from(low);
        out.analog = self.snapshots.last_read.analog;
        out.set_payload(&[low]);
        self.snapshots.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::MockHardware;
    use crate::reader::raw;

    #[test]
    fn test_only_gun_lines_are_kept() {
        let mut hw = MockHardware::idle();
        hw.main = 0x00;
        let mut reader = GunReader::new(hw);
        reader.init();
        let mut out = RawReport::new(Family::LightGun);
        reader.get_report(&mut out);
        assert_eq!(out.buttons, raw::GUN_TRIGGER | raw::GUN_LIGHT);
        assert_eq!(&out.payload[..], &[0xC0]);
    }

    #[test]
    fn test_trigger_alone() {
        let mut hw = MockHardware::idle();
        hw.press(Port::Main, 0x80);
        let mut reader = GunReader::new(hw);
        reader.init();
        assert_ne!(reader.changed(), 0);
        let mut out = RawReport::new(Family::LightGun);
        reader.get_report(&mut out);
        assert_eq!(out.buttons, raw::GUN_TRIGGER);
        assert_eq!(reader.changed(), 0);
    }
}
