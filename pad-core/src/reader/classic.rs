//! 15-button reader with two analog sticks and optional analog triggers.

use super::{sample_main, slot, ControllerReader, RawReport, SnapshotPair};
use crate::family::Family;
use crate::hardware::{AnalogChannel, PadHardware, Port};

/// Extra-port lines 1..=7; line 0 is not connected.
const EXTRA_MASK: u8 = 0xFE;

const STICK_CHANNELS: [(usize, AnalogChannel); 4] = [
    (slot::LEFT_X, AnalogChannel::LEFT_X),
    (slot::LEFT_Y, AnalogChannel::LEFT_Y),
    (slot::RIGHT_X, AnalogChannel::RIGHT_X),
    (slot::RIGHT_Y, AnalogChannel::RIGHT_Y),
];

const TRIGGER_CHANNELS: [(usize, AnalogChannel); 2] = [
    (slot::LEFT_TRIGGER, AnalogChannel::LEFT_TRIGGER),
    (slot::RIGHT_TRIGGER, AnalogChannel::RIGHT_TRIGGER),
];

pub struct ClassicReader<H> {
    hw: H,
    analog_triggers: bool,
    snapshots: SnapshotPair,
}

impl<H: PadHardware> ClassicReader<H> {
    pub fn new(hw: H, analog_triggers: bool) -> Self {
        Self {
            hw,
            analog_triggers,
            snapshots: SnapshotPair::default(),
        }
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}

impl<H: PadHardware> ControllerReader for ClassicReader<H> {
    fn family(&self) -> Family {
        Family::Classic15
    }

    fn init(&mut self) {
        critical_section::with(|_| {
            self.hw.configure_inputs(Port::Main, 0xFF);
            self.hw.configure_inputs(Port::Extra, EXTRA_MASK);
        });
        self.update();
    }

    fn update(&mut self) {
        let read = &mut self.snapshots.last_read;
        read.digital = [
            sample_main(&mut self.hw),
            !self.hw.read_port(Port::Extra) & EXTRA_MASK,
        ];
        for (idx, channel) in STICK_CHANNELS {
            read.analog[idx] = self.hw.sample_analog(channel);
        }
        if self.analog_triggers {
            for (idx, channel) in TRIGGER_CHANNELS {
                read.analog[idx] = self.hw.sample_analog(channel);
            }
        }
    }

    fn changed(&self) -> i16 {
        self.snapshots.changed()
    }

    fn get_report(&mut self, out: &mut RawReport) {
        let read = &self.snapshots.last_read;
        let [low, high] = read.digital;
        let a = read.analog;
        out.family = Family::Classic15;
        out.buttons = u16::from(low) | u16::from(high) << 8;
        out.analog = a;
        out.set_payload(&[
            low,
            high,
            a[slot::LEFT_X],
            a[slot::LEFT_Y],
            a[slot::RIGHT_X],
            a[slot::RIGHT_Y],
            a[slot::LEFT_TRIGGER],
            a[slot::RIGHT_TRIGGER],
        ]);
        self.snapshots.commit();
    }
}
