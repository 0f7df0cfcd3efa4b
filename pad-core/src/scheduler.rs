//! Poll-driven main loop: sleep, sample, pack, deliver.
//!
//! One cycle per host poll:
//!
//! ```text
//! SLEEPING --poll flag--> SAMPLING --update--> PACKING --submit--> DELIVERED
//!    ^                                                                |
//!    +------------------------ wait_for_poll -------------------------+
//! ```
//!
//! Sampling is delayed by [`SAMPLE_DELAY_US`] after the poll so the
//! controller read lands just before the next host read and never overlaps
//! the host's bus traffic. Sample, normalize and encode must finish inside
//! the remaining poll period; this is a timing constraint of the build and
//! is not checked at run time.

use classic_proto::{
    encode, CalibrationBlock, CanonicalPadState, Identity, ReportMode, MODE_REGISTER,
};
use embedded_hal::delay::DelayNs;
use portable_atomic::{AtomicBool, Ordering};

use crate::config::ConfigStore;
use crate::family::BuildConfig;
use crate::normalize::Normalizer;
use crate::reader::{ControllerReader, RawReport};

/// Delay between the poll tick and sampling the controller.
pub const SAMPLE_DELAY_US: u32 = 2350;

/// Poll-pending flag shared between the bus interrupt and the main loop.
///
/// The interrupt only raises it; the main loop is the only consumer.
pub struct PollFlag(AtomicBool);

impl PollFlag {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Mark a poll as pending. Safe to call from interrupt context.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume a pending poll.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for PollFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-bus slave emulation the scheduler delivers reports to.
pub trait HostBus {
    /// Load identity, first report and calibration, and install the poll
    /// callback. `on_poll` runs in interrupt context.
    fn init(
        &mut self,
        identity: &Identity,
        initial_report: &[u8],
        calibration: &CalibrationBlock,
        on_poll: fn(),
    );

    /// Start answering the host.
    fn start(&mut self);

    /// Identity advertised when the host asks for raw passthrough.
    fn set_alt_identifier(&mut self, id: &Identity);

    /// Whether the host switched to the alternate identity.
    fn is_alt_mode_active(&self) -> bool;

    fn read_host_register(&self, addr: u8) -> u8;

    /// Hand over the report for the next host read.
    fn submit_report(&mut self, report: &[u8]);
}

impl<T: HostBus + ?Sized> HostBus for &mut T {
    fn init(
        &mut self,
        identity: &Identity,
        initial_report: &[u8],
        calibration: &CalibrationBlock,
        on_poll: fn(),
    ) {
        (**self).init(identity, initial_report, calibration, on_poll)
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn set_alt_identifier(&mut self, id: &Identity) {
        (**self).set_alt_identifier(id)
    }

    fn is_alt_mode_active(&self) -> bool {
        (**self).is_alt_mode_active()
    }

    fn read_host_register(&self, addr: u8) -> u8 {
        (**self).read_host_register(addr)
    }

    fn submit_report(&mut self, report: &[u8]) {
        (**self).submit_report(report)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    Sleeping,
    Sampling,
    Packing,
    Delivered,
}

/// What a cycle handed to the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    /// Normalized and encoded report.
    Report(ReportMode),
    /// Native bytes, forwarded verbatim.
    Passthrough,
}

/// Owns all per-cycle state. Only the poll flag is shared with interrupts.
pub struct Scheduler<'a, R, B, C> {
    reader: R,
    bus: B,
    store: C,
    normalizer: Normalizer,
    poll: &'a PollFlag,
    state: CycleState,
    raw: RawReport,
    last_delivery: Option<Delivery>,
}

impl<'a, R, B, C> Scheduler<'a, R, B, C>
where
    R: ControllerReader,
    B: HostBus,
    C: ConfigStore,
{
    pub fn new(reader: R, bus: B, store: C, build: BuildConfig, poll: &'a PollFlag) -> Self {
        let raw = RawReport::new(reader.family());
        Self {
            reader,
            bus,
            store,
            normalizer: Normalizer::new(build),
            poll,
            state: CycleState::Sleeping,
            raw,
            last_delivery: None,
        }
    }

    /// Initialize the reader and bring up the bus with a neutral report.
    pub fn start(&mut self, on_poll: fn()) {
        self.reader.init();
        let family = self.reader.family();

        let mut neutral = CanonicalPadState::neutral();
        neutral.controller_id = family.controller_id();
        let initial = encode(&neutral, ReportMode::Mode1);

        self.bus.init(
            &Identity::CLASSIC,
            initial.as_bytes(),
            &CalibrationBlock::default(),
            on_poll,
        );
        if let Some(alt) = family.alt_identity() {
            self.bus.set_alt_identifier(&alt);
        }
        self.bus.start();
        info!("scheduler started: {}", family);
    }

    /// Park with `idle` until a poll is pending, then consume it. This is
    /// the only way back to [`CycleState::Sleeping`].
    pub fn wait_for_poll(&mut self, mut idle: impl FnMut()) {
        self.state = CycleState::Sleeping;
        while !self.poll.take() {
            idle();
        }
    }

    /// Run one sample/pack/deliver cycle. The scheduler stays
    /// [`CycleState::Delivered`] until the next [`Self::wait_for_poll`].
    pub fn run_cycle<D: DelayNs>(&mut self, delay: &mut D) -> Delivery {
        self.state = CycleState::Sampling;
        delay.delay_us(SAMPLE_DELAY_US);
        self.reader.update();
        if self.reader.changed() != 0 {
            trace!("input changed");
        }
        self.reader.get_report(&mut self.raw);

        self.state = CycleState::Packing;
        let encoded;
        let (delivery, bytes): (Delivery, &[u8]) = if self.bus.is_alt_mode_active() {
            (Delivery::Passthrough, &self.raw.payload[..])
        } else {
            let mode = ReportMode::from_register(self.bus.read_host_register(MODE_REGISTER));
            let state = self.normalizer.normalize(&self.raw, &mut self.store);
            encoded = encode(&state, mode);
            (Delivery::Report(mode), encoded.as_bytes())
        };

        self.state = CycleState::Delivered;
        self.bus.submit_report(bytes);

        if self.last_delivery != Some(delivery) {
            info!("delivering {}", delivery);
            self.last_delivery = Some(delivery);
        }
        delivery
    }

    /// Serve polls forever.
    pub fn run<D: DelayNs>(&mut self, delay: &mut D, mut idle: impl FnMut()) -> ! {
        loop {
            self.wait_for_poll(&mut idle);
            self.run_cycle(delay);
        }
    }

    #[must_use]
    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Raw data of the last delivered cycle.
    #[must_use]
    pub const fn last_raw(&self) -> &RawReport {
        &self.raw
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn store(&self) -> &C {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::{MemoryStore, PadConfig};
    use crate::family::Family;
    use crate::hardware::mock::MockHardware;
    use crate::hardware::Port;
    use crate::reader::Reader;
    use classic_proto::{ControllerId, MODE1_MARKER};
    use std::vec::Vec;

    struct MockBus {
        identity: Option<Identity>,
        alt_identity: Option<Identity>,
        initial_report: Vec<u8>,
        calibration: Option<CalibrationBlock>,
        on_poll: Option<fn()>,
        started: bool,
        alt_active: bool,
        registers: [u8; 256],
        submitted: Vec<Vec<u8>>,
    }

    impl HostBus for MockBus {
        fn init(
            &mut self,
            identity: &Identity,
            initial_report: &[u8],
            calibration: &CalibrationBlock,
            on_poll: fn(),
        ) {
            self.identity = Some(*identity);
            self.initial_report = initial_report.to_vec();
            self.calibration = Some(*calibration);
            self.on_poll = Some(on_poll);
        }

        fn start(&mut self) {
            assert!(self.identity.is_some(), "start before init");
            self.started = true;
        }

        fn set_alt_identifier(&mut self, id: &Identity) {
            self.alt_identity = Some(*id);
        }

        fn is_alt_mode_active(&self) -> bool {
            self.alt_active
        }

        fn read_host_register(&self, addr: u8) -> u8 {
            self.registers[usize::from(addr)]
        }

        fn submit_report(&mut self, report: &[u8]) {
            self.submitted.push(report.to_vec());
        }
    }

    impl Default for MockBus {
        fn default() -> Self {
            Self {
                identity: None,
                alt_identity: None,
                initial_report: Vec::new(),
                calibration: None,
                on_poll: None,
                started: false,
                alt_active: false,
                registers: [0; 256],
                submitted: Vec::new(),
            }
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    type TestScheduler<'a> = Scheduler<'a, Reader<MockHardware>, MockBus, MemoryStore>;

    fn scheduler(family: Family, poll: &PollFlag) -> TestScheduler<'_> {
        let build = BuildConfig::new(family);
        let reader = Reader::new(build, MockHardware::idle());
        let mut scheduler =
            Scheduler::new(reader, MockBus::default(), MemoryStore::default(), build, poll);
        scheduler.start(|| {});
        scheduler
    }

    fn last_submitted(scheduler: &TestScheduler<'_>) -> Vec<u8> {
        scheduler.bus().submitted.last().cloned().unwrap_or_default()
    }

    #[test]
    fn test_poll_flag_take_consumes() {
        let flag = PollFlag::new();
        assert!(!flag.take());
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_start_brings_up_bus() {
        let poll = PollFlag::new();
        let s = scheduler(Family::Snes13, &poll);
        let bus = s.bus();
        assert!(bus.started);
        assert_eq!(bus.identity, Some(Identity::CLASSIC));
        assert_eq!(bus.alt_identity, Some(Identity::SNES_ADAPTER));
        assert_eq!(bus.calibration, Some(CalibrationBlock::default()));
        assert_eq!(bus.initial_report.len(), 17);
        assert_eq!(&bus.initial_report[..6], &[0xA0, 0x20, 0x10, 0x00, 0xFF, 0xFF]);
        assert_eq!(bus.initial_report[6], MODE1_MARKER);
        assert_eq!(&bus.initial_report[7..9], &ControllerId::SNES.0);
        assert!(bus.on_poll.is_some());
    }

    #[test]
    fn test_classic_build_has_no_alt_identity() {
        let poll = PollFlag::new();
        let s = scheduler(Family::Classic15, &poll);
        assert_eq!(s.bus().alt_identity, None);
    }

    static CALLBACK_POLL: PollFlag = PollFlag::new();

    fn raise_callback_poll() {
        CALLBACK_POLL.raise();
    }

    #[test]
    fn test_installed_callback_raises_poll() {
        let build = BuildConfig::new(Family::Nes8);
        let reader = Reader::new(build, MockHardware::idle());
        let mut s = Scheduler::new(
            reader,
            MockBus::default(),
            MemoryStore::default(),
            build,
            &CALLBACK_POLL,
        );
        s.start(raise_callback_poll);
        let on_poll = s.bus().on_poll.unwrap();
        on_poll();
        let mut idled = 0;
        s.wait_for_poll(|| idled += 1);
        assert_eq!(idled, 0);
        assert_eq!(s.state(), CycleState::Sleeping);
    }

    #[test]
    fn test_wait_for_poll_idles_until_raised() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Nes9, &poll);
        let mut idled = 0;
        s.wait_for_poll(|| {
            idled += 1;
            if idled == 3 {
                poll.raise();
            }
        });
        assert_eq!(idled, 3);
        assert!(!poll.take());
    }

    #[test]
    fn test_cycle_waits_before_sampling() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Snes13, &poll);
        let mut delay = MockDelay::default();
        s.run_cycle(&mut delay);
        assert_eq!(delay.total_ns, u64::from(SAMPLE_DELAY_US) * 1_000);
    }

    #[test]
    fn test_cycle_state_transitions() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Snes13, &poll);
        let mut delay = MockDelay::default();
        assert_eq!(s.state(), CycleState::Sleeping);

        s.run_cycle(&mut delay);
        assert_eq!(s.state(), CycleState::Delivered);
        // a second cycle without a poll in between still ends delivered
        s.run_cycle(&mut delay);
        assert_eq!(s.state(), CycleState::Delivered);

        poll.raise();
        s.wait_for_poll(|| {});
        assert_eq!(s.state(), CycleState::Sleeping);
    }

    #[test]
    fn test_mode_register_selects_encoding() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Snes13, &poll);
        let mut delay = MockDelay::default();

        let cases = [
            (1, ReportMode::Mode1, 17),
            (2, ReportMode::Mode2, 9),
            (3, ReportMode::Mode3, 8),
            (0x00, ReportMode::Mode1, 17),
            (0x7F, ReportMode::Mode1, 17),
        ];
        for (value, mode, len) in cases {
            s.bus_mut().registers[usize::from(MODE_REGISTER)] = value;
            assert_eq!(s.run_cycle(&mut delay), Delivery::Report(mode));
            assert_eq!(last_submitted(&s).len(), len, "register {value:#04x}");
        }
    }

    #[test]
    fn test_pressed_button_reaches_report() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Snes13, &poll);
        let mut delay = MockDelay::default();
        s.bus_mut().registers[usize::from(MODE_REGISTER)] = 3;
        // raw B on the main port
        s.reader_mut().hardware_mut().press(Port::Main, 0x80);
        s.run_cycle(&mut delay);
        let report = last_submitted(&s);
        // canonical B is bit 6, active low
        assert_eq!(&report[6..8], &[0xFF, 0xBF]);
    }

    #[test]
    fn test_passthrough_forwards_native_bytes_for_every_family() {
        for family in [
            Family::Nes8,
            Family::Nes9,
            Family::Snes12,
            Family::Snes13,
            Family::Classic15,
            Family::LightGun,
        ] {
            let poll = PollFlag::new();
            let mut s = scheduler(family, &poll);
            let mut delay = MockDelay::default();
            {
                let hw = s.reader_mut().hardware_mut();
                hw.press(Port::Main, 0xC1);
                hw.press(Port::Extra, 0x12);
                hw.analog = [0x11, 0x22, 0x33, 0x44, 0, 0, 0x55, 0x66];
            }
            s.bus_mut().alt_active = true;
            assert_eq!(s.run_cycle(&mut delay), Delivery::Passthrough);
            let submitted = last_submitted(&s);
            assert_eq!(&submitted[..], &s.last_raw().payload[..], "{family:?}");
            assert_eq!(submitted.len(), family.raw_payload_len(), "{family:?}");
        }
    }

    #[test]
    fn test_passthrough_skips_normalization() {
        let poll = PollFlag::new();
        let mut s = scheduler(Family::Snes13, &poll);
        let mut delay = MockDelay::default();
        // start + select + L + R + down would switch layouts if normalized
        s.reader_mut().hardware_mut().press(Port::Main, 0x34);
        s.reader_mut().hardware_mut().press(Port::Extra, 0x03);
        s.bus_mut().alt_active = true;
        s.run_cycle(&mut delay);
        assert_eq!(s.store().get_flags(), PadConfig::default());
        assert_eq!(s.store().persist_count(), 0);
    }

    #[test]
    fn test_combo_visible_next_cycle() {
        let poll = PollFlag::new();
        let build = BuildConfig::new(Family::Snes13);
        let reader = Reader::new(build, MockHardware::idle());
        let store = MemoryStore::new(PadConfig {
            remap_mode: true,
            analog_dpad_mode: true,
        });
        let mut s = Scheduler::new(reader, MockBus::default(), store, build, &poll);
        s.start(|| {});
        s.bus_mut().registers[usize::from(MODE_REGISTER)] = 3;
        let mut delay = MockDelay::default();

        // start + select + L + R + up
        s.reader_mut().hardware_mut().press(Port::Main, 0x38);
        s.reader_mut().hardware_mut().press(Port::Extra, 0x03);
        s.run_cycle(&mut delay);
        // analog D-pad still active: up is full left-stick Y
        assert_eq!(last_submitted(&s)[2], 0x80 + 100);
        assert_eq!(s.store().get_flags(), PadConfig::default());

        s.run_cycle(&mut delay);
        let report = last_submitted(&s);
        assert_eq!(report[2], 0x80);
        // D-pad up is canonical bit 0, active low
        assert_eq!(report[7] & 0x01, 0);
    }
}
