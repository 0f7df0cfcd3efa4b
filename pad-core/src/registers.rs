//! Host-visible register file of the extension bus.
//!
//! The host addresses a 256-byte register space. A write sets the register
//! pointer from its first byte and stores the remaining bytes from there;
//! a read returns bytes from the pointer onwards.
//!
//! | Address     | Content |
//! |-------------|---------|
//! | `0x00`      | Current report (8 to 17 bytes depending on mode) |
//! | `0x20-0x3F` | Calibration block |
//! | `0xF9`      | Identity select: `0x01` alternate (passthrough), `0x00` classic |
//! | `0xFA-0xFF` | Identity; `0xFE` doubles as the report mode register |
//!
//! A read starting at `0x00` is a report fetch and raises the poll
//! callback once served. The transport only moves bytes in and out.

use classic_proto::{CalibrationBlock, Identity, MODE_REGISTER};

use crate::scheduler::HostBus;

pub const REPORT_ADDR: u8 = 0x00;
pub const CALIBRATION_ADDR: u8 = 0x20;
pub const ALT_SELECT_ADDR: u8 = 0xF9;
pub const IDENTITY_ADDR: u8 = 0xFA;

/// Bytes offered per host read; longer reads are padded with `0xFF`.
pub const READ_WINDOW: usize = 32;

pub struct RegisterFile {
    regs: [u8; 256],
    pointer: u8,
    alt_identity: Option<Identity>,
    alt_active: bool,
    on_poll: Option<fn()>,
    started: bool,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regs: [0; 256],
            pointer: 0,
            alt_identity: None,
            alt_active: false,
            on_poll: None,
            started: false,
        }
    }

    /// Store `bytes` from `addr`, wrapping at the end of the space.
    fn load(&mut self, addr: u8, bytes: &[u8]) {
        let mut addr = addr;
        for &byte in bytes {
            self.regs[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    fn select_identity(&mut self, value: u8) {
        match (value, self.alt_identity) {
            (0x01, Some(alt)) => {
                self.load(IDENTITY_ADDR, alt.as_bytes());
                self.alt_active = true;
                info!("host selected alternate identity");
            }
            (0x00, _) => {
                self.load(IDENTITY_ADDR, Identity::CLASSIC.as_bytes());
                self.alt_active = false;
                info!("host selected classic identity");
            }
            _ => {}
        }
    }

    /// Apply a host write: pointer byte followed by register data.
    pub fn host_write(&mut self, data: &[u8]) {
        let Some((&addr, payload)) = data.split_first() else {
            return;
        };
        self.pointer = addr;
        let mut reg = addr;
        for &byte in payload {
            self.regs[usize::from(reg)] = byte;
            if reg == ALT_SELECT_ADDR {
                self.select_identity(byte);
            } else if reg == MODE_REGISTER {
                info!("host set report mode {}", byte);
            }
            reg = reg.wrapping_add(1);
        }
    }

    /// Bytes the host gets for a read at the current pointer. All `0xFF`
    /// until the bus is started.
    #[must_use]
    pub fn read_window(&self) -> [u8; READ_WINDOW] {
        let mut window = [0xFF; READ_WINDOW];
        if !self.started {
            return window;
        }
        let mut reg = self.pointer;
        for slot in window.iter_mut() {
            *slot = self.regs[usize::from(reg)];
            reg = reg.wrapping_add(1);
        }
        window
    }

    /// Advance past `consumed` read bytes. Returns the poll callback when
    /// the read was a report fetch.
    pub fn finish_read(&mut self, consumed: usize) -> Option<fn()> {
        let fetch = self.started && self.pointer == REPORT_ADDR;
        self.pointer = self.pointer.wrapping_add(consumed as u8);
        if fetch {
            self.on_poll
        } else {
            None
        }
    }
}

impl HostBus for RegisterFile {
    fn init(
        &mut self,
        identity: &Identity,
        initial_report: &[u8],
        calibration: &CalibrationBlock,
        on_poll: fn(),
    ) {
        self.load(IDENTITY_ADDR, identity.as_bytes());
        self.load(REPORT_ADDR, initial_report);
        self.load(CALIBRATION_ADDR, calibration.as_bytes());
        self.on_poll = Some(on_poll);
    }

    fn start(&mut self) {
        self.started = true;
    }

    fn set_alt_identifier(&mut self, id: &Identity) {
        self.alt_identity = Some(*id);
    }

    fn is_alt_mode_active(&self) -> bool {
        self.alt_active
    }

    fn read_host_register(&self, addr: u8) -> u8 {
        self.regs[usize::from(addr)]
    }

    fn submit_report(&mut self, report: &[u8]) {
        self.load(REPORT_ADDR, report);
    }
}
