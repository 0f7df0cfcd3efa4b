//! Persisted layout flags and the store they live in.

/// Layout flags toggled by the button combos and kept across power cycles.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadConfig {
    /// Report SNES Y/B as canonical B/A (NES layout).
    pub remap_mode: bool,
    /// Report the D-pad as full left-stick deflection.
    pub analog_dpad_mode: bool,
}

/// First byte of a stored configuration record.
pub const RECORD_MAGIC: u8 = 0xC1;
/// Record layout version.
pub const RECORD_VERSION: u8 = 1;
/// Size of a stored configuration record.
pub const RECORD_LEN: usize = 4;

const FLAG_REMAP: u8 = 1 << 0;
const FLAG_ANALOG_DPAD: u8 = 1 << 1;

impl PadConfig {
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.remap_mode {
            bits |= FLAG_REMAP;
        }
        if self.analog_dpad_mode {
            bits |= FLAG_ANALOG_DPAD;
        }
        bits
    }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            remap_mode: bits & FLAG_REMAP != 0,
            analog_dpad_mode: bits & FLAG_ANALOG_DPAD != 0,
        }
    }

    /// Serialize as `[magic, version, flags, !flags]`.
    #[must_use]
    pub const fn to_record(self) -> [u8; RECORD_LEN] {
        let bits = self.to_bits();
        [RECORD_MAGIC, RECORD_VERSION, bits, !bits]
    }

    /// Parse a stored record.
    ///
    /// Erased flash (all `0xFF`) and torn writes are reported as
    /// [`ConfigError::Corrupt`]; callers fall back to defaults.
    pub fn from_record(record: &[u8; RECORD_LEN]) -> Result<Self, ConfigError> {
        let [magic, version, bits, check] = *record;
        if magic != RECORD_MAGIC || version != RECORD_VERSION || bits != !check {
            return Err(ConfigError::Corrupt);
        }
        Ok(Self::from_bits(bits))
    }
}

/// Error type for configuration storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Reading the backing storage failed.
    Read,
    /// Erasing the backing storage failed.
    Erase,
    /// Writing the backing storage failed.
    Write,
    /// Stored record is missing or invalid.
    Corrupt,
}

/// Durable key-value store for [`PadConfig`].
///
/// `set_flags` only changes the in-memory copy; `persist` makes it durable.
pub trait ConfigStore {
    fn get_flags(&self) -> PadConfig;

    fn set_flags(&mut self, flags: PadConfig);

    /// Write the current flags to durable storage.
    fn persist(&mut self) -> Result<(), ConfigError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &mut T {
    fn get_flags(&self) -> PadConfig {
        (**self).get_flags()
    }

    fn set_flags(&mut self, flags: PadConfig) {
        (**self).set_flags(flags)
    }

    fn persist(&mut self) -> Result<(), ConfigError> {
        (**self).persist()
    }
}

/// RAM-only store. Persisting records the last durable value.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MemoryStore {
    flags: PadConfig,
    persisted: Option<PadConfig>,
    persist_count: u32,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(flags: PadConfig) -> Self {
        Self {
            flags,
            persisted: None,
            persist_count: 0,
        }
    }

    /// Last value handed to `persist`, if any.
    #[must_use]
    pub const fn persisted(&self) -> Option<PadConfig> {
        self.persisted
    }

    /// Number of `persist` calls so far.
    #[must_use]
    pub const fn persist_count(&self) -> u32 {
        self.persist_count
    }
}

impl ConfigStore for MemoryStore {
    fn get_flags(&self) -> PadConfig {
        self.flags
    }

    fn set_flags(&mut self, flags: PadConfig) {
        self.flags = flags;
    }

    fn persist(&mut self) -> Result<(), ConfigError> {
        self.persisted = Some(self.flags);
        self.persist_count += 1;
        Ok(())
    }
}
