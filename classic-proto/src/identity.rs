//! Peripheral identity and calibration blocks advertised to the host.

/// Six-byte peripheral identity read by the host at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity(pub [u8; 6]);

impl Identity {
    /// Classic controller. This is what the adapter normally emulates.
    pub const CLASSIC: Self = Self([0x00, 0x00, 0xA4, 0x20, 0x01, 0x01]);
    /// Alternate identity for SNES builds (raw passthrough available).
    pub const SNES_ADAPTER: Self = Self([0x00, 0x00, 0xA4, 0x20, 0x52, 0x10]);
    /// Alternate identity for NES and light-gun builds.
    pub const NES_ADAPTER: Self = Self([0x00, 0x00, 0xA4, 0x20, 0x52, 0x08]);

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

/// Max/min/center of one axis, in 8-bit units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    pub max: u8,
    pub min: u8,
    pub center: u8,
}

impl AxisCalibration {
    /// Range matching the ±100 deflection the normalizer produces.
    pub const DEFAULT: Self = Self {
        max: 0xE0,
        min: 0x20,
        center: 0x80,
    };
}

/// 32-byte calibration block: two identical halves, each holding LX, LY,
/// RX and RY calibration followed by four bytes the host ignores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBlock(pub [u8; 32]);

impl CalibrationBlock {
    pub const LEN: usize = 32;

    /// Build a block with the same calibration for all four axes.
    #[must_use]
    pub const fn uniform(axis: AxisCalibration) -> Self {
        let mut bytes = [0u8; Self::LEN];
        let mut half = 0;
        while half < 2 {
            let mut axis_idx = 0;
            while axis_idx < 4 {
                let base = half * 16 + axis_idx * 3;
                bytes[base] = axis.max;
                bytes[base + 1] = axis.min;
                bytes[base + 2] = axis.center;
                axis_idx += 1;
            }
            half += 1;
        }
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Default for CalibrationBlock {
    fn default() -> Self {
        Self::uniform(AxisCalibration::DEFAULT)
    }
}
