//! Controller families and build-time selection.

use classic_proto::{ControllerId, Identity};

/// The controller family wired to this adapter.
///
/// Exactly one family is wired per physical build. The variant decides
/// which reader samples the lines, how the normalizer maps them and what
/// identities the adapter advertises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    /// NES pad, 8 buttons, Home by triple-clicking Start.
    Nes8,
    /// NES pad plus a dedicated Home button.
    Nes9,
    /// SNES pad, 12 buttons, Home by triple-clicking Start.
    Snes12,
    /// SNES pad plus a dedicated Home button.
    Snes13,
    /// 15-button pad with two analog sticks and optional analog triggers.
    Classic15,
    /// Light-gun: trigger and light sensor only.
    LightGun,
}

impl Family {
    /// Family tag echoed in Mode 1 reports.
    #[must_use]
    pub const fn controller_id(self) -> ControllerId {
        match self {
            Self::Nes8 | Self::Nes9 => ControllerId::NES,
            Self::Snes12 | Self::Snes13 => ControllerId::SNES,
            Self::Classic15 => ControllerId::CLASSIC,
            Self::LightGun => ControllerId::LIGHT_GUN,
        }
    }

    /// Identity advertised when raw passthrough is available.
    ///
    /// The 15-button family has no passthrough identity.
    #[must_use]
    pub const fn alt_identity(self) -> Option<Identity> {
        match self {
            Self::Nes8 | Self::Nes9 | Self::LightGun => Some(Identity::NES_ADAPTER),
            Self::Snes12 | Self::Snes13 => Some(Identity::SNES_ADAPTER),
            Self::Classic15 => None,
        }
    }

    /// Number of native bytes forwarded in passthrough mode.
    #[must_use]
    pub const fn raw_payload_len(self) -> usize {
        match self {
            Self::Nes8 | Self::Nes9 | Self::Snes12 | Self::Snes13 => 2,
            Self::Classic15 => 8,
            Self::LightGun => 1,
        }
    }

    /// Whether Home is a physical line rather than a Start triple-click.
    #[must_use]
    pub const fn has_home_line(self) -> bool {
        matches!(self, Self::Nes9 | Self::Snes13 | Self::Classic15)
    }

    /// Whether Home is synthesized from a Start triple-click.
    #[must_use]
    pub const fn synthesizes_home(self) -> bool {
        matches!(self, Self::Nes8 | Self::Snes12)
    }

    /// Whether the remap and analog D-pad toggles apply.
    #[must_use]
    pub const fn has_layout_toggles(self) -> bool {
        matches!(self, Self::Snes12 | Self::Snes13)
    }
}

/// Build-time hardware description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BuildConfig {
    pub family: Family,
    /// Analog trigger channels are wired (15-button family only).
    pub analog_triggers: bool,
}

impl BuildConfig {
    #[must_use]
    pub const fn new(family: Family) -> Self {
        Self {
            family,
            analog_triggers: false,
        }
    }

    /// Enable analog trigger sampling. Ignored by families without analog channels.
    #[must_use]
    pub const fn with_analog_triggers(mut self) -> Self {
        self.analog_triggers = matches!(self.family, Family::Classic15);
        self
    }
}
