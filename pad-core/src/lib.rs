//! Platform-agnostic controller readers, normalizer and poll scheduler.
//!
//! This crate turns raw connector lines into classic-controller reports
//! without touching any chip-specific API. Hardware is reached through
//! three traits the firmware implements:
//!
//! - [`PadHardware`]: digital ports and ADC channels
//! - [`HostBus`]: the console-facing bus slave
//! - [`ConfigStore`]: persisted layout flags
//!
//! # Modules
//!
//! - [`family`]: the supported controller families ([`Family`], [`BuildConfig`])
//! - [`reader`]: per-family sampling and change detection ([`ControllerReader`])
//! - [`normalize`]: raw data to [`CanonicalPadState`] ([`Normalizer`])
//! - [`registers`]: the host-visible register file ([`RegisterFile`])
//! - [`scheduler`]: the poll-driven loop ([`Scheduler`])
//!
//! # Example
//!
//! ```rust
//! use pad_core::{Family, Normalizer, BuildConfig, MemoryStore, RawReport, raw};
//! use classic_proto::Buttons;
//!
//! let mut normalizer = Normalizer::new(BuildConfig::new(Family::Snes13));
//! let mut store = MemoryStore::default();
//! let mut report = RawReport::new(Family::Snes13);
//! report.buttons = raw::B | raw::START;
//!
//! let state = normalizer.normalize(&report, &mut store);
//! assert!(state.buttons.contains(Buttons::B | Buttons::PLUS));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// must stay first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod config;
pub mod family;
pub mod hardware;
pub mod normalize;
pub mod reader;
pub mod registers;
pub mod scheduler;

pub use classic_proto::CanonicalPadState;
pub use config::{ConfigError, ConfigStore, MemoryStore, PadConfig};
pub use family::{BuildConfig, Family};
pub use hardware::{AnalogChannel, PadHardware, Port};
pub use normalize::{Combo, Normalizer};
pub use reader::{raw, ControllerReader, RawReport, RawSnapshot, Reader};
pub use registers::RegisterFile;
pub use scheduler::{CycleState, Delivery, HostBus, PollFlag, Scheduler, SAMPLE_DELAY_US};
