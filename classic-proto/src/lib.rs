//! Classic controller extension report types and encoders.
//!
//! This crate describes what the host console sees: the canonical pad
//! state produced by the adapter, the identity and calibration blocks it
//! advertises, and the three report layouts the host can select through
//! its mode register.
//!
//! - **Types**: [`Buttons`], [`AnalogStick`], [`CanonicalPadState`], [`ControllerId`]
//! - **Identity**: [`Identity`], [`CalibrationBlock`]
//! - **Reports**: [`ReportMode`], [`EncodedReport`], [`encode()`]
//!
//! # Report layouts
//!
//! | Mode | Length | Axes                          | Extras                         |
//! |------|--------|-------------------------------|--------------------------------|
//! | 1    | 17     | bit-packed, 6/5-bit quantized | marker, identity tag, payload  |
//! | 2    | 9      | one byte per axis, +128 bias  | reserved byte                  |
//! | 3    | 8      | one byte per axis, +128 bias  | -                              |
//!
//! # Example
//!
//! ```
//! use classic_proto::{encode, Buttons, CanonicalPadState, ReportMode};
//!
//! let state = CanonicalPadState {
//!     buttons: Buttons::A | Buttons::PLUS,
//!     ..CanonicalPadState::neutral()
//! };
//!
//! let report = encode(&state, ReportMode::Mode3);
//! assert_eq!(report.len(), 8);
//! assert_eq!(report.as_bytes()[0], 0x80); // left stick X at rest
//! ```
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod identity;
pub mod report;
pub mod types;

pub use identity::{AxisCalibration, CalibrationBlock, Identity};
pub use report::{
    encode, encode_mode1, encode_mode2, encode_mode3, EncodedReport, ModeError, ReportMode,
    MAX_REPORT_LEN, MODE1_MARKER, MODE_REGISTER,
};
pub use types::{
    AnalogStick, Buttons, CanonicalPadState, ControllerId, DEFLECTION_MAX, RAW_PAYLOAD_LEN,
};
