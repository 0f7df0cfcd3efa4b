//! Raw pin and ADC primitives the readers sample through.

/// One of the two 8-line digital ports wired to the controller connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// D-pad, face buttons, Select and Start. Light-gun signals live here too.
    Main,
    /// Second button row: A, X, L, R, Home, ZL, ZR (variant dependent).
    Extra,
}

/// ADC channel index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogChannel(pub u8);

impl AnalogChannel {
    pub const LEFT_X: Self = Self(0);
    pub const LEFT_Y: Self = Self(1);
    pub const RIGHT_X: Self = Self(2);
    pub const RIGHT_Y: Self = Self(3);
    pub const LEFT_TRIGGER: Self = Self(6);
    pub const RIGHT_TRIGGER: Self = Self(7);
}

/// Raw hardware access for controller readers.
///
/// Implementations are blocking and bounded: `sample_analog` waits for a
/// single conversion and nothing more.
pub trait PadHardware {
    /// Configure the lines selected by `mask` as pulled-up inputs.
    fn configure_inputs(&mut self, port: Port, mask: u8);

    /// Electrical level of all eight lines of a port, 1 = high.
    ///
    /// Buttons pull their line low, so a pressed button reads 0.
    fn read_port(&mut self, port: Port) -> u8;

    /// One calibrated 8-bit conversion, 0x80 at rest.
    fn sample_analog(&mut self, channel: AnalogChannel) -> u8;
}

impl<T: PadHardware + ?Sized> PadHardware for &mut T {
    fn configure_inputs(&mut self, port: Port, mask: u8) {
        (**self).configure_inputs(port, mask)
    }

    fn read_port(&mut self, port: Port) -> u8 {
        (**self).read_port(port)
    }

    fn sample_analog(&mut self, channel: AnalogChannel) -> u8 {
        (**self).sample_analog(channel)
    }
}
