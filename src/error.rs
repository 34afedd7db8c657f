/// Error types shared by the input core and the bus drivers.
use core::fmt;

/// Configuration errors raised by the input core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Click threshold must be strictly below the long-press threshold.
    InvalidThresholds { click: u32, long_press: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidThresholds { click, long_press } => write!(
                f,
                "click threshold {click} must be below long-press threshold {long_press}"
            ),
        }
    }
}

/// Errors returned by the I2C device drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError<E> {
    /// Underlying bus error
    I2c(E),
    /// Pin number outside the device's range
    InvalidPin(u8),
    /// Analog channel outside the device's range
    InvalidChannel(u8),
    /// Device did not identify itself at the expected address
    NotFound(u8),
}

impl<E: fmt::Debug> fmt::Display for DriverError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::I2c(e) => write!(f, "i2c error: {e:?}"),
            DriverError::InvalidPin(pin) => write!(f, "invalid pin {pin}"),
            DriverError::InvalidChannel(ch) => write!(f, "invalid channel {ch}"),
            DriverError::NotFound(addr) => write!(f, "no device at 0x{addr:02X}"),
        }
    }
}
