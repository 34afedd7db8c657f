/// MCP23017 16-bit I2C GPIO expander.
///
/// Port A is pins 0..8, port B pins 8..16. Registers use the default
/// IOCON.BANK = 0 layout (A/B interleaved, sequential addressing), so a
/// two-byte read from GPIOA returns both ports. Change detection on the
/// input pins is delegated to a `PortChangeDetector`, fed by `update()`.
use embedded_hal::i2c::I2c;

use crate::error::DriverError;
use crate::port::{ChangeCallback, PortChangeDetector};

/// Address with A0..A2 tied low.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Number of GPIO pins.
pub const PIN_COUNT: u8 = 16;

/// Register addresses (IOCON.BANK = 0).
pub mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const IPOLA: u8 = 0x02;
    pub const IPOLB: u8 = 0x03;
    pub const GPINTENA: u8 = 0x04;
    pub const GPINTENB: u8 = 0x05;
    pub const DEFVALA: u8 = 0x06;
    pub const DEFVALB: u8 = 0x07;
    pub const INTCONA: u8 = 0x08;
    pub const INTCONB: u8 = 0x09;
    pub const IOCONA: u8 = 0x0A;
    pub const IOCONB: u8 = 0x0B;
    pub const GPPUA: u8 = 0x0C;
    pub const GPPUB: u8 = 0x0D;
    pub const INTFA: u8 = 0x0E;
    pub const INTFB: u8 = 0x0F;
    pub const INTCAPA: u8 = 0x10;
    pub const INTCAPB: u8 = 0x11;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
    pub const OLATA: u8 = 0x14;
    pub const OLATB: u8 = 0x15;
}

// IOCON bits
const IOCON_MIRROR: u8 = 6;
const IOCON_ODR: u8 = 2;
const IOCON_INTPOL: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Interrupt trigger for a single pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    /// Any change from the previous value
    Change,
    /// Compare against DEFVAL = 0
    Rising,
    /// Compare against DEFVAL = 1
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
}

impl Port {
    const fn gpio(self) -> u8 {
        match self {
            Port::A => reg::GPIOA,
            Port::B => reg::GPIOB,
        }
    }
}

/// Interrupt output configuration shared by both INT pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptConfig {
    /// INTA and INTB are OR'ed together
    pub mirror: bool,
    /// Open-drain output (overrides polarity)
    pub open_drain: bool,
    /// Active-high INT output
    pub active_high: bool,
}

pub struct Mcp23017<I2C> {
    i2c: I2C,
    address: u8,
    changes: PortChangeDetector,
}

impl<I2C: I2c> Mcp23017<I2C> {
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            changes: PortChangeDetector::new(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Put every pin in input mode.
    pub fn init(&mut self) -> Result<(), DriverError<I2C::Error>> {
        self.write(reg::IODIRA, 0xFF)?;
        self.write(reg::IODIRB, 0xFF)?;
        log::info!("MCP23017 ready at 0x{:02X}", self.address);
        Ok(())
    }

    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), DriverError<I2C::Error>> {
        self.update_bit(pin, mode == PinMode::Input, reg::IODIRA, reg::IODIRB)
    }

    /// Enable or disable the 100k pull-up on `pin`.
    pub fn pull_up(&mut self, pin: u8, enabled: bool) -> Result<(), DriverError<I2C::Error>> {
        self.update_bit(pin, enabled, reg::GPPUA, reg::GPPUB)
    }

    /// Drive an output pin. Starts from the output latch so other pins keep
    /// their driven level rather than their read-back level.
    pub fn digital_write(&mut self, pin: u8, high: bool) -> Result<(), DriverError<I2C::Error>> {
        let (olat, gpio) = if Self::bank(pin)? {
            (reg::OLATA, reg::GPIOA)
        } else {
            (reg::OLATB, reg::GPIOB)
        };
        let value = with_bit(self.read(olat)?, pin % 8, high);
        self.write(gpio, value)
    }

    pub fn digital_read(&mut self, pin: u8) -> Result<bool, DriverError<I2C::Error>> {
        let gpio = if Self::bank(pin)? { reg::GPIOA } else { reg::GPIOB };
        Ok((self.read(gpio)? >> (pin % 8)) & 1 == 1)
    }

    /// Both ports, A in the low byte.
    pub fn read_ports(&mut self) -> Result<u16, DriverError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::GPIOA], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_port(&mut self, port: Port) -> Result<u8, DriverError<I2C::Error>> {
        self.read(port.gpio())
    }

    /// Configure the INT outputs on both banks.
    pub fn setup_interrupts(
        &mut self,
        config: InterruptConfig,
    ) -> Result<(), DriverError<I2C::Error>> {
        for iocon in [reg::IOCONA, reg::IOCONB] {
            let mut value = self.read(iocon)?;
            value = with_bit(value, IOCON_MIRROR, config.mirror);
            value = with_bit(value, IOCON_ODR, config.open_drain);
            value = with_bit(value, IOCON_INTPOL, config.active_high);
            self.write(iocon, value)?;
        }
        Ok(())
    }

    /// Enable the interrupt-on-change for `pin`.
    pub fn setup_interrupt_pin(
        &mut self,
        pin: u8,
        mode: InterruptMode,
    ) -> Result<(), DriverError<I2C::Error>> {
        // INTCON: 0 = compare with previous value, 1 = compare with DEFVAL
        self.update_bit(pin, mode != InterruptMode::Change, reg::INTCONA, reg::INTCONB)?;
        self.update_bit(pin, mode == InterruptMode::Falling, reg::DEFVALA, reg::DEFVALB)?;
        self.update_bit(pin, true, reg::GPINTENA, reg::GPINTENB)
    }

    /// Pin that raised the last interrupt, or `None` if no flag is set.
    pub fn last_interrupt_pin(&mut self) -> Result<Option<u8>, DriverError<I2C::Error>> {
        let intf = self.read(reg::INTFA)?;
        if intf != 0 {
            return Ok(Some(intf.trailing_zeros() as u8));
        }
        let intf = self.read(reg::INTFB)?;
        if intf != 0 {
            return Ok(Some(intf.trailing_zeros() as u8 + 8));
        }
        Ok(None)
    }

    /// Level of the interrupting pin captured at interrupt time.
    pub fn last_interrupt_pin_value(
        &mut self,
    ) -> Result<Option<bool>, DriverError<I2C::Error>> {
        let Some(pin) = self.last_interrupt_pin()? else {
            return Ok(None);
        };
        let intcap = if pin < 8 { reg::INTCAPA } else { reg::INTCAPB };
        Ok(Some((self.read(intcap)? >> (pin % 8)) & 1 == 1))
    }

    /// Report changes on the pins in `mask` through `handler`.
    ///
    /// The current port state becomes the baseline, so the first `update()`
    /// only reports real edges.
    pub fn on_change(
        &mut self,
        handler: ChangeCallback,
        mask: u16,
    ) -> Result<(), DriverError<I2C::Error>> {
        let ports = self.read_ports()?;
        self.changes.configure(mask, Some(handler));
        self.changes.seed(ports);
        log::info!("MCP23017 change handler on mask 0x{:04X}", mask);
        Ok(())
    }

    /// Read both ports and dispatch change events. Returns the snapshot.
    pub fn update(&mut self) -> Result<u16, DriverError<I2C::Error>> {
        let ports = self.read_ports()?;
        self.changes.poll(ports);
        Ok(ports)
    }

    /// True for port A, false for port B.
    fn bank(pin: u8) -> Result<bool, DriverError<I2C::Error>> {
        if pin >= PIN_COUNT {
            return Err(DriverError::InvalidPin(pin));
        }
        Ok(pin < 8)
    }

    fn update_bit(
        &mut self,
        pin: u8,
        set: bool,
        reg_a: u8,
        reg_b: u8,
    ) -> Result<(), DriverError<I2C::Error>> {
        let reg = if Self::bank(pin)? { reg_a } else { reg_b };
        let value = with_bit(self.read(reg)?, pin % 8, set);
        self.write(reg, value)
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), DriverError<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(DriverError::I2c)
    }

    fn read(&mut self, reg: u8) -> Result<u8, DriverError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(buf[0])
    }
}

fn with_bit(value: u8, bit: u8, set: bool) -> u8 {
    if set {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}
