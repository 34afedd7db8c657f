//! Host-side fakes for the `embedded-hal` traits used by the drivers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, Operation, SevenBitAddress};

/// Register-file I2C device.
///
/// The first written byte selects a register; following bytes are written
/// to it. With `width == 1` registers are bytes and the pointer
/// auto-increments (MCP23017, MPR121). With `width == 2` registers are
/// big-endian words and the pointer stays put (ADS1015).
pub struct FakeI2c {
    pub address: SevenBitAddress,
    pub width: usize,
    pub regs: [u16; 256],
    /// Every write transaction, address stripped
    pub writes: Vec<Vec<u8>>,
    pub fail: bool,
    pointer: u8,
}

impl FakeI2c {
    pub fn bytes(address: SevenBitAddress) -> Self {
        Self {
            address,
            width: 1,
            regs: [0; 256],
            writes: Vec::new(),
            fail: false,
            pointer: 0,
        }
    }

    pub fn words(address: SevenBitAddress) -> Self {
        Self {
            width: 2,
            ..Self::bytes(address)
        }
    }

    pub fn reg(&self, reg: u8) -> u16 {
        self.regs[reg as usize]
    }

    fn store(&mut self, data: &[u8]) {
        if self.width == 1 {
            for &b in data {
                self.regs[self.pointer as usize] = b as u16;
                self.pointer = self.pointer.wrapping_add(1);
            }
        } else if data.len() >= 2 {
            self.regs[self.pointer as usize] = u16::from_be_bytes([data[0], data[1]]);
        }
    }

    fn load(&mut self, buf: &mut [u8]) {
        if self.width == 1 {
            for b in buf.iter_mut() {
                *b = self.regs[self.pointer as usize] as u8;
                self.pointer = self.pointer.wrapping_add(1);
            }
        } else {
            let word = self.regs[self.pointer as usize].to_be_bytes();
            for (b, w) in buf.iter_mut().zip(word.iter()) {
                *b = *w;
            }
        }
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Bus);
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address));
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push(bytes.to_vec());
                    if let Some((&reg, rest)) = bytes.split_first() {
                        self.pointer = reg;
                        self.store(rest);
                    }
                }
                Operation::Read(buf) => self.load(buf),
            }
        }
        Ok(())
    }
}

/// Delay that only counts.
#[derive(Default)]
pub struct FakeDelay {
    pub total_ns: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Output pin whose level can be inspected after the driver owns it.
#[derive(Clone, Default)]
pub struct FakeOutput {
    pub high: Rc<Cell<bool>>,
}

impl PinErrorType for FakeOutput {
    type Error = core::convert::Infallible;
}

impl OutputPin for FakeOutput {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.set(false);
        Ok(())
    }
}

/// Input pin returning queued levels, then `rest`.
pub struct FakeInput {
    pub levels: VecDeque<bool>,
    pub rest: bool,
    pub reads: usize,
}

impl FakeInput {
    pub fn constant(high: bool) -> Self {
        Self {
            levels: VecDeque::new(),
            rest: high,
            reads: 0,
        }
    }
}

impl PinErrorType for FakeInput {
    type Error = core::convert::Infallible;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.reads += 1;
        Ok(self.levels.pop_front().unwrap_or(self.rest))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

/// Two-wire serial line: the clock pin latches the data level on each
/// rising edge.
#[derive(Default)]
pub struct Wire {
    pub data: bool,
    pub bits: Vec<bool>,
}

impl Wire {
    /// Latched bits packed MSB-first.
    pub fn bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|c| c.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
            .collect()
    }
}

pub struct DataPin(pub Rc<RefCell<Wire>>);
pub struct ClockPin(pub Rc<RefCell<Wire>>);

impl PinErrorType for DataPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for DataPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().data = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().data = false;
        Ok(())
    }
}

impl PinErrorType for ClockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for ClockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.0.borrow_mut();
        let level = wire.data;
        wire.bits.push(level);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
