/// ADS1015 12-bit I2C ADC.
///
/// Every read is a single-shot conversion: write the config register with
/// the OS bit set, wait one conversion period, read the conversion
/// register. Results are left-justified in 16 bits and shifted down by 4.
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::DriverError;

/// Address with ADDR tied to GND.
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Conversion time at 1600 SPS, rounded up.
pub const CONVERSION_DELAY_MS: u32 = 1;

const BIT_SHIFT: u8 = 4;

/// Register pointers
pub mod pointer {
    pub const CONVERT: u8 = 0x00;
    pub const CONFIG: u8 = 0x01;
    pub const LOW_THRESH: u8 = 0x02;
    pub const HIGH_THRESH: u8 = 0x03;
}

/// Config register fields
pub mod config {
    pub const OS_SINGLE: u16 = 0x8000;

    pub const MUX_DIFF_0_1: u16 = 0x0000;
    pub const MUX_DIFF_0_3: u16 = 0x1000;
    pub const MUX_DIFF_1_3: u16 = 0x2000;
    pub const MUX_DIFF_2_3: u16 = 0x3000;
    pub const MUX_SINGLE_0: u16 = 0x4000;
    pub const MUX_SINGLE_1: u16 = 0x5000;
    pub const MUX_SINGLE_2: u16 = 0x6000;
    pub const MUX_SINGLE_3: u16 = 0x7000;

    pub const MODE_CONTIN: u16 = 0x0000;
    pub const MODE_SINGLE: u16 = 0x0100;

    pub const DR_1600SPS: u16 = 0x0080;

    pub const CMODE_TRAD: u16 = 0x0000;
    pub const CPOL_ACTVLOW: u16 = 0x0000;

    pub const CLAT_NONLAT: u16 = 0x0000;
    pub const CLAT_LATCH: u16 = 0x0004;

    pub const CQUE_1CONV: u16 = 0x0000;
    pub const CQUE_NONE: u16 = 0x0003;
}

/// Programmable gain amplifier setting (full-scale input range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gain {
    /// ±6.144 V (input still limited to VDD + 0.3 V)
    #[default]
    TwoThirds,
    /// ±4.096 V
    One,
    /// ±2.048 V
    Two,
    /// ±1.024 V
    Four,
    /// ±0.512 V
    Eight,
    /// ±0.256 V
    Sixteen,
}

impl Gain {
    pub const fn bits(self) -> u16 {
        match self {
            Gain::TwoThirds => 0x0000,
            Gain::One => 0x0200,
            Gain::Two => 0x0400,
            Gain::Four => 0x0600,
            Gain::Eight => 0x0800,
            Gain::Sixteen => 0x0A00,
        }
    }
}

/// Differential input pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffPair {
    /// AIN0 positive, AIN1 negative
    Ain0Ain1,
    /// AIN2 positive, AIN3 negative
    Ain2Ain3,
}

impl DiffPair {
    const fn mux(self) -> u16 {
        match self {
            DiffPair::Ain0Ain1 => config::MUX_DIFF_0_1,
            DiffPair::Ain2Ain3 => config::MUX_DIFF_2_3,
        }
    }
}

const fn single_mux(channel: u8) -> Option<u16> {
    match channel {
        0 => Some(config::MUX_SINGLE_0),
        1 => Some(config::MUX_SINGLE_1),
        2 => Some(config::MUX_SINGLE_2),
        3 => Some(config::MUX_SINGLE_3),
        _ => None,
    }
}

/// Base config for a single-shot read with the comparator disabled.
const SINGLE_SHOT: u16 = config::CQUE_NONE
    | config::CLAT_NONLAT
    | config::CPOL_ACTVLOW
    | config::CMODE_TRAD
    | config::DR_1600SPS
    | config::MODE_SINGLE;

/// Base config for continuous conversion with a latching comparator.
const COMPARATOR: u16 = config::CQUE_1CONV
    | config::CLAT_LATCH
    | config::CPOL_ACTVLOW
    | config::CMODE_TRAD
    | config::DR_1600SPS
    | config::MODE_CONTIN;

/// Sign-extend a 12-bit conversion result.
pub const fn sign_extend_12(raw: u16) -> i16 {
    if raw > 0x07FF {
        (raw | 0xF000) as i16
    } else {
        raw as i16
    }
}

pub struct Ads1015<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    gain: Gain,
}

impl<I2C: I2c, D: DelayNs> Ads1015<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            gain: Gain::default(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn set_gain(&mut self, gain: Gain) {
        self.gain = gain;
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Single-ended conversion on AIN0..AIN3.
    pub fn read_single_ended(&mut self, channel: u8) -> Result<u16, DriverError<I2C::Error>> {
        let mux = single_mux(channel).ok_or(DriverError::InvalidChannel(channel))?;
        self.write(pointer::CONFIG, SINGLE_SHOT | self.gain.bits() | mux | config::OS_SINGLE)?;
        self.delay.delay_ms(CONVERSION_DELAY_MS);
        Ok(self.read(pointer::CONVERT)? >> BIT_SHIFT)
    }

    /// Signed differential conversion.
    pub fn read_differential(&mut self, pair: DiffPair) -> Result<i16, DriverError<I2C::Error>> {
        self.write(
            pointer::CONFIG,
            SINGLE_SHOT | self.gain.bits() | pair.mux() | config::OS_SINGLE,
        )?;
        self.delay.delay_ms(CONVERSION_DELAY_MS);
        Ok(sign_extend_12(self.read(pointer::CONVERT)? >> BIT_SHIFT))
    }

    /// Continuous conversion on `channel`; ALERT/RDY asserts once a result
    /// exceeds `threshold` and stays latched until read.
    pub fn start_comparator(
        &mut self,
        channel: u8,
        threshold: i16,
    ) -> Result<(), DriverError<I2C::Error>> {
        let mux = single_mux(channel).ok_or(DriverError::InvalidChannel(channel))?;
        self.write(pointer::HIGH_THRESH, (threshold << BIT_SHIFT) as u16)?;
        self.write(pointer::CONFIG, COMPARATOR | self.gain.bits() | mux)?;
        log::debug!("ADS1015 comparator on AIN{} above {}", channel, threshold);
        Ok(())
    }

    /// Latest result of a running continuous conversion.
    pub fn last_conversion(&mut self) -> Result<i16, DriverError<I2C::Error>> {
        self.delay.delay_ms(CONVERSION_DELAY_MS);
        Ok(sign_extend_12(self.read(pointer::CONVERT)? >> BIT_SHIFT))
    }

    fn write(&mut self, reg: u8, value: u16) -> Result<(), DriverError<I2C::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .map_err(DriverError::I2c)
    }

    fn read(&mut self, reg: u8) -> Result<u16, DriverError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }
}
