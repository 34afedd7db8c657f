/// MPR121 12-electrode capacitive touch controller.
///
/// Used on the Explorer shield for the face pads. `touched()` returns the
/// raw 12-bit touch status that `TouchPads::poll_all` consumes.
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::DriverError;

/// Address with ADDR tied to GND.
pub const DEFAULT_ADDRESS: u8 = 0x5A;

pub const ELECTRODE_COUNT: u8 = 12;

pub const DEFAULT_TOUCH_THRESHOLD: u8 = 12;
pub const DEFAULT_RELEASE_THRESHOLD: u8 = 6;

/// CONFIG2 value after a soft reset.
const CONFIG2_RESET: u8 = 0x24;

const SOFT_RESET_MAGIC: u8 = 0x63;

/// Baseline tracking on, all 12 electrodes enabled.
const ECR_RUN: u8 = 0x80 | ELECTRODE_COUNT;

const TOUCH_MASK: u16 = 0x0FFF;

pub mod reg {
    pub const TOUCH_STATUS_L: u8 = 0x00;
    pub const TOUCH_STATUS_H: u8 = 0x01;
    pub const FILTERED_0L: u8 = 0x04;
    pub const BASELINE_0: u8 = 0x1E;
    pub const MHDR: u8 = 0x2B;
    pub const NHDR: u8 = 0x2C;
    pub const NCLR: u8 = 0x2D;
    pub const FDLR: u8 = 0x2E;
    pub const MHDF: u8 = 0x2F;
    pub const NHDF: u8 = 0x30;
    pub const NCLF: u8 = 0x31;
    pub const FDLF: u8 = 0x32;
    pub const NHDT: u8 = 0x33;
    pub const NCLT: u8 = 0x34;
    pub const FDLT: u8 = 0x35;
    pub const TOUCH_THRESHOLD_0: u8 = 0x41;
    pub const RELEASE_THRESHOLD_0: u8 = 0x42;
    pub const DEBOUNCE: u8 = 0x5B;
    pub const CONFIG1: u8 = 0x5C;
    pub const CONFIG2: u8 = 0x5D;
    pub const ECR: u8 = 0x5E;
    pub const SOFT_RESET: u8 = 0x80;
}

/// Baseline filter settings written during `init`, as (register, value).
const FILTER_SETUP: [(u8, u8); 14] = [
    (reg::MHDR, 0x01),
    (reg::NHDR, 0x01),
    (reg::NCLR, 0x0E),
    (reg::FDLR, 0x00),
    (reg::MHDF, 0x01),
    (reg::NHDF, 0x05),
    (reg::NCLF, 0x01),
    (reg::FDLF, 0x00),
    (reg::NHDT, 0x00),
    (reg::NCLT, 0x00),
    (reg::FDLT, 0x00),
    (reg::DEBOUNCE, 0x00),
    // 16uA charge current
    (reg::CONFIG1, 0x10),
    // 0.5us charge time, 1ms sample interval
    (reg::CONFIG2, 0x20),
];

pub struct Mpr121<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mpr121<I2C> {
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Reset the controller, check it answers like an MPR121, then start
    /// sensing on all electrodes with the default thresholds.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<I2C::Error>> {
        self.write(reg::SOFT_RESET, SOFT_RESET_MAGIC)?;
        delay.delay_ms(1);

        // Electrodes must be stopped before any config write
        self.write(reg::ECR, 0x00)?;

        let config2 = self.read(reg::CONFIG2)?;
        if config2 != CONFIG2_RESET {
            log::warn!(
                "MPR121 at 0x{:02X}: CONFIG2 reads 0x{:02X}, expected 0x{:02X}",
                self.address,
                config2,
                CONFIG2_RESET
            );
            return Err(DriverError::NotFound(self.address));
        }

        self.set_thresholds(DEFAULT_TOUCH_THRESHOLD, DEFAULT_RELEASE_THRESHOLD)?;
        for (reg, value) in FILTER_SETUP {
            self.write(reg, value)?;
        }
        self.write(reg::ECR, ECR_RUN)?;

        log::info!("MPR121 ready at 0x{:02X}", self.address);
        Ok(())
    }

    /// Same touch/release thresholds on every electrode.
    pub fn set_thresholds(&mut self, touch: u8, release: u8) -> Result<(), DriverError<I2C::Error>> {
        for i in 0..ELECTRODE_COUNT {
            self.write(reg::TOUCH_THRESHOLD_0 + 2 * i, touch)?;
            self.write(reg::RELEASE_THRESHOLD_0 + 2 * i, release)?;
        }
        Ok(())
    }

    /// Touch status, bit i = electrode i.
    pub fn touched(&mut self) -> Result<u16, DriverError<I2C::Error>> {
        Ok(self.read16(reg::TOUCH_STATUS_L)? & TOUCH_MASK)
    }

    /// 10-bit filtered electrode reading.
    pub fn filtered_data(&mut self, electrode: u8) -> Result<u16, DriverError<I2C::Error>> {
        if electrode >= ELECTRODE_COUNT {
            return Err(DriverError::InvalidChannel(electrode));
        }
        Ok(self.read16(reg::FILTERED_0L + 2 * electrode)? & 0x03FF)
    }

    /// Baseline value, upper 8 of 10 bits.
    pub fn baseline_data(&mut self, electrode: u8) -> Result<u16, DriverError<I2C::Error>> {
        if electrode >= ELECTRODE_COUNT {
            return Err(DriverError::InvalidChannel(electrode));
        }
        Ok((self.read(reg::BASELINE_0 + electrode)? as u16) << 2)
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

    fn read16(&mut self, reg: u8) -> Result<u16, DriverError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(DriverError::I2c)?;
        Ok(u16::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDelay, FakeI2c};
    use embedded_hal::i2c::ErrorKind;

    fn ready_bus() -> FakeI2c {
        let mut bus = FakeI2c::bytes(DEFAULT_ADDRESS);
        bus.regs[reg::CONFIG2 as usize] = CONFIG2_RESET as u16;
        bus
    }

    // ── init ────────────────────────────────────────────────────────

    #[test]
    fn init_resets_then_enables_electrodes() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        let mut delay = FakeDelay::default();
        mpr.init(&mut delay).unwrap();

        assert_eq!(mpr.i2c.writes[0], [reg::SOFT_RESET, SOFT_RESET_MAGIC]);
        assert_eq!(mpr.i2c.writes[1], [reg::ECR, 0x00]);
        assert_eq!(mpr.i2c.writes.last().unwrap(), &[reg::ECR, 0x8C]);
        assert_eq!(delay.total_ns, 1_000_000);
    }

    #[test]
    fn init_writes_thresholds_for_every_electrode() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        mpr.init(&mut FakeDelay::default()).unwrap();

        for i in 0..ELECTRODE_COUNT {
            assert_eq!(mpr.i2c.reg(0x41 + 2 * i), 12);
            assert_eq!(mpr.i2c.reg(0x42 + 2 * i), 6);
        }
        assert_eq!(mpr.i2c.reg(reg::CONFIG1), 0x10);
        assert_eq!(mpr.i2c.reg(reg::CONFIG2), 0x20);
    }

    #[test]
    fn init_fails_when_config2_does_not_match() {
        let mut mpr = Mpr121::new(FakeI2c::bytes(DEFAULT_ADDRESS), DEFAULT_ADDRESS);
        let err = mpr.init(&mut FakeDelay::default()).unwrap_err();
        assert_eq!(err, DriverError::NotFound(DEFAULT_ADDRESS));
        // Nothing after the identity check
        assert_eq!(mpr.i2c.writes.len(), 3);
    }

    #[test]
    fn wrong_address_surfaces_bus_error() {
        let mut mpr = Mpr121::new(ready_bus(), 0x5B);
        let err = mpr.init(&mut FakeDelay::default()).unwrap_err();
        assert!(matches!(err, DriverError::I2c(ErrorKind::NoAcknowledge(_))));
    }

    // ── Readings ────────────────────────────────────────────────────

    #[test]
    fn touched_masks_to_twelve_bits() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        mpr.i2c.regs[reg::TOUCH_STATUS_L as usize] = 0x01;
        // Bit 15 is the over-current flag
        mpr.i2c.regs[reg::TOUCH_STATUS_H as usize] = 0x8A;
        assert_eq!(mpr.touched().unwrap(), 0x0A01);
    }

    #[test]
    fn filtered_data_reads_ten_bits_little_endian() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        mpr.i2c.regs[0x04 + 6] = 0x34;
        mpr.i2c.regs[0x04 + 7] = 0xFE;
        assert_eq!(mpr.filtered_data(3).unwrap(), 0x0234);
    }

    #[test]
    fn baseline_is_scaled_by_four() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        mpr.i2c.regs[(reg::BASELINE_0 + 2) as usize] = 0x40;
        assert_eq!(mpr.baseline_data(2).unwrap(), 0x100);
    }

    #[test]
    fn electrode_out_of_range() {
        let mut mpr = Mpr121::new(ready_bus(), DEFAULT_ADDRESS);
        assert_eq!(mpr.filtered_data(12), Err(DriverError::InvalidChannel(12)));
        assert_eq!(mpr.baseline_data(40), Err(DriverError::InvalidChannel(40)));
    }
}
