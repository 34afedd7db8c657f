/// IO Expander shield: an MCP23017 and an ADS1015 sharing one I2C bus.
///
/// Each chip takes its own bus handle so callers can hand in two
/// `embedded-hal-bus` devices over the same physical bus.
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::ads1015::{self, Ads1015, DiffPair, Gain};
use crate::error::DriverError;
use crate::mcp23017::{self, Mcp23017, PinMode};
use crate::port::{ChangeCallback, PortWatchConfig};

pub struct Expander<I2C, D> {
    mcp: Mcp23017<I2C>,
    ads: Ads1015<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> Expander<I2C, D> {
    /// Both chips at their default addresses.
    pub fn begin(
        mcp_bus: I2C,
        ads_bus: I2C,
        delay: D,
    ) -> Result<Self, DriverError<I2C::Error>> {
        Self::begin_with(
            mcp_bus,
            ads_bus,
            delay,
            mcp23017::DEFAULT_ADDRESS,
            ads1015::DEFAULT_ADDRESS,
        )
    }

    pub fn begin_with(
        mcp_bus: I2C,
        ads_bus: I2C,
        delay: D,
        mcp_address: u8,
        ads_address: u8,
    ) -> Result<Self, DriverError<I2C::Error>> {
        let mut mcp = Mcp23017::new(mcp_bus, mcp_address);
        mcp.init()?;
        let ads = Ads1015::new(ads_bus, delay, ads_address);
        Ok(Self { mcp, ads })
    }

    pub fn mcp(&mut self) -> &mut Mcp23017<I2C> {
        &mut self.mcp
    }

    pub fn ads(&mut self) -> &mut Ads1015<I2C, D> {
        &mut self.ads
    }

    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), DriverError<I2C::Error>> {
        self.mcp.pin_mode(pin, mode)
    }

    pub fn pull_up(&mut self, pin: u8, enabled: bool) -> Result<(), DriverError<I2C::Error>> {
        self.mcp.pull_up(pin, enabled)
    }

    pub fn digital_write(&mut self, pin: u8, high: bool) -> Result<(), DriverError<I2C::Error>> {
        self.mcp.digital_write(pin, high)
    }

    pub fn digital_read(&mut self, pin: u8) -> Result<bool, DriverError<I2C::Error>> {
        self.mcp.digital_read(pin)
    }

    pub fn read_ports(&mut self) -> Result<u16, DriverError<I2C::Error>> {
        self.mcp.read_ports()
    }

    pub fn on_change(
        &mut self,
        handler: ChangeCallback,
        mask: u16,
    ) -> Result<(), DriverError<I2C::Error>> {
        self.mcp.on_change(handler, mask)
    }

    /// Treat the watched pins as active-low buttons: enable their pull-ups
    /// and report changes to `handler`.
    pub fn watch_buttons(
        &mut self,
        watch: PortWatchConfig,
        handler: ChangeCallback,
    ) -> Result<(), DriverError<I2C::Error>> {
        for pin in (0..mcp23017::PIN_COUNT).filter(|pin| watch.mask & (1 << pin) != 0) {
            self.mcp.pull_up(pin, true)?;
        }
        self.mcp.on_change(handler, watch.mask)
    }

    pub fn analog_read(&mut self, channel: u8) -> Result<u16, DriverError<I2C::Error>> {
        self.ads.read_single_ended(channel)
    }

    pub fn analog_read_differential(
        &mut self,
        pair: DiffPair,
    ) -> Result<i16, DriverError<I2C::Error>> {
        self.ads.read_differential(pair)
    }

    pub fn set_analog_gain(&mut self, gain: Gain) {
        self.ads.set_gain(gain);
    }

    /// Poll the GPIO ports for changes. Call once per input tick.
    pub fn update(&mut self) -> Result<u16, DriverError<I2C::Error>> {
        self.mcp.update()
    }

    /// Release both bus handles (MCP23017 first) and the delay.
    pub fn release(self) -> (I2C, I2C, D) {
        let (ads_bus, delay) = self.ads.release();
        (self.mcp.release(), ads_bus, delay)
    }
}
