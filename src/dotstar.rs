/// Onboard APA102 "DotStar" RGB LED, bit-banged over two GPIOs.
///
/// The LED has its own power switch (active low). Power is turned on
/// lazily by the first `show()`.
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::debounce::Timestamp;

/// Settle time after powering the LED up.
pub const POWER_UP_DELAY_MS: u32 = 200;

/// Pack R, G, B into 0x00RRGGBB.
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Colour wheel: 0..=255 walks red, green, blue and back to red.
pub const fn color_wheel(pos: u8) -> (u8, u8, u8) {
    let pos = 255 - pos;
    if pos < 85 {
        (255 - pos * 3, 0, pos * 3)
    } else if pos < 170 {
        let pos = pos - 85;
        (0, pos * 3, 255 - pos * 3)
    } else {
        let pos = pos - 170;
        (pos * 3, 255 - pos * 3, 0)
    }
}

pub struct DotStar<DATA, CLK, PWR, D> {
    data: DATA,
    clock: CLK,
    power: PWR,
    delay: D,
    /// B, G, R in wire order
    pixel: [u8; 3],
    /// User brightness + 1, wrapping: 0 = full, 1 = off
    brightness: u8,
    powered: bool,
    rotation: u8,
    next_rotation: Timestamp,
}

impl<DATA, CLK, PWR, D> DotStar<DATA, CLK, PWR, D>
where
    DATA: OutputPin,
    CLK: OutputPin<Error = DATA::Error>,
    PWR: OutputPin<Error = DATA::Error>,
    D: DelayNs,
{
    /// Takes the pins with the LED powered off.
    pub fn new(data: DATA, clock: CLK, power: PWR, delay: D) -> Result<Self, DATA::Error> {
        let mut led = Self {
            data,
            clock,
            power,
            delay,
            pixel: [0; 3],
            brightness: 128,
            powered: false,
            rotation: 0,
            next_rotation: 0,
        };
        led.set_power(false)?;
        Ok(led)
    }

    pub fn set_power(&mut self, on: bool) -> Result<(), DATA::Error> {
        // Active low
        if on {
            self.power.set_low()?;
        } else {
            self.power.set_high()?;
        }
        self.data.set_low()?;
        self.clock.set_low()?;
        self.powered = on;
        Ok(())
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Global brightness, 0 = off, 255 = full. Takes effect on the next
    /// `show()`.
    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness.wrapping_add(1);
    }

    pub fn set_pixel_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), DATA::Error> {
        self.pixel = [b, g, r];
        self.show()
    }

    /// Set from a packed 0x00RRGGBB value.
    pub fn set_pixel_packed(&mut self, color: u32) -> Result<(), DATA::Error> {
        let [_, r, g, b] = color.to_be_bytes();
        self.set_pixel_color(r, g, b)
    }

    pub fn clear(&mut self) -> Result<(), DATA::Error> {
        self.pixel = [0; 3];
        self.show()
    }

    /// Clock the current pixel out to the LED.
    pub fn show(&mut self) -> Result<(), DATA::Error> {
        if !self.powered {
            self.set_power(true)?;
            self.delay.delay_ms(POWER_UP_DELAY_MS);
        }

        for _ in 0..4 {
            self.write_byte(0x00)?;
        }
        self.write_byte(0xFF)?;
        let pixel = self.pixel;
        for value in pixel {
            let value = self.scaled(value);
            self.write_byte(value)?;
        }
        self.write_byte(0xFF)
    }

    /// Step the colour wheel once `wait_ms` has passed since the last step.
    pub fn cycle_color(&mut self, now: Timestamp, wait_ms: u32) -> Result<(), DATA::Error> {
        if now.wrapping_sub(self.next_rotation) <= wait_ms {
            return Ok(());
        }
        self.next_rotation = now;
        self.rotation = self.rotation.wrapping_add(1);
        let (r, g, b) = color_wheel(self.rotation);
        self.set_pixel_color(r, g, b)
    }

    fn scaled(&self, value: u8) -> u8 {
        if self.brightness == 0 {
            value
        } else {
            ((value as u16 * self.brightness as u16) >> 8) as u8
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DATA::Error> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.clock.set_high()?;
            self.clock.set_low()?;
        }
        Ok(())
    }
}
