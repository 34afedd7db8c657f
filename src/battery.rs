/// LiPo battery monitoring for the TinyPICO.
///
/// The charger's status output is low while charging. Battery voltage is
/// read through a divider on an ADC pin; the conversion below is a rough
/// linear fit where a raw reading of 3838 corresponds to 4.2 V.
use embedded_hal::digital::InputPin;

use crate::debounce::Timestamp;

/// Charge-pin samples taken per `is_charging` call.
pub const CHARGE_SAMPLES: usize = 10;

/// Minimum time between voltage samples.
pub const SAMPLE_INTERVAL_MS: u32 = 1000;

/// Raw ADC reading at full charge.
pub const RAW_FULL: u32 = 3838;

pub const FULL_MV: u32 = 4200;
pub const EMPTY_MV: u32 = 3000;

/// True only if the charge pin reads low on every sample.
pub fn is_charging<P: InputPin>(pin: &mut P) -> Result<bool, P::Error> {
    for _ in 0..CHARGE_SAMPLES {
        if pin.is_high()? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub const fn raw_to_millivolts(raw: u16) -> u32 {
    raw as u32 * FULL_MV / RAW_FULL
}

/// Linear charge estimate, clamped to 0..=100.
pub const fn battery_percentage(mv: u32) -> u8 {
    if mv <= EMPTY_MV {
        0
    } else if mv >= FULL_MV {
        100
    } else {
        ((mv - EMPTY_MV) * 100 / (FULL_MV - EMPTY_MV)) as u8
    }
}

/// Rate-limited battery voltage.
///
/// The first call always samples; later calls reuse the cached value until
/// `SAMPLE_INTERVAL_MS` has passed.
#[derive(Debug, Default)]
pub struct BatteryMonitor {
    last_sample: Option<Timestamp>,
    last_mv: u32,
}

impl BatteryMonitor {
    pub const fn new() -> Self {
        Self {
            last_sample: None,
            last_mv: 0,
        }
    }

    /// Battery voltage in millivolts. `read_raw` is only called when a new
    /// sample is due.
    pub fn voltage_mv<E>(
        &mut self,
        now: Timestamp,
        read_raw: impl FnOnce() -> Result<u16, E>,
    ) -> Result<u32, E> {
        let due = match self.last_sample {
            None => true,
            Some(at) => now.wrapping_sub(at) >= SAMPLE_INTERVAL_MS,
        };
        if due {
            self.last_mv = raw_to_millivolts(read_raw()?);
            self.last_sample = Some(now);
            log::trace!("Battery sampled: {} mV", self.last_mv);
        }
        Ok(self.last_mv)
    }

    pub fn last_mv(&self) -> u32 {
        self.last_mv
    }
}
