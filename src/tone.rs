/// Piezo beep descriptions for the Explorer shield buzzer.
///
/// A `Tone` is what the firmware queues for the buzzer task: pitch, length
/// and loudness. The LEDC duty cycle is derived here so the mapping can be
/// tested on the host.

/// Loudness is a percentage of the loudest the piezo can go.
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub freq_hz: u32,
    pub duration_ms: u64,
    volume: u8,
}

impl Tone {
    pub const fn new(freq_hz: u32, duration_ms: u64) -> Self {
        Self {
            freq_hz,
            duration_ms,
            volume: MAX_VOLUME,
        }
    }

    /// Same tone at `volume` percent, capped at `MAX_VOLUME`.
    pub const fn with_volume(self, volume: u8) -> Self {
        let volume = if volume > MAX_VOLUME { MAX_VOLUME } else { volume };
        Self { volume, ..self }
    }

    pub const fn volume(&self) -> u8 {
        self.volume
    }

    /// PWM duty for this tone. A passive piezo peaks at 50% duty, so full
    /// volume maps there and anything above it would only get quieter.
    pub const fn duty_pct(&self) -> u8 {
        self.volume / 2
    }

    /// Nothing audible would be produced.
    pub const fn is_silent(&self) -> bool {
        self.freq_hz == 0 || self.duration_ms == 0 || self.duty_pct() == 0
    }
}

/// Short click played when a face pad is first touched.
#[cfg(feature = "board-explorer")]
pub const TOUCH_TONE: Tone = Tone::new(
    crate::board::BUZZER_FREQ_HZ,
    crate::board::BUZZER_BEEP_MS,
);
