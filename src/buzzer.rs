/// Explorer shield piezo on one LEDC low-speed channel.
///
/// Touch activations queue a `Tone` on `BUZZER_SIGNAL`. The LEDC timer is
/// set up once at the touch click pitch; each tone sets the duty, holds for
/// its length, then silences the piezo.
use embassy_time::{Duration, Timer};
use esp_hal::gpio::DriveMode;
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, config::Duty, TimerIFace};
use esp_hal::ledc::{Ledc, LowSpeed};
use esp_hal::time::Rate;

use crate::board;
use crate::tone::TOUCH_TONE;

type PiezoPin = esp_hal::peripherals::GPIO25<'static>;

/// Set the piezo duty. Failures are logged and reported as `false`.
fn drive(piezo: &mut channel::Channel<'_, LowSpeed>, duty_pct: u8) -> bool {
    match piezo.set_duty(duty_pct) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Buzzer duty {}% failed: {:?}", duty_pct, e);
            false
        }
    }
}

#[embassy_executor::task]
pub async fn buzzer_task(ledc: esp_hal::peripherals::LEDC<'static>, pin: PiezoPin) {
    let ledc = Ledc::new(ledc);

    let mut pitch = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    let pitch_config = timer::config::Config {
        duty: Duty::Duty8Bit,
        clock_source: timer::LSClockSource::APBClk,
        frequency: Rate::from_hz(TOUCH_TONE.freq_hz),
    };
    if let Err(e) = pitch.configure(pitch_config) {
        log::error!("Buzzer timer setup failed: {:?}", e);
        return;
    }

    let mut piezo = ledc.channel(channel::Number::Channel0, pin);
    let piezo_config = channel::config::Config {
        timer: &pitch,
        duty_pct: 0,
        drive_mode: DriveMode::PushPull,
    };
    if let Err(e) = piezo.configure(piezo_config) {
        log::error!("Buzzer channel setup failed: {:?}", e);
        return;
    }

    log::info!(
        "Buzzer on GPIO{} at {} Hz",
        board::BUZZER_PIN,
        TOUCH_TONE.freq_hz
    );

    let requests = crate::BUZZER_SIGNAL.receiver();
    loop {
        let tone = requests.receive().await;
        if tone.is_silent() {
            continue;
        }
        if tone.freq_hz != TOUCH_TONE.freq_hz {
            log::debug!(
                "Buzzer fixed at {} Hz, ignoring {} Hz",
                TOUCH_TONE.freq_hz,
                tone.freq_hz
            );
        }

        if !drive(&mut piezo, tone.duty_pct()) {
            continue;
        }
        Timer::after(Duration::from_millis(tone.duration_ms)).await;
        if !drive(&mut piezo, 0) {
            log::error!("Buzzer may be stuck on");
        }
    }
}
