//! TinyPICO kit firmware
//!
//! Polls the IO expander and (on the Explorer shield) the capacitive face
//! pads every input tick, classifies presses, and streams input, battery,
//! and status events as NDJSON over serial. The DotStar shows charge state.

#![no_std]
#![no_main]

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

// Hardware-specific modules (binary crate only)
#[cfg(feature = "board-explorer")]
mod buzzer;

// Re-export library modules so binary submodules (buzzer) can use crate::*
pub(crate) use tinypico_kit::{battery, board, comm, dotstar, expander, port, protocol, tone, touch};

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker, Timer};
use embedded_hal_bus::i2c::RefCellDevice;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::peripherals::{ADC1, GPIO35};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::Blocking;
use static_cell::StaticCell;

use battery::BatteryMonitor;
use dotstar::DotStar;
use expander::Expander;
use port::PortWatchConfig;
use protocol::{DeviceMessage, MsgBuffer, VERSION};
use tinypico_kit::debounce::Timestamp;
use tinypico_kit::error::DriverError;
use touch::TouchConfig;

#[cfg(feature = "board-explorer")]
use tinypico_kit::debounce::{Callback, Press};
#[cfg(feature = "board-explorer")]
use tinypico_kit::mpr121::{self, Mpr121};
#[cfg(feature = "board-explorer")]
use touch::{TouchPads, EXPLORER_FACES};

// ── Hardware type aliases ────────────────────────────────────────────

type I2cBus = I2c<'static, Blocking>;
type BusDevice = RefCellDevice<'static, I2cBus>;
type BusError = esp_hal::i2c::master::Error;
type IoExpander = Expander<BusDevice, Delay>;
type Led = DotStar<Output<'static>, Output<'static>, Output<'static>, Delay>;
type BatteryAdc = Adc<'static, ADC1<'static>, Blocking>;
type BatteryPin = AdcPin<GPIO35<'static>, ADC1<'static>>;

type OutputChannel = Channel<CriticalSectionRawMutex, MsgBuffer, 16>;

/// I2C bus frequency
const I2C_FREQ_KHZ: u32 = 400;

/// Interval between battery reports
const BATTERY_REPORT_SECS: u64 = 10;

/// Interval between status reports
const STATUS_REPORT_SECS: u64 = 30;

/// Input ticks between expander ADC samples
const ANALOG_SAMPLE_TICKS: u32 = 100;

/// Below this the DotStar turns red
const LOW_BATTERY_PCT: u8 = 20;

// ── Static channels and shared state ─────────────────────────────────

/// Serialized NDJSON lines waiting for the serial output task
static OUTPUT_CHANNEL: OutputChannel = Channel::new();

/// The one I2C bus, shared by the expander, ADC and touch controller
static I2C_BUS: StaticCell<RefCell<I2cBus>> = StaticCell::new();

/// Tones waiting for the buzzer (Explorer only). A tone queued while one
/// is already waiting is dropped.
#[cfg(feature = "board-explorer")]
pub(crate) static BUZZER_SIGNAL: Channel<CriticalSectionRawMutex, tone::Tone, 1> = Channel::new();

fn now_ms() -> Timestamp {
    (Instant::now().as_millis() & 0xFFFF_FFFF) as u32
}

/// Encode and queue a message. Drops it if the output channel is full.
fn emit(msg: &DeviceMessage) {
    match comm::encode(msg) {
        Some(line) => {
            let _ = OUTPUT_CHANNEL.try_send(line);
        }
        None => log::warn!("Message too large for output buffer"),
    }
}

// ── Input callbacks ──────────────────────────────────────────────────

fn on_pin_change(ports: u16, pin: u8, level: bool) {
    emit(&DeviceMessage::Pin {
        ports,
        pin,
        level,
        ts: now_ms(),
    });
}

#[cfg(feature = "board-explorer")]
fn touch_beep() {
    let _ = BUZZER_SIGNAL.try_send(tone::TOUCH_TONE);
}

#[cfg(feature = "board-explorer")]
fn emit_touch(face: char, press: Press) {
    let mut label = [0u8; 4];
    emit(&DeviceMessage::Touch {
        face: face.encode_utf8(&mut label),
        press: press.as_str(),
        ts: now_ms(),
    });
}

/// One click and one long-press handler per face, plus the table that
/// binds them.
#[cfg(feature = "board-explorer")]
macro_rules! face_handlers {
    ($($face:literal => $click:ident, $long:ident;)*) => {
        $(
            fn $click() {
                emit_touch($face, Press::Click);
            }
            fn $long() {
                emit_touch($face, Press::LongPress);
            }
        )*

        const FACE_HANDLERS: &[(char, Callback, Callback)] =
            &[$(($face, $click as Callback, $long as Callback)),*];
    };
}

#[cfg(feature = "board-explorer")]
face_handlers! {
    '1' => click_1, long_1;
    '2' => click_2, long_2;
    '3' => click_3, long_3;
    '4' => click_4, long_4;
    'U' => click_up, long_up;
    'D' => click_down, long_down;
    'L' => click_left, long_left;
    'R' => click_right, long_right;
    'A' => click_a, long_a;
    'B' => click_b, long_b;
    'X' => click_x, long_x;
    'Y' => click_y, long_y;
}

// ── Entry point ──────────────────────────────────────────────────────

#[esp_rtos::main]
async fn main(spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // The RTOS needs a timer and a software interrupt
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!("TinyPICO kit v{} starting on {}", VERSION, board::BOARD_NAME);

    // ── I2C bus ────────────────────────────────────────────────────────

    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ)),
    )
    .expect("I2C init failed")
    .with_sda(peripherals.GPIO21)
    .with_scl(peripherals.GPIO22);
    let bus: &'static RefCell<I2cBus> = I2C_BUS.init(RefCell::new(i2c));

    log::info!(
        "I2C on SDA {} / SCL {} at {} kHz",
        board::I2C_SDA_PIN,
        board::I2C_SCL_PIN,
        I2C_FREQ_KHZ
    );

    // ── Battery + DotStar ──────────────────────────────────────────────

    let mut adc_cfg = AdcConfig::new();
    let voltage_pin = adc_cfg.enable_pin(peripherals.GPIO35, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_cfg);
    let charge_pin = Input::new(peripherals.GPIO34, InputConfig::default());

    let led = DotStar::new(
        Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO12, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO13, Level::High, OutputConfig::default()),
        Delay::new(),
    )
    .expect("DotStar init failed");

    spawner.spawn(output_serial_task()).unwrap();
    spawner.spawn(status_task()).unwrap();
    spawner
        .spawn(battery_task(adc, voltage_pin, charge_pin, led))
        .unwrap();
    spawner.spawn(input_task(bus)).unwrap();

    #[cfg(feature = "board-explorer")]
    {
        spawner
            .spawn(buzzer::buzzer_task(peripherals.LEDC, peripherals.GPIO25))
            .unwrap();
        log::info!("Buzzer task spawned");
    }

    log::info!(
        "Build target: {}",
        if cfg!(feature = "board-explorer") {
            "tinypico + explorer shield"
        } else {
            "tinypico"
        }
    );
}

// ── Input ────────────────────────────────────────────────────────────

fn start_expander(bus: &'static RefCell<I2cBus>) -> Result<IoExpander, DriverError<BusError>> {
    let mut expander = Expander::begin(
        RefCellDevice::new(bus),
        RefCellDevice::new(bus),
        Delay::new(),
    )?;
    expander.watch_buttons(PortWatchConfig::new(), on_pin_change)?;
    Ok(expander)
}

#[cfg(feature = "board-explorer")]
fn start_touch(
    bus: &'static RefCell<I2cBus>,
    config: &TouchConfig,
) -> Option<(Mpr121<BusDevice>, TouchPads)> {
    let mut mpr = Mpr121::new(RefCellDevice::new(bus), mpr121::DEFAULT_ADDRESS);
    if let Err(e) = mpr.init(&mut Delay::new()) {
        log::error!("Touch controller unavailable: {}", e);
        return None;
    }

    let thresholds = config.thresholds().unwrap_or_else(|e| {
        log::warn!("{}; using default thresholds", e);
        Default::default()
    });
    let mut pads = TouchPads::new(&EXPLORER_FACES, thresholds, Some(touch_beep), now_ms());
    for &(face, click, long_press) in FACE_HANDLERS {
        pads.bind(face, Some(click), Some(long_press));
    }
    Some((mpr, pads))
}

/// Input tick: expander change detection, a periodic expander ADC sample,
/// and touch classification.
#[embassy_executor::task]
async fn input_task(bus: &'static RefCell<I2cBus>) {
    let config = TouchConfig::new();

    let mut expander = match start_expander(bus) {
        Ok(expander) => Some(expander),
        Err(e) => {
            log::warn!("IO expander not found: {}", e);
            None
        }
    };

    #[cfg(feature = "board-explorer")]
    let mut touch = start_touch(bus, &config);

    let mut ticker = Ticker::every(Duration::from_millis(config.poll_interval_ms as u64));
    log::info!("Input task started ({} ms tick)", config.poll_interval_ms);

    let mut tick: u32 = 0;
    loop {
        ticker.next().await;
        tick = tick.wrapping_add(1);

        if let Some(expander) = expander.as_mut() {
            if let Err(e) = expander.update() {
                log::error!("Expander read failed: {}", e);
            }
            if tick % ANALOG_SAMPLE_TICKS == 0 {
                match expander.analog_read(0) {
                    Ok(raw) => log::debug!("Expander AIN0: {}", raw),
                    Err(e) => log::warn!("Expander ADC read failed: {}", e),
                }
            }
        }

        #[cfg(feature = "board-explorer")]
        if let Some((mpr, pads)) = touch.as_mut() {
            match mpr.touched() {
                Ok(mask) => {
                    pads.poll_all(mask, now_ms());
                }
                Err(e) => log::error!("Touch read failed: {}", e),
            }
        }
    }
}

// ── Battery ──────────────────────────────────────────────────────────

/// Battery reporting task. Samples voltage and charge state, updates the
/// DotStar and emits a battery message.
#[embassy_executor::task]
async fn battery_task(
    mut adc: BatteryAdc,
    mut voltage_pin: BatteryPin,
    mut charge_pin: Input<'static>,
    mut led: Led,
) {
    let mut monitor = BatteryMonitor::new();
    led.set_brightness(32);

    loop {
        let mv = match monitor.voltage_mv(now_ms(), || {
            nb::block!(adc.read_oneshot(&mut voltage_pin))
        }) {
            Ok(mv) => mv,
            Err(()) => {
                log::error!("Battery ADC read failed");
                monitor.last_mv()
            }
        };
        let charging = battery::is_charging(&mut charge_pin).unwrap_or(false);
        let pct = battery::battery_percentage(mv);

        let (r, g, b) = if charging {
            (255, 100, 0)
        } else if pct < LOW_BATTERY_PCT {
            (255, 0, 0)
        } else {
            (0, 255, 0)
        };
        let _ = led.set_pixel_color(r, g, b);

        emit(&DeviceMessage::Battery { mv, pct, charging });

        Timer::after(Duration::from_secs(BATTERY_REPORT_SECS)).await;
    }
}

// ── Output ───────────────────────────────────────────────────────────

/// Drains the output channel to serial.
#[embassy_executor::task]
async fn output_serial_task() {
    log::info!("Serial output task started ({} baud)", comm::SERIAL_BAUD);

    let output_rx = OUTPUT_CHANNEL.receiver();

    loop {
        let msg = output_rx.receive().await;

        // Log to serial via esp-println
        if let Ok(s) = core::str::from_utf8(&msg) {
            log::info!("{}", s.trim_end());
        }
    }
}

/// Periodic status reporting task
#[embassy_executor::task]
async fn status_task() {
    loop {
        Timer::after(Duration::from_secs(STATUS_REPORT_SECS)).await;

        let uptime_secs = (Instant::now().as_millis() / 1000) as u32;

        emit(&DeviceMessage::Status {
            uptime: uptime_secs,
            board: board::BOARD_NAME,
            version: VERSION,
        });
    }
}
