//! RGB LED demo firmware.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  LedcAdapter ──▶ ChannelEventQueue ──▶ on_channel_assigned│
//! │  (Pwm+Fade)                                   │           │
//! │       ▲                                       ▼           │
//! │       └──────────────── RgbLed ◀── ThreadTimers           │
//! │                           ▲    ◀── ThreadTasks            │
//! │                           └─────── LogEventSink           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Cycles through a static colour, a looping fade and a blink, draining
//! channel assignments between steps.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::info;

use pwm_rgb_led::adapters::default_services;
use pwm_rgb_led::adapters::ledc::LedcAdapter;
use pwm_rgb_led::drivers::task_pin::Core;
use pwm_rgb_led::{ChannelEventQueue, FadeDirection, LedConfig, RgbLed};

/// Board wiring; parsed at boot so a field build can swap it out.
const BOARD_CONFIG: &str =
    r#"{"pins":{"r":16,"g":17,"b":18},"freq_hz":0,"polarity":"common_cathode"}"#;

fn drain_assignments<H: pwm_rgb_led::app::ports::LedHardware>(
    led: &RgbLed<H>,
    queue: &ChannelEventQueue,
) {
    queue.drain(|assignment| led.on_channel_assigned(assignment));
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("RGB LED demo v{}", env!("CARGO_PKG_VERSION"));

    let config = LedConfig::from_json(BOARD_CONFIG)?;
    let queue = ChannelEventQueue::new();
    let hw = LedcAdapter::new(queue.clone());
    let led = RgbLed::init(&config, hw, default_services(Core::App))?;
    drain_assignments(&led, &queue);

    // Static teal at half brightness.
    led.set(0, 128, 128, 128)?;
    drain_assignments(&led, &queue);
    FreeRtos::delay_ms(2_000);

    // Breathe orange between 10 and 255.
    led.set_color_packed(0xFF_80_00)?;
    led.fade_start(1_500, FadeDirection::Loop, true, 255, 10)?;
    FreeRtos::delay_ms(10_000);
    led.fade_stop();

    // Blink white, 200 ms on / 800 ms off.
    led.set(255, 255, 255, 200)?;
    led.blink_start(200, 800)?;
    FreeRtos::delay_ms(10_000);
    led.blink_stop();

    info!("snapshot: {:?}", led.snapshot());
    led.deinit()?;

    loop {
        FreeRtos::delay_ms(1_000);
    }
}
