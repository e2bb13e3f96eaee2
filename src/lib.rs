//! PWM-driven RGB LED library.
//!
//! Drives one common-cathode or common-anode RGB LED from three PWM
//! pins, with hardware fades and a task-timed blink. All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module;
//! on the host the same logic runs against in-memory stubs.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod led;
pub mod pins;

pub use config::{LedConfig, LedPins, Polarity};
pub use error::{Error, Result};
pub use events::{ChannelAssignment, ChannelEventQueue};
pub use led::color::{Duty, Rgb};
pub use led::mode::{FadeDirection, Mode, ModeKind};
pub use led::{LedSnapshot, RgbLed};
