//! Default GPIO assignment for the RGB status LED.
//!
//! Boards override these through [`LedConfig`](crate::config::LedConfig);
//! the defaults match the reference wiring (R/G/B on GPIO 16/17/18).

/// ESP-IDF GPIO number.
pub type Gpio = i32;

pub const LED_R_GPIO: Gpio = 16;
pub const LED_G_GPIO: Gpio = 17;
pub const LED_B_GPIO: Gpio = 18;
