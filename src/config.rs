//! LED configuration parameters
//!
//! Pin wiring, PWM frequency and polarity for one RGB LED, plus the
//! driver-wide limits applied to frequency and blink timing.

use core::ffi::CStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pins::{Gpio, LED_B_GPIO, LED_G_GPIO, LED_R_GPIO};

// --- Frequency ---
/// PWM frequency used when the config asks for 0 Hz.
pub const DEFAULT_FREQ_HZ: u32 = 400;
pub const MIN_FREQ_HZ: u32 = 100;
pub const MAX_FREQ_HZ: u32 = 25_000;

// --- Blink ---
pub const BLINK_MIN_MS: u32 = 50;
pub const BLINK_MAX_MS: u32 = 100_000;
pub const BLINK_TASK_NAME: &CStr = c"led-blink";
pub const BLINK_TASK_STACK_BYTES: usize = 4096;
/// One above the FreeRTOS idle priority.
pub const BLINK_TASK_PRIORITY: u8 = 1;

// --- Fade ---
/// Added to the fade duration so a looping fade re-arms only after the
/// previous hardware fade has completed.
pub const FADE_TIMER_SLACK_MS: u32 = 1;
/// LEDC duty resolution used for hardware fades and duty writes.
pub const LEDC_DUTY_BITS: u32 = 10;

/// How the three diodes share their common terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Shared ground: duty 0 is off.
    CommonCathode,
    /// Shared supply: duty 1 is off, so duties are inverted.
    CommonAnode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedPins {
    pub r: Gpio,
    pub g: Gpio,
    pub b: Gpio,
}

impl LedPins {
    pub fn as_array(&self) -> [Gpio; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for LedPins {
    fn default() -> Self {
        Self {
            r: LED_R_GPIO,
            g: LED_G_GPIO,
            b: LED_B_GPIO,
        }
    }
}

/// Configuration for one RGB LED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedConfig {
    pub pins: LedPins,
    /// PWM frequency in Hz. 0 selects [`DEFAULT_FREQ_HZ`].
    pub freq_hz: u32,
    pub polarity: Polarity,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            pins: LedPins::default(),
            freq_hz: DEFAULT_FREQ_HZ,
            polarity: Polarity::CommonCathode,
        }
    }
}

impl LedConfig {
    /// Parse a config from JSON, then validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed LED config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject wiring the driver cannot address.
    pub fn validate(&self) -> Result<(), Error> {
        let [r, g, b] = self.pins.as_array();
        if r < 0 || g < 0 || b < 0 {
            return Err(Error::Config("LED pins must be non-negative GPIO numbers"));
        }
        if r == g || g == b || r == b {
            return Err(Error::Config("LED pins must be distinct"));
        }
        Ok(())
    }

    /// Frequency the driver will actually run at for this config.
    pub fn effective_freq_hz(&self) -> u32 {
        if self.freq_hz == 0 {
            DEFAULT_FREQ_HZ
        } else {
            clamp_freq(self.freq_hz)
        }
    }
}

/// Clamp a requested PWM frequency into `[MIN_FREQ_HZ, MAX_FREQ_HZ]`.
pub fn clamp_freq(freq_hz: u32) -> u32 {
    let clamped = freq_hz.clamp(MIN_FREQ_HZ, MAX_FREQ_HZ);
    if clamped != freq_hz {
        warn!("config: frequency {} Hz out of range, using {} Hz", freq_hz, clamped);
    }
    clamped
}

/// Clamp a blink phase duration into `[BLINK_MIN_MS, BLINK_MAX_MS]`.
pub fn clamp_blink_ms(ms: u32) -> u32 {
    ms.clamp(BLINK_MIN_MS, BLINK_MAX_MS)
}
