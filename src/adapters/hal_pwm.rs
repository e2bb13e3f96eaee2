//! Generic `embedded-hal` PWM adapter.
//!
//! Drives the three diodes through any [`SetDutyCycle`] outputs, e.g.
//! `esp_idf_hal::ledc::LedcDriver` or a board-support PWM channel. The
//! output frequency is fixed by whoever built the channels, so
//! `freq_hz` is only used for its "0 = off" meaning. There is no fade
//! engine behind this trait; hardware fades report
//! [`FadeError::Unsupported`] and the LED stays on direct writes.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{FadePort, PwmPort};
use crate::config::LedPins;
use crate::error::{FadeError, PwmError, Result};
use crate::pins::Gpio;

/// [`PwmPort`] over three `embedded-hal` PWM outputs.
pub struct HalPwm<R, G, B> {
    pins: LedPins,
    r: R,
    g: G,
    b: B,
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> HalPwm<R, G, B> {
    /// `pins` names the GPIOs behind `r`, `g` and `b`, matching the
    /// [`LedConfig`](crate::config::LedConfig) handed to the LED.
    pub fn new(pins: LedPins, r: R, g: G, b: B) -> Self {
        Self { pins, r, g, b }
    }

    pub fn release(self) -> (R, G, B) {
        (self.r, self.g, self.b)
    }
}

fn write<P: SetDutyCycle>(out: &mut P, pin: Gpio, freq_hz: u32, duty: f32) -> Result<()> {
    let result = if freq_hz == 0 {
        out.set_duty_cycle_fully_off()
    } else {
        let max = out.max_duty_cycle();
        out.set_duty_cycle((duty.clamp(0.0, 1.0) * f32::from(max)).round() as u16)
    };
    result.map_err(|e| {
        log::warn!("hal_pwm: GPIO {} write failed: {:?}", pin, e);
        PwmError::WriteFailed { pin }.into()
    })
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> PwmPort for HalPwm<R, G, B> {
    fn set_pwm(&mut self, pin: Gpio, freq_hz: u32, duty: f32) -> Result<()> {
        if pin == self.pins.r {
            write(&mut self.r, pin, freq_hz, duty)
        } else if pin == self.pins.g {
            write(&mut self.g, pin, freq_hz, duty)
        } else if pin == self.pins.b {
            write(&mut self.b, pin, freq_hz, duty)
        } else {
            Err(PwmError::NoChannelAvailable.into())
        }
    }
}

impl<R, G, B> FadePort for HalPwm<R, G, B> {
    fn install_fade(&mut self) -> Result<()> {
        Err(FadeError::Unsupported.into())
    }

    fn uninstall_fade(&mut self) {}

    fn program_fade(&mut self, _channel: u8, _duty: f32, _duration_ms: u32) -> Result<()> {
        Err(FadeError::Unsupported.into())
    }

    fn start_fade(&mut self, _channel: u8) -> Result<()> {
        Err(FadeError::Unsupported.into())
    }
}
