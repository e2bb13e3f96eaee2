//! Apply Engine: logical state → duty writes or hardware fades.

use log::debug;

use crate::app::events::DriverSource;
use crate::app::ports::LedHardware;
use crate::error::Result;

use super::color::compute_duty;
use super::LedCore;

impl<H: LedHardware> LedCore<H> {
    /// Recompute duty and push it to the outputs the current mode uses.
    ///
    /// Direct writes fail as a whole if any pin fails. Hardware fades are
    /// best-effort per channel: unbound or black channels are skipped and
    /// per-channel failures go to the event sink.
    pub(crate) fn apply(&mut self) -> Result<()> {
        self.refresh_duty();
        match self.mode.hardware_fade() {
            Some(params) => {
                self.program_fades(params.duration_ms);
                Ok(())
            }
            None => self.write_duty(),
        }
    }

    /// Like [`apply`](Self::apply) but always writes duty directly.
    pub(crate) fn apply_direct(&mut self) -> Result<()> {
        self.refresh_duty();
        self.write_duty()
    }

    fn refresh_duty(&mut self) {
        let s = &self.state;
        let duty = compute_duty(s.color, s.brightness, s.polarity);
        debug!(
            "apply: rgb=({},{},{}) br={} -> r={:.3} g={:.3} b={:.3}",
            s.color.r, s.color.g, s.color.b, s.brightness, duty.r, duty.g, duty.b
        );
        self.state.duty = duty;
    }

    fn write_duty(&mut self) -> Result<()> {
        let freq_hz = self.state.freq_hz;
        for (pin, _, duty) in self.state.channels() {
            self.hw.set_pwm(pin, freq_hz, duty)?;
        }
        Ok(())
    }

    fn program_fades(&mut self, duration_ms: u32) {
        for (pin, component, duty) in self.state.channels() {
            if component == 0 {
                continue;
            }
            let Some(channel) = self.bindings.channel(pin) else {
                debug!("apply: GPIO {} has no channel yet, fade skipped", pin);
                continue;
            };
            let result = self
                .hw
                .program_fade(channel, duty, duration_ms)
                .and_then(|()| self.hw.start_fade(channel));
            if let Err(e) = result {
                self.report(DriverSource::FadeProgram, e);
            }
        }
    }
}
