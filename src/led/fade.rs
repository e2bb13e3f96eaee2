//! Fade Controller.
//!
//! Owns the fade service claim and the repeating toggle timer.
//!
//! ## Directions
//!
//! | Direction          | Driver                                   |
//! |--------------------|------------------------------------------|
//! | Up / Down          | one hardware fade, no timer              |
//! | Loop               | timer flips target, hardware fade        |
//! | Blink / BlinkRapid | timer flips target, direct duty writes   |

use core::time::Duration;

use log::{debug, info, warn};

use crate::app::events::DriverSource;
use crate::app::ports::{LedHardware, TimerId};
use crate::error::Result;

use super::mode::{FadeDirection, FadeParams, Mode};
use super::{lock_core, LedCore};

#[derive(Debug, Default)]
pub(crate) struct FadeController {
    /// Whether this LED holds the fade service.
    pub installed: bool,
    pub timer: Option<TimerId>,
    /// Bumped whenever the timer changes; ticks carry the value they
    /// were armed with.
    generation: u32,
    /// Target of the most recent toggle: `true` = max.
    toward_max: bool,
}

impl FadeController {
    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

impl<H: LedHardware> LedCore<H> {
    pub(crate) fn fade_start(&mut self, params: FadeParams, reset_to_start: bool) -> Result<()> {
        self.stop_blink_task();
        self.clear_fade_timer();

        if params.direction == FadeDirection::Off {
            self.blink_stop();
            self.fade_stop();
            return Ok(());
        }

        let result = self.enter_fade(params, reset_to_start);
        if let Err(e) = result {
            warn!("fade: start {:?} failed: {}", params.direction, e);
            self.uninstall_fade();
            self.set_mode(Mode::Static);
        }
        result
    }

    fn enter_fade(&mut self, params: FadeParams, reset_to_start: bool) -> Result<()> {
        self.ensure_fade_installed()?;
        info!(
            "fade: {:?} over {} ms (max {}, min {})",
            params.direction, params.duration_ms, params.max, params.min
        );
        match params.direction {
            FadeDirection::Up => self.fade_once(params, reset_to_start, params.min, params.max),
            FadeDirection::Down => self.fade_once(params, reset_to_start, params.max, params.min),
            _ => self.arm_toggle_timer(params),
        }
    }

    /// Single transition `from` → `to`; terminal.
    fn fade_once(&mut self, params: FadeParams, reset: bool, from: u8, to: u8) -> Result<()> {
        if reset {
            self.state.brightness = from;
            self.apply_direct()?;
        }
        self.set_mode(Mode::Fading(params));
        self.state.brightness = to;
        self.apply()
    }

    fn arm_toggle_timer(&mut self, params: FadeParams) -> Result<()> {
        self.set_mode(Mode::Fading(params));
        self.fade.toward_max = true;
        let generation = self.fade.next_generation();
        let this = self.this.clone();
        let interval = Duration::from_millis(u64::from(params.timer_interval_ms()));
        let id = self.services.timers.set_repeating(
            interval,
            Box::new(move || {
                if let Some(core) = this.upgrade() {
                    lock_core(&core).on_fade_tick(generation);
                }
            }),
        )?;
        self.fade.timer = Some(id);
        Ok(())
    }

    pub(crate) fn on_fade_tick(&mut self, generation: u32) {
        if generation != self.fade.generation {
            return;
        }
        let Mode::Fading(params) = self.mode else {
            return;
        };
        self.fade.toward_max = !self.fade.toward_max;
        self.state.brightness = if self.fade.toward_max {
            params.max
        } else {
            params.min
        };
        debug!("fade: tick, target brightness {}", self.state.brightness);
        if let Err(e) = self.apply() {
            self.report(DriverSource::FadeTimer, e);
        }
    }

    pub(crate) fn fade_stop(&mut self) {
        let fading = matches!(self.mode, Mode::Fading(_));
        if !fading && !self.fade.installed && self.fade.timer.is_none() {
            debug!("fade: stop skipped, not fading");
            return;
        }
        self.clear_fade_timer();
        self.uninstall_fade();
        if fading {
            self.set_mode(Mode::Static);
        }
    }

    fn ensure_fade_installed(&mut self) -> Result<()> {
        if !self.fade.installed {
            self.hw.install_fade()?;
            self.fade.installed = true;
            info!("fade: service installed");
        }
        Ok(())
    }

    pub(crate) fn uninstall_fade(&mut self) {
        if self.fade.installed {
            self.hw.uninstall_fade();
            self.fade.installed = false;
            info!("fade: service uninstalled");
        }
    }

    pub(crate) fn clear_fade_timer(&mut self) {
        if let Some(id) = self.fade.timer.take() {
            self.services.timers.clear(id);
            debug!("fade: timer {:?} cleared", id);
        }
        self.fade.next_generation();
    }
}
