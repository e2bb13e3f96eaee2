//! PWM-driven RGB LED.
//!
//! [`RgbLed`] is the client handle. All state lives in a [`LedCore`]
//! behind one mutex, shared with the two background drivers:
//!
//! ```text
//!  client calls ─────┐
//!                    ▼
//!  fade timer ──▶ Mutex<LedCore> ──▶ Apply Engine ──▶ PwmPort / FadePort
//!                    ▲
//!  blink task ───────┘
//! ```
//!
//! The drivers hold only a `Weak` reference and a generation number, so a
//! tick that was already waiting on the lock when its driver was replaced
//! finds a newer generation and does nothing.

mod apply;
pub mod binding;
mod blink;
pub mod color;
mod fade;
pub mod mode;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{error, info, warn};

use crate::app::events::{DriverSource, LedEvent};
use crate::app::ports::{LedHardware, Services};
use crate::config::{clamp_freq, LedConfig, Polarity};
use crate::error::{Error, Result};
use crate::events::ChannelAssignment;

use binding::ChannelBindings;
use blink::BlinkController;
use color::{Duty, LedState, Rgb};
use fade::FadeController;
use mode::{FadeDirection, FadeParams, Mode};

/// Point-in-time view of an LED, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct LedSnapshot {
    pub color: Rgb,
    pub brightness: u8,
    pub duty: Duty,
    pub freq_hz: u32,
    pub polarity: Polarity,
    pub mode: Mode,
    pub fade_installed: bool,
    pub blink_running: bool,
    /// Hardware channel per pin, R/G/B order.
    pub channels: [Option<u8>; 3],
}

pub(crate) struct LedCore<H> {
    this: Weak<Mutex<LedCore<H>>>,
    hw: H,
    services: Services,
    state: LedState,
    bindings: ChannelBindings,
    mode: Mode,
    fade: FadeController,
    blink: BlinkController,
}

fn lock_core<H>(core: &Mutex<LedCore<H>>) -> MutexGuard<'_, LedCore<H>> {
    // Every field stays valid across a panicking holder, so keep going.
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<H: LedHardware> LedCore<H> {
    fn emit(&mut self, event: LedEvent) {
        self.services.sink.emit(&event);
    }

    /// Absorb a failure from a path that has no caller to return to.
    fn report(&mut self, source: DriverSource, error: Error) {
        warn!("led: {:?} fault: {}", source, error);
        self.emit(LedEvent::DriverFault { source, error });
    }

    fn set_mode(&mut self, mode: Mode) {
        let (from, to) = (self.mode.kind(), mode.kind());
        self.mode = mode;
        if from != to {
            info!("led: mode {:?} -> {:?}", from, to);
            self.emit(LedEvent::ModeChanged { from, to });
        }
    }

    fn snapshot(&self) -> LedSnapshot {
        LedSnapshot {
            color: self.state.color,
            brightness: self.state.brightness,
            duty: self.state.duty,
            freq_hz: self.state.freq_hz,
            polarity: self.state.polarity,
            mode: self.mode,
            fade_installed: self.fade.installed,
            blink_running: self.blink.is_running(),
            channels: self.bindings.channels(),
        }
    }

    /// Stop every driver and switch the pins off.
    fn shutdown(&mut self) -> Result<()> {
        self.stop_blink_task();
        self.clear_fade_timer();
        self.uninstall_fade();
        self.set_mode(Mode::Static);

        let mut first_err = None;
        for pin in self.state.pins.as_array() {
            if let Err(e) = self.hw.set_pwm(pin, 0, 0.0) {
                warn!("led: GPIO {} not released: {}", pin, e);
                first_err.get_or_insert(e);
            }
        }
        self.state.duty = Duty::default();
        first_err.map_or(Ok(()), Err)
    }
}

/// Handle to one physical RGB LED.
pub struct RgbLed<H: LedHardware> {
    core: Arc<Mutex<LedCore<H>>>,
}

impl<H: LedHardware> RgbLed<H> {
    /// Take ownership of the pins and drive the LED dark.
    ///
    /// A zero `freq_hz` selects the default frequency; any other value is
    /// clamped into the supported range.
    pub fn init(config: &LedConfig, hw: H, services: Services) -> Result<Self> {
        config.validate()?;
        let freq_hz = config.effective_freq_hz();
        let core = Arc::new_cyclic(|this| {
            Mutex::new(LedCore {
                this: this.clone(),
                hw,
                services,
                state: LedState::new(config.pins, config.polarity, freq_hz),
                bindings: ChannelBindings::new(config.pins),
                mode: Mode::Static,
                fade: FadeController::default(),
                blink: BlinkController::default(),
            })
        });
        let led = Self { core };

        {
            let mut core = led.lock();
            if config.freq_hz != 0 && config.freq_hz != freq_hz {
                core.emit(LedEvent::FrequencyClamped {
                    requested: config.freq_hz,
                    applied: freq_hz,
                });
            }
            core.apply().inspect_err(|e| error!("led: initial write failed: {}", e))?;
        }

        info!(
            "led: init R={} G={} B={} @ {} Hz ({:?})",
            config.pins.r, config.pins.g, config.pins.b, freq_hz, config.polarity
        );
        Ok(led)
    }

    fn lock(&self) -> MutexGuard<'_, LedCore<H>> {
        lock_core(&self.core)
    }

    /// Set colour and brightness together.
    pub fn set(&self, r: u8, g: u8, b: u8, brightness: u8) -> Result<()> {
        let mut core = self.lock();
        core.state.color = Rgb::new(r, g, b);
        core.state.brightness = brightness;
        core.apply()
    }

    /// Set colour, keeping the current brightness.
    pub fn set_color(&self, r: u8, g: u8, b: u8) -> Result<()> {
        let mut core = self.lock();
        core.state.color = Rgb::new(r, g, b);
        core.apply()
    }

    /// Set colour from a packed `0xRRGGBB` value.
    pub fn set_color_packed(&self, rgb: u32) -> Result<()> {
        let mut core = self.lock();
        core.state.color = Rgb::from_packed(rgb);
        core.apply()
    }

    /// Set brightness, keeping the current colour.
    pub fn set_brightness(&self, brightness: u8) -> Result<()> {
        let mut core = self.lock();
        core.state.brightness = brightness;
        core.apply()
    }

    /// Change the PWM frequency (clamped) and re-apply.
    pub fn set_freq(&self, freq_hz: u32) -> Result<()> {
        let mut core = self.lock();
        let applied = clamp_freq(freq_hz);
        if applied != freq_hz {
            core.emit(LedEvent::FrequencyClamped {
                requested: freq_hz,
                applied,
            });
        }
        core.state.freq_hz = applied;
        core.apply()
    }

    /// Start a hardware fade, stopping any blink first.
    ///
    /// `Up`/`Down` issue a single fade towards `max`/`min`; with
    /// `reset_to_start` the LED first jumps to the opposite end.
    /// `Loop`, `Blink` and `BlinkRapid` re-arm every `duration_ms + 1` ms,
    /// alternating between `min` and `max`. `Off` is the same as
    /// [`fade_stop`](Self::fade_stop).
    pub fn fade_start(
        &self,
        duration_ms: u32,
        direction: FadeDirection,
        reset_to_start: bool,
        max: u8,
        min: u8,
    ) -> Result<()> {
        let params = FadeParams {
            direction,
            duration_ms,
            max,
            min,
        };
        self.lock().fade_start(params, reset_to_start)
    }

    /// Stop fading and release the fade service. No-op when not fading.
    pub fn fade_stop(&self) {
        self.lock().fade_stop();
    }

    /// Blink the current colour, stopping any fade first.
    ///
    /// Both durations are clamped to 50..=100000 ms.
    pub fn blink_start(&self, on_ms: u32, off_ms: u32) -> Result<()> {
        self.lock().blink_start(on_ms, off_ms)
    }

    /// Stop the blink task. No-op when not blinking.
    pub fn blink_stop(&self) {
        self.lock().blink_stop();
    }

    /// Record a pin → channel assignment from the PWM driver.
    ///
    /// A negative channel unbinds the pin. Assignments for foreign pins
    /// are ignored.
    pub fn on_channel_assigned(&self, assignment: ChannelAssignment) {
        let mut core = self.lock();
        let Ok(channel) = u8::try_from(assignment.channel) else {
            if core.bindings.unbind(assignment.pin) {
                log::debug!("led: GPIO {} unbound", assignment.pin);
                core.emit(LedEvent::ChannelUnbound { pin: assignment.pin });
            }
            return;
        };
        if core.bindings.bind(assignment.pin, channel) {
            log::debug!("led: GPIO {} bound to channel {}", assignment.pin, channel);
            core.emit(LedEvent::ChannelBound {
                pin: assignment.pin,
                channel,
            });
        }
    }

    /// Copy of the logical state, mode and driver bookkeeping.
    pub fn snapshot(&self) -> LedSnapshot {
        self.lock().snapshot()
    }

    /// Stop every driver and release the pins.
    ///
    /// All three pins are released even if one fails; the first failure
    /// is returned.
    pub fn deinit(self) -> Result<()> {
        let result = self.lock().shutdown();
        info!("led: deinit");
        result
    }
}
