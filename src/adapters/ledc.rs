//! LEDC PWM adapter.
//!
//! Implements [`PwmPort`] and [`FadePort`] on the ESP32 LEDC peripheral.
//!
//! Pins are attached to hardware channels lazily, on their first write.
//! Each distinct frequency needs its own LEDC timer; pins at the same
//! frequency share one. When a pin gets a channel, the assignment is
//! published to a [`ChannelEventQueue`] so the LED can learn which
//! channel to fade.

use log::{debug, info, warn};

use crate::app::ports::{FadePort, PwmPort};
use crate::drivers::ledc::{self, LEDC_CHANNELS, LEDC_TIMERS};
use crate::error::{Error, FadeError, PwmError, Result};
use crate::events::{ChannelAssignment, ChannelEventQueue};
use crate::pins::Gpio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelSlot {
    pin: Gpio,
    timer: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerSlot {
    freq_hz: u32,
    users: u8,
}

/// What has to be (re)configured before a duty write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub channel: u8,
    pub timer: u8,
    pub configure_timer: bool,
    pub configure_channel: bool,
    /// The pin had no channel before this write.
    pub newly_bound: bool,
}

/// Bookkeeping of LEDC channel and timer ownership.
#[derive(Debug, Default)]
pub struct ChannelAllocator {
    channels: [Option<ChannelSlot>; LEDC_CHANNELS],
    timers: [Option<TimerSlot>; LEDC_TIMERS],
}

impl ChannelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_of(&self, pin: Gpio) -> Option<u8> {
        self.find(pin).map(|(channel, _)| channel)
    }

    fn find(&self, pin: Gpio) -> Option<(u8, ChannelSlot)> {
        self.channels
            .iter()
            .enumerate()
            .find_map(|(i, slot)| slot.filter(|s| s.pin == pin).map(|s| (i as u8, s)))
    }

    fn timer_freq(&self, timer: u8) -> Option<u32> {
        self.timers[timer as usize].map(|t| t.freq_hz)
    }

    /// Pick a timer for `freq_hz`: share one already at that frequency,
    /// retune `owned` if this pin is its only user, else take a free one.
    fn pick_timer(&self, freq_hz: u32, owned: Option<u8>) -> core::result::Result<(u8, bool), PwmError> {
        if let Some(t) = self
            .timers
            .iter()
            .position(|t| t.is_some_and(|s| s.freq_hz == freq_hz))
        {
            return Ok((t as u8, false));
        }
        if let Some(t) = owned {
            if self.timers[t as usize].is_some_and(|s| s.users == 1) {
                return Ok((t, true));
            }
        }
        self.timers
            .iter()
            .position(Option::is_none)
            .map(|t| (t as u8, true))
            .ok_or(PwmError::NoTimerAvailable)
    }

    fn claim_timer(&mut self, timer: u8, freq_hz: u32) {
        match &mut self.timers[timer as usize] {
            Some(s) if s.freq_hz == freq_hz => s.users += 1,
            slot => *slot = Some(TimerSlot { freq_hz, users: 1 }),
        }
    }

    fn release_timer(&mut self, timer: u8) {
        let slot = &mut self.timers[timer as usize];
        let remaining = slot.as_mut().map(|s| {
            s.users = s.users.saturating_sub(1);
            s.users
        });
        if remaining == Some(0) {
            *slot = None;
        }
    }

    /// Resolve the channel and timer that drive `pin` at `freq_hz`,
    /// claiming them if needed. Nothing changes on error.
    pub fn route(&mut self, pin: Gpio, freq_hz: u32) -> core::result::Result<Route, PwmError> {
        let current = self.find(pin);
        if let Some((channel, slot)) = current {
            if self.timer_freq(slot.timer) == Some(freq_hz) {
                return Ok(Route {
                    channel,
                    timer: slot.timer,
                    configure_timer: false,
                    configure_channel: false,
                    newly_bound: false,
                });
            }
        }

        let (timer, configure_timer) = self.pick_timer(freq_hz, current.map(|(_, s)| s.timer))?;
        let channel = match current {
            Some((channel, _)) => channel,
            None => self
                .channels
                .iter()
                .position(Option::is_none)
                .map(|c| c as u8)
                .ok_or(PwmError::NoChannelAvailable)?,
        };

        if let Some((_, old)) = current {
            self.release_timer(old.timer);
        }
        self.claim_timer(timer, freq_hz);
        self.channels[channel as usize] = Some(ChannelSlot { pin, timer });

        Ok(Route {
            channel,
            timer,
            configure_timer,
            configure_channel: true,
            newly_bound: current.is_none(),
        })
    }

    /// Detach `pin`, returning the channel it held.
    pub fn release(&mut self, pin: Gpio) -> Option<u8> {
        let (channel, slot) = self.find(pin)?;
        self.channels[channel as usize] = None;
        self.release_timer(slot.timer);
        Some(channel)
    }
}

fn write_failed(pin: Gpio) -> impl Fn(i32) -> Error {
    move |rc| {
        warn!("ledc: GPIO {} write failed (rc={})", pin, rc);
        PwmError::WriteFailed { pin }.into()
    }
}

fn configure(pin: Gpio, freq_hz: u32, route: Route) -> Result<()> {
    if route.configure_timer {
        ledc::configure_timer(route.timer, freq_hz).map_err(write_failed(pin))?;
    }
    if route.configure_channel {
        ledc::configure_channel(route.channel, route.timer, pin).map_err(write_failed(pin))?;
    }
    Ok(())
}

/// [`PwmPort`] + [`FadePort`] on the LEDC peripheral.
pub struct LedcAdapter {
    alloc: ChannelAllocator,
    events: ChannelEventQueue,
}

impl LedcAdapter {
    /// Channel assignments are published to `events`.
    pub fn new(events: ChannelEventQueue) -> Self {
        Self {
            alloc: ChannelAllocator::new(),
            events,
        }
    }

    pub fn channel_of(&self, pin: Gpio) -> Option<u8> {
        self.alloc.channel_of(pin)
    }

    fn stop_pin(&mut self, pin: Gpio) -> Result<()> {
        let Some(channel) = self.alloc.release(pin) else {
            return Ok(());
        };
        ledc::stop(channel).map_err(write_failed(pin))?;
        debug!("ledc: GPIO {} released ch {}", pin, channel);
        self.events.publish(ChannelAssignment { pin, channel: -1 });
        Ok(())
    }
}

impl PwmPort for LedcAdapter {
    fn set_pwm(&mut self, pin: Gpio, freq_hz: u32, duty: f32) -> Result<()> {
        if freq_hz == 0 {
            return self.stop_pin(pin);
        }

        let route = self.alloc.route(pin, freq_hz)?;
        if let Err(e) = configure(pin, freq_hz, route) {
            self.alloc.release(pin);
            if !route.newly_bound {
                // The channel may be handed to another pin; the LED must
                // stop fading it.
                if let Err(rc) = ledc::stop(route.channel) {
                    warn!("ledc: stop ch {} failed (rc={})", route.channel, rc);
                }
                self.events.publish(ChannelAssignment { pin, channel: -1 });
            }
            return Err(e);
        }
        if route.newly_bound {
            info!("ledc: GPIO {} -> ch {} (timer {}, {} Hz)", pin, route.channel, route.timer, freq_hz);
            self.events.publish(ChannelAssignment {
                pin,
                channel: i32::from(route.channel),
            });
        }
        ledc::set_duty(route.channel, ledc::duty_to_raw(duty)).map_err(write_failed(pin))
    }
}

impl FadePort for LedcAdapter {
    fn install_fade(&mut self) -> Result<()> {
        ledc::fade_install().map_err(|rc| FadeError::InstallFailed(rc).into())
    }

    fn uninstall_fade(&mut self) {
        ledc::fade_uninstall();
    }

    fn program_fade(&mut self, channel: u8, duty: f32, duration_ms: u32) -> Result<()> {
        ledc::fade_program(channel, ledc::duty_to_raw(duty), duration_ms)
            .map_err(|_| FadeError::ProgramFailed { channel }.into())
    }

    fn start_fade(&mut self, channel: u8) -> Result<()> {
        ledc::fade_start(channel).map_err(|_| FadeError::ProgramFailed { channel }.into())
    }
}
