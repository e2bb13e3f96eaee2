//! Output mode state machine.
//!
//! At most one mechanism drives the LED outputs at a time:
//!
//! | Mode       | Driver owned                       |
//! |------------|------------------------------------|
//! | `Static`   | none, client calls apply directly  |
//! | `Fading`   | fade service, optional repeat timer|
//! | `Blinking` | background blink task              |
//!
//! Transitions always tear down the previous variant's driver before the
//! next one is installed (see [`RgbLed`](super::RgbLed)).

use crate::config::{clamp_blink_ms, FADE_TIMER_SLACK_MS};

/// Fade behaviour requested by `fade_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Timer-driven toggle between max and min with direct writes.
    Blink,
    /// Same as `Blink`; the caller picks a short duration.
    BlinkRapid,
    /// No fade. `fade_start` with this direction stops fading.
    Off,
    /// One hardware fade towards max.
    Up,
    /// One hardware fade towards min.
    Down,
    /// Endless hardware fade between max and min.
    Loop,
}

impl FadeDirection {
    /// Whether apply programs the hardware fade engine in this direction.
    pub fn is_hardware_fade(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Loop)
    }

    /// Whether this direction needs the repeating toggle timer.
    pub fn repeats(self) -> bool {
        matches!(self, Self::Loop | Self::Blink | Self::BlinkRapid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeParams {
    pub direction: FadeDirection,
    pub duration_ms: u32,
    pub max: u8,
    pub min: u8,
}

impl FadeParams {
    /// Period of the toggle timer for repeating directions.
    pub fn timer_interval_ms(&self) -> u32 {
        self.duration_ms.saturating_add(FADE_TIMER_SLACK_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkParams {
    pub on_ms: u32,
    pub off_ms: u32,
    /// Brightness during the on phase.
    pub max: u8,
    /// Brightness during the off phase.
    pub min: u8,
}

impl BlinkParams {
    /// Build blink parameters with both phases clamped to the legal range.
    pub fn clamped(on_ms: u32, off_ms: u32, max: u8) -> Self {
        Self {
            on_ms: clamp_blink_ms(on_ms),
            off_ms: clamp_blink_ms(off_ms),
            max,
            min: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Static,
    Fading(FadeParams),
    Blinking(BlinkParams),
}

/// Discriminant of [`Mode`] without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Static,
    Fading,
    Blinking,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Static => ModeKind::Static,
            Self::Fading(_) => ModeKind::Fading,
            Self::Blinking(_) => ModeKind::Blinking,
        }
    }

    /// Parameters of an active hardware fade, if apply should fade.
    pub fn hardware_fade(&self) -> Option<FadeParams> {
        match self {
            Self::Fading(p) if p.direction.is_hardware_fade() => Some(*p),
            _ => None,
        }
    }
}
