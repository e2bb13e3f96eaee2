//! Unified error types for the RGB LED driver.
//!
//! A single `Error` enum that every subsystem converts into, so client
//! calls and background drivers report failures the same way. All variants
//! are `Copy` so they can be handed to the event sink from timer and task
//! context without allocation.

use core::fmt;

use crate::pins::Gpio;

// ---------------------------------------------------------------------------
// Top-level driver error
// ---------------------------------------------------------------------------

/// Every fallible LED operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A duty-cycle or frequency write to the PWM peripheral failed.
    Pwm(PwmError),
    /// The hardware fade engine refused a request.
    Fade(FadeError),
    /// A timer or background task could not be allocated.
    Resource(ResourceError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pwm(e) => write!(f, "pwm: {e}"),
            Self::Fade(e) => write!(f, "fade: {e}"),
            Self::Resource(e) => write!(f, "resource: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// PWM errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Writing duty or frequency to this pin failed.
    WriteFailed { pin: Gpio },
    /// Every PWM channel is already bound to another pin.
    NoChannelAvailable,
    /// Every PWM timer already runs at a different frequency.
    NoTimerAvailable,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { pin } => write!(f, "write failed on GPIO {pin}"),
            Self::NoChannelAvailable => write!(f, "no free PWM channel"),
            Self::NoTimerAvailable => write!(f, "no free PWM timer"),
        }
    }
}

impl From<PwmError> for Error {
    fn from(e: PwmError) -> Self {
        Self::Pwm(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware fade errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeError {
    /// The fade service could not be installed (ESP-IDF return code).
    InstallFailed(i32),
    /// The PWM backend has no hardware fade engine.
    Unsupported,
    /// Programming or starting a fade on this channel failed.
    ProgramFailed { channel: u8 },
}

impl fmt::Display for FadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallFailed(rc) => write!(f, "fade service install failed (rc={rc})"),
            Self::Unsupported => write!(f, "hardware fade not supported"),
            Self::ProgramFailed { channel } => write!(f, "fade program failed on channel {channel}"),
        }
    }
}

impl From<FadeError> for Error {
    fn from(e: FadeError) -> Self {
        Self::Fade(e)
    }
}

// ---------------------------------------------------------------------------
// OS resource errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// No repeating timer could be created.
    TimerUnavailable,
    /// The background task could not be spawned.
    TaskSpawnFailed,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimerUnavailable => write!(f, "timer allocation failed"),
            Self::TaskSpawnFailed => write!(f, "task spawn failed"),
        }
    }
}

impl From<ResourceError> for Error {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
