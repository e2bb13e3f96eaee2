//! Port traits: the boundary between the LED core and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RgbLed (core)
//! ```
//!
//! The PWM peripheral, the hardware fade engine, the timer service and
//! the task scheduler all belong to the surrounding OS. Adapters in
//! [`crate::adapters`] implement these traits; the core only ever talks
//! to them through here, so it is testable with recording mocks.

use core::ffi::CStr;
use core::time::Duration;

use crate::error::Result;
use crate::pins::Gpio;

use super::events::LedEvent;

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: core → PWM peripheral)
// ───────────────────────────────────────────────────────────────

/// Duty-cycle output on a pin.
pub trait PwmPort {
    /// Drive `pin` at `freq_hz` with `duty` in `[0, 1]`.
    /// A frequency of 0 disables PWM on the pin.
    fn set_pwm(&mut self, pin: Gpio, freq_hz: u32, duty: f32) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Fade port (driven adapter: core → hardware fade engine)
// ───────────────────────────────────────────────────────────────

/// Peripheral-assisted linear duty transitions, addressed by channel.
pub trait FadePort {
    /// Claim the global fade service.
    fn install_fade(&mut self) -> Result<()>;

    /// Release the global fade service.
    fn uninstall_fade(&mut self);

    /// Program a fade on `channel` towards `duty` over `duration_ms`.
    fn program_fade(&mut self, channel: u8, duty: f32, duration_ms: u32) -> Result<()>;

    /// Start the programmed fade without waiting for it to finish.
    fn start_fade(&mut self, channel: u8) -> Result<()>;
}

/// Everything the Apply Engine needs from the peripheral side.
pub trait LedHardware: PwmPort + FadePort + Send + 'static {}

impl<T: PwmPort + FadePort + Send + 'static> LedHardware for T {}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: core → OS timer service)
// ───────────────────────────────────────────────────────────────

/// Identifier of a live repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u32);

pub type TimerCallback = Box<dyn FnMut() + Send>;

pub trait TimerPort {
    /// Call `callback` every `interval`, first fire one interval from now.
    fn set_repeating(&mut self, interval: Duration, callback: TimerCallback) -> Result<TimerId>;

    /// Cancel a timer. Unknown ids are ignored.
    fn clear(&mut self, id: TimerId);
}

// ───────────────────────────────────────────────────────────────
// Task port (driven adapter: core → OS scheduler)
// ───────────────────────────────────────────────────────────────

/// Identifier of a live background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u32);

/// One iteration of a background routine.
///
/// Returns how long to suspend before the next iteration, or `None` when
/// the routine has nothing left to do and should end.
pub type TaskStep = Box<dyn FnMut() -> Option<Duration> + Send>;

/// Scheduling parameters for a background task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static CStr,
    pub stack_bytes: usize,
    pub priority: u8,
}

pub trait TaskPort {
    /// Start a routine that runs `step` until it returns `None` or the
    /// task is deleted. The first step runs immediately.
    fn spawn(&mut self, spec: TaskSpec, step: TaskStep) -> Result<TaskId>;

    /// Request termination. Unknown ids are ignored.
    fn delete(&mut self, id: TaskId);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`LedEvent`]s through this port, including
/// failures inside the fade timer and blink task that have no caller to
/// return to.
pub trait EventSink {
    fn emit(&mut self, event: &LedEvent);
}

/// OS collaborators injected into an [`RgbLed`](crate::led::RgbLed).
pub struct Services {
    pub timers: Box<dyn TimerPort + Send>,
    pub tasks: Box<dyn TaskPort + Send>,
    pub sink: Box<dyn EventSink + Send>,
}
