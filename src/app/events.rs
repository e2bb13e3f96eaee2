//! Outbound LED events.
//!
//! [`RgbLed`](crate::led::RgbLed) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to serial, count faults, etc.

use crate::error::Error;
use crate::led::mode::ModeKind;
use crate::pins::Gpio;

/// Which background driver hit a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSource {
    /// Per-channel hardware fade programming inside an apply.
    FadeProgram,
    /// The repeating fade/toggle timer callback.
    FadeTimer,
    /// The blink background task.
    BlinkTask,
}

/// Structured events emitted by the LED core.
#[derive(Debug, Clone, PartialEq)]
pub enum LedEvent {
    /// The output-driving mechanism changed.
    ModeChanged { from: ModeKind, to: ModeKind },

    /// A pin was bound to a hardware PWM channel.
    ChannelBound { pin: Gpio, channel: u8 },

    /// The PWM driver released the channel behind a pin.
    ChannelUnbound { pin: Gpio },

    /// A requested frequency was outside the supported range.
    FrequencyClamped { requested: u32, applied: u32 },

    /// A background driver absorbed a failure.
    DriverFault { source: DriverSource, error: Error },
}
