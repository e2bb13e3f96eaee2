//! Channel-assignment event queue.
//!
//! The PWM adapter decides which hardware channel drives a pin the first
//! time that pin is written. It cannot call back into the LED directly
//! (the write happens while the LED lock is held), so it publishes the
//! assignment here and the owner of the LED drains the queue later.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────────────────┐
//! │ LedcAdapter  │────▶│ ChannelEventQueue│────▶│ RgbLed::on_channel_...  │
//! │ (set_pwm)    │     │   (bounded FIFO) │     │ (Channel Binding)       │
//! └──────────────┘     └──────────────────┘     └─────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use heapless::Deque;

use crate::pins::Gpio;

/// Maximum number of undelivered assignments.
const CHANNEL_QUEUE_CAP: usize = 16;

/// A pin was attached to a hardware PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAssignment {
    pub pin: Gpio,
    /// Hardware channel, or negative when the pin lost its channel.
    pub channel: i32,
}

/// Cloneable handle to a shared bounded FIFO of [`ChannelAssignment`]s.
#[derive(Clone)]
pub struct ChannelEventQueue {
    inner: Arc<Mutex<Deque<ChannelAssignment, CHANNEL_QUEUE_CAP>>>,
}

impl Default for ChannelEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelEventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Deque::new())),
        }
    }

    /// Push an assignment.
    /// Returns `false` if the queue is full (event dropped).
    pub fn publish(&self, assignment: ChannelAssignment) -> bool {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.push_back(assignment).is_err() {
            log::warn!(
                "events: queue full, dropped pin {} -> ch {}",
                assignment.pin,
                assignment.channel
            );
            return false;
        }
        true
    }

    /// Pop the oldest pending assignment.
    pub fn pop(&self) -> Option<ChannelAssignment> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Drain all pending assignments into a callback, FIFO.
    /// The queue lock is released before each callback runs.
    pub fn drain(&self, mut handler: impl FnMut(ChannelAssignment)) {
        while let Some(assignment) = self.pop() {
            handler(assignment);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
