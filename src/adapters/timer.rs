//! Repeating software timers.
//!
//! Implements [`TimerPort`] with one sleeping thread per timer. The
//! callback runs on that thread, never in ISR context, so it may lock the
//! LED core. Cancellation is the same stop-flag scheme as
//! [`crate::adapters::task`]: `clear()` never blocks on a running
//! callback.

use core::time::Duration;

use log::{debug, error, warn};

use crate::app::ports::{TaskSpec, TimerCallback, TimerId, TimerPort};
use crate::drivers::task_pin::Core;
use crate::error::{ResourceError, Result};

use super::task::{sleep_unless_stopped, Worker};

const MAX_TIMERS: usize = 4;

const TIMER_SPEC: TaskSpec = TaskSpec {
    name: c"led-timer",
    stack_bytes: 4096,
    priority: 2,
};

/// [`TimerPort`] backed by sleeping threads.
pub struct ThreadTimers {
    core: Core,
    next_id: u32,
    timers: heapless::Vec<(TimerId, Worker), MAX_TIMERS>,
}

impl ThreadTimers {
    pub fn new(core: Core) -> Self {
        Self {
            core,
            next_id: 1,
            timers: heapless::Vec::new(),
        }
    }
}

impl Default for ThreadTimers {
    fn default() -> Self {
        Self::new(Core::App)
    }
}

impl TimerPort for ThreadTimers {
    fn set_repeating(&mut self, interval: Duration, mut callback: TimerCallback) -> Result<TimerId> {
        if self.timers.is_full() {
            warn!("timers: {} timers already armed", MAX_TIMERS);
            return Err(ResourceError::TimerUnavailable.into());
        }

        let worker = Worker::spawn(self.core, &TIMER_SPEC, move |stop| {
            while sleep_unless_stopped(stop, interval) {
                callback();
            }
        })
        .map_err(|e| {
            error!("timers: thread spawn failed: {}", e);
            ResourceError::TimerUnavailable
        })?;

        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if let Err((_, worker)) = self.timers.push((id, worker)) {
            worker.stop();
            return Err(ResourceError::TimerUnavailable.into());
        }
        debug!("timers: {:?} every {} ms", id, interval.as_millis());
        Ok(id)
    }

    fn clear(&mut self, id: TimerId) {
        if let Some(pos) = self.timers.iter().position(|(tid, _)| *tid == id) {
            let (_, worker) = self.timers.swap_remove(pos);
            worker.stop();
        }
    }
}

impl Drop for ThreadTimers {
    fn drop(&mut self) {
        for (_, worker) in &self.timers {
            worker.stop();
        }
    }
}
