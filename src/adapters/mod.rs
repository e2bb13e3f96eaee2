//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                  |
//! |------------|---------------------|------------------------------|
//! | `ledc`     | PwmPort, FadePort   | ESP32 LEDC peripheral        |
//! | `hal_pwm`  | PwmPort, FadePort   | any embedded-hal PWM outputs |
//! | `timer`    | TimerPort           | sleeping worker threads      |
//! | `task`     | TaskPort            | core-pinned worker threads   |
//! | `log_sink` | EventSink           | Serial log output            |

pub mod hal_pwm;
pub mod ledc;
pub mod log_sink;
pub mod task;
pub mod timer;

use crate::app::ports::Services;
use crate::drivers::task_pin::Core;

/// Thread-backed timers and tasks on `core`, logging events to the console.
pub fn default_services(core: Core) -> Services {
    Services {
        timers: Box::new(timer::ThreadTimers::new(core)),
        tasks: Box::new(task::ThreadTasks::new(core)),
        sink: Box::new(log_sink::LogEventSink::new()),
    }
}
