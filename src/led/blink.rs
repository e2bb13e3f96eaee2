//! Blink Controller: a background task alternating on and off phases.

use core::time::Duration;

use log::{debug, error, info};

use crate::app::events::DriverSource;
use crate::app::ports::{LedHardware, TaskId, TaskSpec};
use crate::config::{BLINK_TASK_NAME, BLINK_TASK_PRIORITY, BLINK_TASK_STACK_BYTES};
use crate::error::Result;

use super::mode::{BlinkParams, Mode};
use super::{lock_core, LedCore};

#[derive(Debug, Default)]
pub(crate) struct BlinkController {
    task: Option<TaskId>,
    generation: u32,
    /// Phase applied by the most recent step.
    lit: bool,
}

impl BlinkController {
    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl<H: LedHardware> LedCore<H> {
    pub(crate) fn blink_start(&mut self, on_ms: u32, off_ms: u32) -> Result<()> {
        self.clear_fade_timer();
        self.uninstall_fade();
        self.stop_blink_task();

        let on_level = match self.mode {
            Mode::Blinking(prev) => prev.max,
            _ if self.state.brightness == 0 => u8::MAX,
            _ => self.state.brightness,
        };
        let params = BlinkParams::clamped(on_ms, off_ms, on_level);
        self.set_mode(Mode::Blinking(params));
        self.blink.lit = false;

        let generation = self.blink.next_generation();
        let this = self.this.clone();
        let spec = TaskSpec {
            name: BLINK_TASK_NAME,
            stack_bytes: BLINK_TASK_STACK_BYTES,
            priority: BLINK_TASK_PRIORITY,
        };
        let spawned = self.services.tasks.spawn(
            spec,
            Box::new(move || {
                let core = this.upgrade()?;
                lock_core(&core).on_blink_step(generation)
            }),
        );

        match spawned {
            Ok(id) => {
                self.blink.task = Some(id);
                info!(
                    "blink: started, on {} ms / off {} ms at brightness {}",
                    params.on_ms, params.off_ms, params.max
                );
                Ok(())
            }
            Err(e) => {
                error!("blink: task spawn failed: {}", e);
                self.set_mode(Mode::Static);
                Err(e)
            }
        }
    }

    /// One blink iteration. Returns how long the new phase lasts, or
    /// `None` once this task has been superseded.
    pub(crate) fn on_blink_step(&mut self, generation: u32) -> Option<Duration> {
        if generation != self.blink.generation {
            return None;
        }
        let Mode::Blinking(params) = self.mode else {
            return None;
        };
        self.blink.lit = !self.blink.lit;
        self.state.brightness = if self.blink.lit {
            params.max
        } else {
            params.min
        };
        if let Err(e) = self.apply() {
            self.report(DriverSource::BlinkTask, e);
        }
        let phase_ms = if self.blink.lit {
            params.on_ms
        } else {
            params.off_ms
        };
        Some(Duration::from_millis(u64::from(phase_ms)))
    }

    pub(crate) fn blink_stop(&mut self) {
        self.stop_blink_task();
        if matches!(self.mode, Mode::Blinking(_)) {
            self.set_mode(Mode::Static);
        }
    }

    pub(crate) fn stop_blink_task(&mut self) {
        if let Some(id) = self.blink.task.take() {
            self.services.tasks.delete(id);
            debug!("blink: task {:?} deleted", id);
        }
        self.blink.next_generation();
    }
}
