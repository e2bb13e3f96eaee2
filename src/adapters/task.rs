//! Thread-backed task adapter.
//!
//! Implements [`TaskPort`] with core-pinned threads. Each task runs its
//! step closure, sleeps for the returned delay, and repeats until the
//! step returns `None` or the task is deleted.
//!
//! Deletion is cooperative: a stop flag plus an unpark. Nothing ever
//! joins a worker, so `delete()` is safe to call while holding a lock
//! the worker may be waiting on.

use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::Thread;
use std::time::Instant;

use log::{debug, error, warn};

use crate::app::ports::{TaskId, TaskPort, TaskSpec, TaskStep};
use crate::drivers::task_pin::{spawn_pinned, Core};
use crate::error::{ResourceError, Result};

/// Upper bound on concurrently running tasks per adapter.
const MAX_WORKERS: usize = 4;

/// Stop handle for a detached worker thread.
pub(crate) struct Worker {
    stop: Arc<AtomicBool>,
    thread: Thread,
}

impl Worker {
    pub(crate) fn spawn(
        core: Core,
        spec: &TaskSpec,
        body: impl FnOnce(&AtomicBool) + Send + 'static,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = spawn_pinned(core, spec, move || body(&flag))?;
        Ok(Self {
            stop,
            thread: handle.thread().clone(),
        })
    }

    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.thread.unpark();
    }
}

/// Sleep for `delay`, waking early if `stop` is raised.
///
/// Returns `false` if the worker should exit.
pub(crate) fn sleep_unless_stopped(stop: &AtomicBool, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        // Spurious wakeups are fine; the loop re-checks both conditions.
        std::thread::park_timeout(deadline - now);
    }
}

/// [`TaskPort`] backed by pinned threads.
pub struct ThreadTasks {
    core: Core,
    next_id: u32,
    workers: heapless::Vec<(TaskId, Worker), MAX_WORKERS>,
}

impl ThreadTasks {
    pub fn new(core: Core) -> Self {
        Self {
            core,
            next_id: 1,
            workers: heapless::Vec::new(),
        }
    }
}

impl Default for ThreadTasks {
    fn default() -> Self {
        Self::new(Core::App)
    }
}

impl TaskPort for ThreadTasks {
    fn spawn(&mut self, spec: TaskSpec, mut step: TaskStep) -> Result<TaskId> {
        if self.workers.is_full() {
            warn!("tasks: {} workers already running", MAX_WORKERS);
            return Err(ResourceError::TaskSpawnFailed.into());
        }

        let worker = Worker::spawn(self.core, &spec, move |stop| {
            while !stop.load(Ordering::Acquire) {
                let Some(delay) = step() else { break };
                if !sleep_unless_stopped(stop, delay) {
                    break;
                }
            }
        })
        .map_err(|e| {
            error!("tasks: spawn {:?} failed: {}", spec.name, e);
            ResourceError::TaskSpawnFailed
        })?;

        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if let Err((_, worker)) = self.workers.push((id, worker)) {
            // Capacity was checked above; never leave a thread unowned.
            worker.stop();
            return Err(ResourceError::TaskSpawnFailed.into());
        }
        debug!("tasks: {:?} spawned as {:?}", spec.name, id);
        Ok(id)
    }

    fn delete(&mut self, id: TaskId) {
        if let Some(pos) = self.workers.iter().position(|(wid, _)| *wid == id) {
            let (_, worker) = self.workers.swap_remove(pos);
            worker.stop();
        }
    }
}

impl Drop for ThreadTasks {
    fn drop(&mut self) {
        for (_, worker) in &self.workers {
            worker.stop();
        }
    }
}
