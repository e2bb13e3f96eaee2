//! Core-pinned thread spawning for ESP32 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread` creates a
//! FreeRTOS task pinned to a specific CPU core with explicit priority
//! and stack size. On non-ESP targets, falls back to plain thread spawn.
//!
//! `esp_pthread_set_cfg()` sets thread-local configuration that applies
//! to the *next* `pthread_create()` call from the calling thread, so the
//! config→spawn pair must not be interleaved with other thread creation
//! on the same thread.

use std::io;
use std::thread::JoinHandle;

use crate::app::ports::TaskSpec;

/// CPU core identifiers for the ESP32 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): protocol stacks (WiFi, BLE, lwIP).
    Pro = 0,
    /// Core 1 (APP_CPU): application logic.
    App = 1,
}

#[cfg(target_os = "espidf")]
pub fn spawn_pinned(
    core: Core,
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config is consumed by the very next thread creation on
    // this thread, which happens below before anything else can spawn.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as _;
        cfg.prio = spec.priority as _;
        cfg.stack_size = spec.stack_bytes as _;
        cfg.thread_name = spec.name.as_ptr();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as esp_idf_sys::esp_err_t {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    let display_name = spec.name.to_str().unwrap_or("led-task");
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}B)",
        display_name,
        core,
        spec.priority,
        spec.stack_bytes
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_pinned(
    _core: Core,
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let display_name = spec.name.to_str().unwrap_or("led-task");
    log::debug!(
        "Spawning '{}' (sim, no core pinning, stack={}B)",
        display_name,
        spec.stack_bytes
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(spec.stack_bytes.max(MIN_HOST_STACK_BYTES))
        .spawn(f)
}

/// Host threads need more stack than a FreeRTOS task for the same code.
#[cfg(not(target_os = "espidf"))]
const MIN_HOST_STACK_BYTES: usize = 64 * 1024;
