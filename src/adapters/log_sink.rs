//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing LED events to the ESP-IDF logger
//! (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::LedEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LedEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LedEvent) {
        match event {
            LedEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            LedEvent::ChannelBound { pin, channel } => {
                info!("BIND | pin {} -> ch {}", pin, channel);
            }
            LedEvent::ChannelUnbound { pin } => {
                info!("BIND | pin {} -> none", pin);
            }
            LedEvent::FrequencyClamped { requested, applied } => {
                warn!("FREQ | requested {} Hz, applied {} Hz", requested, applied);
            }
            LedEvent::DriverFault { source, error } => {
                warn!("FAULT | {:?}: {}", source, error);
            }
        }
    }
}
