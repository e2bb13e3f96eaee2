//! Pin → hardware channel bindings.
//!
//! Hardware fades address channels, not pins, and the PWM driver only
//! picks a channel the first time a pin is written. Bindings therefore
//! arrive later through [`ChannelEventQueue`](crate::events::ChannelEventQueue)
//! and are best-effort: an unbound channel is skipped by the fade path.
//! A released channel arrives as a negative assignment and unbinds the pin.

use crate::config::LedPins;
use crate::pins::Gpio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBindings {
    slots: [(Gpio, Option<u8>); 3],
}

impl ChannelBindings {
    pub fn new(pins: LedPins) -> Self {
        Self {
            slots: pins.as_array().map(|pin| (pin, None)),
        }
    }

    /// Record `channel` for `pin`. Returns `false` for a foreign pin.
    pub fn bind(&mut self, pin: Gpio, channel: u8) -> bool {
        match self.slots.iter_mut().find(|(p, _)| *p == pin) {
            Some(slot) => {
                slot.1 = Some(channel);
                true
            }
            None => false,
        }
    }

    /// Forget the channel of `pin`. Returns `false` if it had none.
    pub fn unbind(&mut self, pin: Gpio) -> bool {
        self.slots
            .iter_mut()
            .find(|(p, _)| *p == pin)
            .and_then(|slot| slot.1.take())
            .is_some()
    }

    pub fn channel(&self, pin: Gpio) -> Option<u8> {
        self.slots
            .iter()
            .find(|(p, _)| *p == pin)
            .and_then(|(_, ch)| *ch)
    }

    /// Channels in R, G, B order.
    pub fn channels(&self) -> [Option<u8>; 3] {
        self.slots.map(|(_, ch)| ch)
    }
}
