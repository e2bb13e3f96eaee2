//! Logical colour state and the duty transform.
//!
//! `duty = (component / 255) * (brightness / 255)`, inverted for a
//! common-anode LED. This is the only place that formula lives.

use crate::config::{LedPins, Polarity};

/// Logical colour, one byte per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack `0xRRGGBB`. Bits above 23 are ignored.
    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Per-channel duty fractions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Duty {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Map a colour and brightness to electrical duty for the given wiring.
pub fn compute_duty(color: Rgb, brightness: u8, polarity: Polarity) -> Duty {
    let br = f32::from(brightness) / 255.0;
    let scale = |component: u8| {
        let lit = (f32::from(component) / 255.0) * br;
        match polarity {
            Polarity::CommonCathode => lit,
            Polarity::CommonAnode => 1.0 - lit,
        }
    };
    Duty {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Identity, logical state and derived duty of one LED.
#[derive(Debug, Clone)]
pub(crate) struct LedState {
    pub pins: LedPins,
    pub polarity: Polarity,
    pub color: Rgb,
    pub brightness: u8,
    pub freq_hz: u32,
    /// Recomputed by every apply; never written by clients.
    pub duty: Duty,
}

impl LedState {
    pub fn new(pins: LedPins, polarity: Polarity, freq_hz: u32) -> Self {
        // Cathode starts at brightness 0; anode at 255 (with black that is
        // still fully off after inversion).
        let brightness = match polarity {
            Polarity::CommonCathode => 0,
            Polarity::CommonAnode => 255,
        };
        Self {
            pins,
            polarity,
            color: Rgb::BLACK,
            brightness,
            freq_hz,
            duty: Duty::default(),
        }
    }

    /// Pair each pin with its logical component and derived duty.
    pub fn channels(&self) -> [(crate::pins::Gpio, u8, f32); 3] {
        [
            (self.pins.r, self.color.r, self.duty.r),
            (self.pins.g, self.color.g, self.duty.g),
            (self.pins.b, self.color.b, self.duty.b),
        ]
    }
}
