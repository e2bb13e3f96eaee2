//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one part of the LED
//! against mock adapters. All tests run on the host (x86_64) with no
//! real hardware required.

mod blink_tests;
mod failure_tests;
mod fade_tests;
