//! Low-level peripheral and RTOS helpers.

pub mod ledc;
pub mod task_pin;
