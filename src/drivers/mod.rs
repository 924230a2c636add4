//! Hardware primitives and small peripheral drivers.

pub mod hw_init;
pub mod status_led;
pub mod task_pin;
