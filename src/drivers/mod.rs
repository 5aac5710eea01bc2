//! Actuator and display drivers.

pub mod lcd;
pub mod light_strip;
pub mod servo;
pub mod stepper;
