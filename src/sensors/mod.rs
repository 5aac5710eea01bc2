//! Input sensors.

pub mod presence;
