//! Application core — pure domain logic, zero I/O.
//!
//! The sort cycle, its failure policy, and the value types it works on.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod model;
pub mod ports;
pub mod service;
pub mod shutdown;
