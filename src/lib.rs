//! WasteSort firmware library.
//!
//! Exposes the sort controller, its ports and the station drivers for
//! integration testing and host simulation.  All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// Device modules are gated on the target; their crates come from the feature.
#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for target_os = \"espidf\" requires `--features espidf`");

pub mod app;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
