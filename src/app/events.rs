//! Outbound application events.
//!
//! The [`SortController`](super::service::SortController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log today).

use super::model::WasteCategory;
use crate::error::CaptureError;
use crate::fsm::StateId;
use crate::fsm::context::CycleReport;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller is up and showing "Ready".
    Started,

    /// The cycle moved between states.
    StateChanged { from: StateId, to: StateId },

    /// The presence sensor started a new cycle.
    ObjectDetected { cycle: u32 },

    /// Capture produced no artifact; the cycle aborts.
    CaptureFailed(CaptureError),

    /// The classifier resolved the object's category.
    Classified(WasteCategory),

    /// The cycle is over and the station is back in IDLE.
    CycleCompleted(CycleReport),

    /// The shutdown token was observed.
    ShutdownRequested { state: StateId },

    /// Every actuator output has been released.
    SafeStateReleased,
}
