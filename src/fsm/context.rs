//! Per-cycle blackboard owned by the sort controller.
//!
//! `CycleState` is created when an object is detected and dropped when the
//! controller is back in IDLE.  Nothing in it survives to the next cycle.

use crate::app::model::{ImageArtifact, WasteCategory};
use crate::error::CaptureError;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The object went through the full sort sequence.
    Sorted,
    /// No artifact was produced; the cycle was aborted after intake.
    CaptureFailed(CaptureError),
    /// Shutdown was requested mid-cycle.
    Cancelled,
}

/// Summary of one finished cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u32,
    pub outcome: CycleOutcome,
    /// `None` when classification never ran.
    pub category: Option<WasteCategory>,
    /// Net conveyor steps left applied at cycle end (0 unless the teardown
    /// itself could not complete).
    pub net_displacement: i32,
}

/// Transient state for the cycle in flight.
#[derive(Debug)]
pub struct CycleState {
    /// 1-based cycle counter since boot.
    pub cycle: u32,
    /// Artifact captured in CAPTURING, taken by CLASSIFYING.
    pub artifact: Option<ImageArtifact>,
    /// Resolved in CLASSIFYING; fixed afterwards.
    pub category: Option<WasteCategory>,
    /// Signed conveyor steps applied and not yet reversed.
    pub displacement: i32,
    /// Set by CAPTURING when no artifact was produced.
    pub capture_error: Option<CaptureError>,
}

impl CycleState {
    pub fn new(cycle: u32) -> Self {
        Self {
            cycle,
            artifact: None,
            category: None,
            displacement: 0,
            capture_error: None,
        }
    }

    /// Record a conveyor move.
    pub fn record_rotation(&mut self, steps: i32) {
        self.displacement = self.displacement.saturating_add(steps);
    }

    /// Steps needed to bring the conveyor back to neutral.
    pub fn rewind_steps(&self) -> Option<i32> {
        (self.displacement != 0).then(|| -self.displacement)
    }

    /// Build the report for the given outcome.
    pub fn report(&self, outcome: CycleOutcome) -> CycleReport {
        CycleReport {
            cycle: self.cycle,
            outcome,
            category: self.category,
            net_displacement: self.displacement,
        }
    }
}
