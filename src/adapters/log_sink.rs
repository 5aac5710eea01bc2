//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the serial log, one tagged line per event.  Cycle durations are
//! measured here from the `ObjectDetected` event to `CycleCompleted`.

use log::{info, warn};

use super::time::SystemClock;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::fsm::context::CycleOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    clock: SystemClock,
    cycle_started_ms: Option<u64>,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | ready");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::ObjectDetected { cycle } => {
                self.cycle_started_ms = Some(self.clock.uptime_ms());
                info!("CYCLE | #{} object detected", cycle);
            }
            AppEvent::CaptureFailed(e) => {
                warn!("CAPTURE | failed: {}", e);
            }
            AppEvent::Classified(category) => {
                info!("CLASSIFY | {}", category);
            }
            AppEvent::CycleCompleted(report) => {
                let elapsed = self
                    .cycle_started_ms
                    .take()
                    .map_or(0, |t| self.clock.uptime_ms().saturating_sub(t));
                let outcome = match report.outcome {
                    CycleOutcome::Sorted => "sorted",
                    CycleOutcome::CaptureFailed(_) => "capture-failed",
                    CycleOutcome::Cancelled => "cancelled",
                };
                info!(
                    "CYCLE | #{} {} | category={} | displacement={} | {}ms",
                    report.cycle,
                    outcome,
                    report.category.map_or("-", |c| c.label()),
                    report.net_displacement,
                    elapsed,
                );
                if report.net_displacement != 0 {
                    warn!("CYCLE | conveyor not at neutral after cycle {}", report.cycle);
                }
            }
            AppEvent::ShutdownRequested { state } => {
                warn!("SHUTDOWN | requested in {}", state);
            }
            AppEvent::SafeStateReleased => {
                info!("SHUTDOWN | outputs released");
            }
        }
    }
}
