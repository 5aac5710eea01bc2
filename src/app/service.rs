//! Sort controller — the hexagonal core.
//!
//! [`SortController`] owns every port plus a delay provider and sequences
//! one sort cycle at a time.  Everything it calls is blocking, so
//! at-most-one-cycle-in-flight is structural: while a cycle runs, the
//! presence sensor is not polled.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  CapturePort ──▶│      SortController      │
//! ClassifierPort─▶│  IDLE → … → RETURNING    │ ──▶ ActuatorPort
//!     DelayNs ◀── │                          │ ──▶ DisplayPort
//!                 └──────────────────────────┘
//! ```
//!
//! Failure policy: a capture failure aborts the cycle after intake; a
//! classification failure degrades to `Unknown` and the cycle completes
//! without redirection; shutdown rewinds any pending conveyor travel and
//! releases every output.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::SorterConfig;
use crate::fsm::StateId;
use crate::fsm::context::{CycleOutcome, CycleReport, CycleState};

use super::events::AppEvent;
use super::model::{GatePair, Rgb, WasteCategory};
use super::ports::{ActuatorPort, CapturePort, ClassifierPort, DisplayPort, EventSink, SensorPort};
use super::shutdown::ShutdownToken;

/// Text shown while a cycle is running.
pub const MSG_PROCESSING: &str = "Processing...";
/// Text shown in IDLE.
pub const MSG_READY: &str = "Ready";

// ───────────────────────────────────────────────────────────────
// SortController
// ───────────────────────────────────────────────────────────────

/// The sort controller orchestrates one station.
///
/// * `H` — station hardware: presence sensor, actuators, display.
/// * `C` — capture service.
/// * `K` — classifier client.
/// * `D` — blocking delay used for every timed hold.
/// * `E` — event sink.
pub struct SortController<H, C, K, D, E> {
    config: SorterConfig,
    hw: H,
    camera: C,
    classifier: K,
    delay: D,
    sink: E,
    state: StateId,
    /// Presence must read clear before the next cycle may start.
    armed: bool,
    cycles: u32,
}

impl<H, C, K, D, E> SortController<H, C, K, D, E>
where
    H: SensorPort + ActuatorPort + DisplayPort,
    C: CapturePort,
    K: ClassifierPort,
    D: DelayNs,
    E: EventSink,
{
    /// Construct the controller.  `config` must already be validated.
    ///
    /// Does **not** touch the hardware — call [`start`](Self::start) or
    /// [`run`](Self::run) next.
    pub fn new(config: SorterConfig, hw: H, camera: C, classifier: K, delay: D, sink: E) -> Self {
        let armed = !config.rearm_on_clear;
        Self {
            config,
            hw,
            camera,
            classifier,
            delay,
            sink,
            state: StateId::Idle,
            armed,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show "Ready" and announce the controller.
    pub fn start(&mut self) {
        self.hw.clear();
        self.hw.put_str(MSG_READY);
        self.sink.emit(&AppEvent::Started);
        info!("SortController started in {}", self.state);
    }

    /// Poll until `shutdown` is requested, then release every output.
    /// Returns the number of cycles started.
    pub fn run(&mut self, shutdown: &ShutdownToken) -> u32 {
        self.start();

        let mut cancelled_mid_cycle = false;
        while !shutdown.is_requested() {
            match self.poll_once(shutdown) {
                Some(report) if report.outcome == CycleOutcome::Cancelled => {
                    cancelled_mid_cycle = true;
                    break;
                }
                Some(_) => {}
                None => self.hold(self.config.poll_interval_ms),
            }
        }

        if !cancelled_mid_cycle {
            warn!("SORT: shutdown requested in {}", self.state);
            self.sink.emit(&AppEvent::ShutdownRequested { state: self.state });
        }
        self.release_safe_state();
        self.cycles
    }

    /// Sample the presence sensor once from IDLE and run a full cycle if an
    /// object is there (and the station is armed).
    pub fn poll_once(&mut self, shutdown: &ShutdownToken) -> Option<CycleReport> {
        if self.state != StateId::Idle {
            return None;
        }

        if !self.hw.is_present() {
            self.armed = true;
            return None;
        }
        if !self.armed {
            return None;
        }

        Some(self.run_cycle(shutdown))
    }

    /// Execute one complete cycle starting from IDLE.
    pub fn run_cycle(&mut self, shutdown: &ShutdownToken) -> CycleReport {
        self.cycles = self.cycles.wrapping_add(1);
        if self.config.rearm_on_clear {
            self.armed = false;
        }

        let mut cycle = CycleState::new(self.cycles);
        self.sink.emit(&AppEvent::ObjectDetected { cycle: cycle.cycle });
        self.transition(StateId::ObjectDetected);

        while self.state != StateId::Idle {
            if shutdown.is_requested() {
                return self.cancel(&mut cycle);
            }

            let next = match self.state {
                StateId::ObjectDetected => self.on_object_detected(&cycle),
                StateId::Capturing => self.on_capturing(&mut cycle),
                StateId::Classifying => self.on_classifying(&mut cycle),
                StateId::Sorting => self.on_sorting(&mut cycle),
                StateId::Returning => self.on_returning(&mut cycle),
                StateId::Idle => StateId::Idle,
            };
            self.transition(next);
        }

        let outcome = match cycle.capture_error {
            Some(e) => CycleOutcome::CaptureFailed(e),
            None => CycleOutcome::Sorted,
        };
        let report = cycle.report(outcome);
        info!(
            "SORT: cycle {} done ({:?}, category={:?})",
            report.cycle, report.outcome, report.category
        );
        self.sink.emit(&AppEvent::CycleCompleted(report));
        report
    }

    /// De-energise every actuator output.  Safe to call from any state and
    /// more than once.
    pub fn release_safe_state(&mut self) {
        self.hw.release_all();
        self.sink.emit(&AppEvent::SafeStateReleased);
        info!("SORT: actuator outputs released");
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.state
    }

    /// Cycles started since construction.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── State handlers ────────────────────────────────────────

    /// Intake sub-sequence.  Not cancellable: runs to completion once
    /// started.
    fn on_object_detected(&mut self, cycle: &CycleState) -> StateId {
        info!("OBJECT_DETECTED: cycle {}, running intake", cycle.cycle);
        self.hw.clear();
        self.hw.put_str(MSG_PROCESSING);

        self.hw.set_pair(GatePair::Intake, self.config.intake_open);
        self.hold(self.config.intake_open_hold_ms);
        self.hw.set_pair(GatePair::Intake, self.config.intake_closed);
        self.hold(self.config.intake_close_hold_ms);

        self.hw.fill_light(self.config.capture_light);
        self.hold(self.config.light_settle_ms);

        StateId::Capturing
    }

    fn on_capturing(&mut self, cycle: &mut CycleState) -> StateId {
        match self.camera.capture() {
            Ok(artifact) => {
                info!("CAPTURING: {} bytes captured", artifact.len());
                cycle.artifact = Some(artifact);
                StateId::Classifying
            }
            Err(e) => {
                warn!("CAPTURING: no artifact ({}), aborting cycle", e);
                cycle.capture_error = Some(e);
                self.sink.emit(&AppEvent::CaptureFailed(e));
                StateId::Returning
            }
        }
    }

    fn on_classifying(&mut self, cycle: &mut CycleState) -> StateId {
        let category = match cycle.artifact.take() {
            Some(artifact) => self.classifier.classify(artifact),
            None => WasteCategory::Unknown,
        };
        cycle.category = Some(category);
        info!("CLASSIFYING: resolved {}", category);
        self.sink.emit(&AppEvent::Classified(category));

        let mut line: heapless::String<32> = heapless::String::new();
        let _ = write!(line, "Category: {}", category);
        self.hw.clear();
        self.hw.put_str(&line);
        self.hold(self.config.category_dwell_ms);

        StateId::Sorting
    }

    fn on_sorting(&mut self, cycle: &mut CycleState) -> StateId {
        let category = cycle.category.unwrap_or(WasteCategory::Unknown);
        match self.config.sort_rotation(category) {
            Some(steps) => {
                info!("SORTING: {} -> conveyor {:+} steps", category, steps);
                self.hw.rotate(steps);
                cycle.record_rotation(steps);
            }
            None => info!("SORTING: {} -> no redirection", category),
        }

        self.hold(self.config.pre_drop_hold_ms);
        self.hw.set_pair(GatePair::Drop, self.config.drop_open);
        self.hold(self.config.drop_open_hold_ms);
        self.hw.set_pair(GatePair::Drop, self.config.drop_closed);
        self.hold(self.config.drop_close_hold_ms);

        StateId::Returning
    }

    fn on_returning(&mut self, cycle: &mut CycleState) -> StateId {
        if let Some(steps) = cycle.rewind_steps() {
            info!("RETURNING: conveyor {:+} steps to neutral", steps);
            self.hw.rotate(steps);
            cycle.record_rotation(steps);
        }

        self.hw.clear();
        self.hw.fill_light(Rgb::OFF);
        self.hold(self.config.light_settle_ms);
        self.hw.put_str(MSG_READY);

        StateId::Idle
    }

    // ── Internal ──────────────────────────────────────────────

    /// Shutdown observed mid-cycle: rewind the conveyor so the chute is
    /// left at neutral, then drop back to IDLE.  Outputs are released by
    /// the caller.
    fn cancel(&mut self, cycle: &mut CycleState) -> CycleReport {
        let state = self.state;
        warn!("SORT: shutdown requested in {}", state);
        self.sink.emit(&AppEvent::ShutdownRequested { state });

        if let Some(steps) = cycle.rewind_steps() {
            info!("SORT: rewinding conveyor {:+} steps before release", steps);
            self.hw.rotate(steps);
            cycle.record_rotation(steps);
        }
        cycle.artifact = None;
        self.transition(StateId::Idle);

        let report = cycle.report(CycleOutcome::Cancelled);
        self.sink.emit(&AppEvent::CycleCompleted(report));
        report
    }

    fn transition(&mut self, next: StateId) {
        let from = self.state;
        debug_assert!(from.can_transition_to(next), "illegal transition {from} -> {next}");
        info!("SORT transition: {} -> {}", from, next);
        self.state = next;
        self.sink.emit(&AppEvent::StateChanged { from, to: next });
    }

    fn hold(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }
}
