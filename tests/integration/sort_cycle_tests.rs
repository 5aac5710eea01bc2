//! Integration tests for the SortController → ports pipeline.
//!
//! Run on the host against the recording mocks; every test asserts on the
//! ordered call log shared by all adapters.

use wastesort::app::events::AppEvent;
use wastesort::app::model::{GatePair, Rgb, WasteCategory};
use wastesort::classifier::HttpResponse;
use wastesort::config::SorterConfig;
use wastesort::error::{CaptureError, ClassifyError};
use wastesort::fsm::StateId;
use wastesort::fsm::context::CycleOutcome;

use crate::mock_hw::{Call, Rig, TEST_URL, reply, set_pair};

fn put(s: &str) -> Call {
    Call::PutStr(s.into())
}

// ── Full cycles ───────────────────────────────────────────────

#[test]
fn recyclable_cycle_runs_full_sequence() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![reply("Recyclable")]);
    rig.controller.start();
    assert!(rig.controller.poll_once(&rig.shutdown).is_none(), "clear reading only arms");
    let report = rig.controller.poll_once(&rig.shutdown).expect("cycle should run");

    assert_eq!(
        rig.log.calls(),
        vec![
            Call::Clear,
            put("Ready"),
            // OBJECT_DETECTED
            Call::Clear,
            put("Processing..."),
            set_pair(GatePair::Intake, 135.0, 49.0),
            Call::Delay(3_000),
            set_pair(GatePair::Intake, 4.0, 180.0),
            Call::Delay(2_000),
            Call::FillLight(Rgb::WHITE),
            Call::Delay(1_000),
            // CAPTURING / CLASSIFYING
            Call::Capture,
            Call::HttpPost { url: TEST_URL.into() },
            Call::Clear,
            put("Category: Recyclable"),
            Call::Delay(2_000),
            // SORTING
            Call::Rotate(600),
            Call::Delay(2_000),
            set_pair(GatePair::Drop, 70.0, 70.0),
            Call::Delay(3_000),
            set_pair(GatePair::Drop, 4.0, 4.0),
            Call::Delay(3_000),
            // RETURNING
            Call::Rotate(-600),
            Call::Clear,
            Call::FillLight(Rgb::OFF),
            Call::Delay(1_000),
            put("Ready"),
        ]
    );

    assert_eq!(report.outcome, CycleOutcome::Sorted);
    assert_eq!(report.category, Some(WasteCategory::Recyclable));
    assert_eq!(report.net_displacement, 0);
    assert_eq!(rig.controller.state(), StateId::Idle);
}

#[test]
fn non_recyclable_rotates_reverse_then_forward() {
    let mut rig = Rig::with_reply("Non-recyclable");
    let report = rig.controller.run_cycle(&rig.shutdown);

    assert_eq!(rig.log.rotations(), vec![-600, 600]);
    assert!(rig.log.calls().contains(&put("Category: Non-recyclable")));
    assert_eq!(report.category, Some(WasteCategory::NonRecyclable));
    assert_eq!(report.net_displacement, 0);
}

#[test]
fn organic_passes_without_rotation() {
    let mut rig = Rig::with_reply("Organic");
    let report = rig.controller.run_cycle(&rig.shutdown);

    assert!(rig.log.rotations().is_empty());
    assert_eq!(report.category, Some(WasteCategory::Organic));
    // Drop gate still cycles.
    assert!(rig.log.calls().contains(&set_pair(GatePair::Drop, 70.0, 70.0)));
    assert!(rig.log.calls().contains(&set_pair(GatePair::Drop, 4.0, 4.0)));
}

#[test]
fn unrecognised_text_resolves_unknown_and_still_drops() {
    let mut rig = Rig::with_reply("Plastic");
    let report = rig.controller.run_cycle(&rig.shutdown);

    assert_eq!(report.category, Some(WasteCategory::Unknown));
    assert_eq!(report.outcome, CycleOutcome::Sorted);
    assert!(rig.log.rotations().is_empty());
    assert!(rig.log.calls().contains(&put("Category: Unknown")));
    assert!(rig.log.calls().contains(&set_pair(GatePair::Drop, 70.0, 70.0)));
    assert_eq!(rig.log.last_text().as_deref(), Some("Ready"));
    assert!(
        rig.events()
            .contains(&AppEvent::Classified(WasteCategory::Unknown))
    );
}

#[test]
fn lowercase_answer_is_not_accepted() {
    let mut rig = Rig::with_reply("recyclable");
    let report = rig.controller.run_cycle(&rig.shutdown);
    assert_eq!(report.category, Some(WasteCategory::Unknown));
    assert!(rig.log.rotations().is_empty());
}

// ── Classification failures ───────────────────────────────────

#[test]
fn transport_error_degrades_to_unknown() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![],
        vec![Err(ClassifyError::Transport)],
    );
    let report = rig.controller.run_cycle(&rig.shutdown);

    assert_eq!(report.category, Some(WasteCategory::Unknown));
    assert_eq!(report.outcome, CycleOutcome::Sorted);
    assert_eq!(rig.log.count(|c| matches!(c, Call::HttpPost { .. })), 1, "never retried");
    assert!(rig.log.rotations().is_empty());
    assert_eq!(rig.log.last_text().as_deref(), Some("Ready"));
}

#[test]
fn error_status_degrades_to_unknown() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![],
        vec![Ok(HttpResponse {
            status: 429,
            body: b"{\"error\":{}}".to_vec(),
        })],
    );
    let report = rig.controller.run_cycle(&rig.shutdown);
    assert_eq!(report.category, Some(WasteCategory::Unknown));
    assert!(rig.log.rotations().is_empty());
}

#[test]
fn missing_candidate_text_degrades_to_unknown() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![],
        vec![Ok(HttpResponse {
            status: 200,
            body: b"{\"candidates\":[]}".to_vec(),
        })],
    );
    let report = rig.controller.run_cycle(&rig.shutdown);
    assert_eq!(report.category, Some(WasteCategory::Unknown));
}

#[test]
fn display_never_shows_raw_errors() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![],
        vec![Err(ClassifyError::HttpStatus(500))],
    );
    rig.controller.run_cycle(&rig.shutdown);
    let texts: Vec<String> = rig
        .log
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::PutStr(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["Processing...", "Category: Unknown", "Ready"]);
}

// ── Capture failure ───────────────────────────────────────────

#[test]
fn capture_failure_skips_classifier_and_sorting() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![Err(CaptureError::BufferUnavailable)],
        vec![reply("Recyclable")],
    );
    let report = rig.controller.run_cycle(&rig.shutdown);

    assert_eq!(report.outcome, CycleOutcome::CaptureFailed(CaptureError::BufferUnavailable));
    assert_eq!(report.category, None);
    assert_eq!(rig.log.count(|c| matches!(c, Call::HttpPost { .. })), 0);
    assert!(rig.log.rotations().is_empty());
    assert_eq!(
        rig.log.count(|c| matches!(c, Call::SetPair { pair: GatePair::Drop, .. })),
        0
    );
    assert_eq!(rig.log.last_text().as_deref(), Some("Ready"));
    assert!(rig.log.calls().contains(&Call::FillLight(Rgb::OFF)));
    assert!(
        rig.events()
            .contains(&AppEvent::CaptureFailed(CaptureError::BufferUnavailable))
    );
    assert_eq!(rig.controller.state(), StateId::Idle);
}

#[test]
fn capture_failure_leaves_intake_closed() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[],
        vec![Err(CaptureError::HardwareUnavailable)],
        vec![],
    );
    rig.controller.run_cycle(&rig.shutdown);
    let last_intake = rig
        .log
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::SetPair { pair: GatePair::Intake, .. }))
        .last();
    assert_eq!(last_intake, Some(set_pair(GatePair::Intake, 4.0, 180.0)));
}

// ── Presence polling ──────────────────────────────────────────

#[test]
fn object_left_on_sensor_does_not_retrigger() {
    let mut rig = Rig::new(
        SorterConfig::default(),
        &[true, true, false, true, true, true],
        vec![],
        vec![reply("Organic")],
    );
    let mut cycles = 0;
    for _ in 0..6 {
        if rig.controller.poll_once(&rig.shutdown).is_some() {
            cycles += 1;
        }
    }
    // Present at boot is ignored until the sensor has read clear once;
    // after the cycle the object still present is ignored again.
    assert_eq!(cycles, 1);
    assert_eq!(rig.controller.cycles(), 1);
}

#[test]
fn level_triggered_when_rearm_disabled() {
    let config = SorterConfig {
        rearm_on_clear: false,
        ..SorterConfig::default()
    };
    let mut rig = Rig::new(config, &[true, true], vec![], vec![reply("Organic"), reply("Organic")]);
    assert!(rig.controller.poll_once(&rig.shutdown).is_some());
    assert!(rig.controller.poll_once(&rig.shutdown).is_some());
    assert_eq!(rig.controller.cycles(), 2);
}

#[test]
fn sensor_not_polled_during_cycle() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![reply("Recyclable")]);
    rig.controller.poll_once(&rig.shutdown);
    rig.controller.poll_once(&rig.shutdown);
    assert_eq!(rig.controller.hardware().polls, 2);
}

#[test]
fn state_changes_follow_the_cycle_order() {
    let mut rig = Rig::with_reply("Recyclable");
    rig.controller.run_cycle(&rig.shutdown);
    let states: Vec<StateId> = rig
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            StateId::ObjectDetected,
            StateId::Capturing,
            StateId::Classifying,
            StateId::Sorting,
            StateId::Returning,
            StateId::Idle,
        ]
    );
}

#[test]
fn zero_scaled_config_holds_nothing() {
    let config = SorterConfig::default().scaled(0.0);
    let mut rig = Rig::new(config, &[], vec![], vec![reply("Recyclable")]);
    rig.controller.run_cycle(&rig.shutdown);
    assert_eq!(rig.log.count(|c| matches!(c, Call::Delay(_))), 0);
    assert_eq!(rig.log.rotations(), vec![600, -600]);
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_while_idle_releases_outputs() {
    let mut rig = Rig::new(SorterConfig::default(), &[], vec![], vec![]);
    rig.shutdown.request();
    let cycles = rig.controller.run(&rig.shutdown);

    assert_eq!(cycles, 0);
    assert_eq!(rig.log.actions().last(), Some(&Call::ReleaseAll));
    assert!(
        rig.events()
            .contains(&AppEvent::ShutdownRequested { state: StateId::Idle })
    );
    assert_eq!(rig.events().last(), Some(&AppEvent::SafeStateReleased));
}

#[test]
fn shutdown_after_sort_rotation_rewinds_before_release() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![reply("Recyclable")]);
    rig.log
        .shutdown_when(&rig.shutdown, |c| matches!(c, Call::Rotate(600)));
    let cycles = rig.controller.run(&rig.shutdown);

    assert_eq!(cycles, 1);
    assert_eq!(rig.log.rotations(), vec![600, -600]);
    assert_eq!(rig.log.actions().last(), Some(&Call::ReleaseAll));
    assert!(
        rig.events()
            .contains(&AppEvent::ShutdownRequested { state: StateId::Returning })
    );
    let report = rig
        .events()
        .iter()
        .find_map(|e| match e {
            AppEvent::CycleCompleted(r) => Some(*r),
            _ => None,
        })
        .expect("cycle report");
    assert_eq!(report.outcome, CycleOutcome::Cancelled);
    assert_eq!(report.net_displacement, 0);
    assert_eq!(rig.controller.state(), StateId::Idle);
}

#[test]
fn cancelled_cycle_reports_return_to_idle() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![reply("Recyclable")]);
    rig.log
        .shutdown_when(&rig.shutdown, |c| matches!(c, Call::Rotate(600)));
    rig.controller.run(&rig.shutdown);

    let events = rig.events();
    let completed = events
        .iter()
        .position(|e| matches!(e, AppEvent::CycleCompleted(_)))
        .expect("cycle report");
    assert_eq!(
        events[completed - 1],
        AppEvent::StateChanged {
            from: StateId::Returning,
            to: StateId::Idle,
        }
    );
    let last_state = events.iter().rev().find_map(|e| match e {
        AppEvent::StateChanged { to, .. } => Some(*to),
        _ => None,
    });
    assert_eq!(last_state, Some(StateId::Idle));
}

#[test]
fn shutdown_after_capture_skips_network() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![reply("Recyclable")]);
    rig.log
        .shutdown_when(&rig.shutdown, |c| matches!(c, Call::Capture));
    rig.controller.run(&rig.shutdown);

    assert_eq!(rig.log.count(|c| matches!(c, Call::HttpPost { .. })), 0);
    assert!(rig.log.rotations().is_empty());
    assert_eq!(rig.log.actions().last(), Some(&Call::ReleaseAll));
    assert!(
        rig.events()
            .contains(&AppEvent::ShutdownRequested { state: StateId::Classifying })
    );
}

#[test]
fn intake_sequence_is_not_interrupted() {
    let mut rig = Rig::new(SorterConfig::default(), &[false, true], vec![], vec![]);
    rig.log.shutdown_when(&rig.shutdown, |c| {
        matches!(c, Call::SetPair { pair: GatePair::Intake, first, .. } if *first == 135.0)
    });
    rig.controller.run(&rig.shutdown);

    let actions = rig.log.actions();
    let open = actions
        .iter()
        .position(|c| *c == set_pair(GatePair::Intake, 135.0, 49.0))
        .unwrap();
    assert_eq!(actions[open + 1], set_pair(GatePair::Intake, 4.0, 180.0));
    assert_eq!(actions[open + 2], Call::FillLight(Rgb::WHITE));
    assert_eq!(rig.log.count(|c| matches!(c, Call::Capture)), 0);
    assert_eq!(actions.last(), Some(&Call::ReleaseAll));
}

#[test]
fn run_processes_cycles_until_stopped() {
    let mut rig = Rig::new(
        SorterConfig::default().scaled(0.0),
        &[false, true, false, true],
        vec![],
        vec![reply("Recyclable"), reply("Organic")],
    );
    // Stop while the second cycle is showing its category.
    rig.log.shutdown_when(&rig.shutdown, |c| {
        matches!(c, Call::PutStr(s) if s == "Category: Organic")
    });
    let cycles = rig.controller.run(&rig.shutdown);

    assert_eq!(cycles, 2);
    assert_eq!(rig.log.rotations(), vec![600, -600]);
    let outcomes: Vec<CycleOutcome> = rig
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::CycleCompleted(r) => Some(r.outcome),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, vec![CycleOutcome::Sorted, CycleOutcome::Cancelled]);
    assert_eq!(rig.log.actions().last(), Some(&Call::ReleaseAll));
}
