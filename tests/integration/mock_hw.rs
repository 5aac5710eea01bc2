//! Mock adapters for integration tests.
//!
//! Every mock records into one shared, ordered call log so tests can
//! assert on the interleaving of display, actuator, capture, network and
//! delay calls across adapters without touching real peripherals.
//!
//! The embedded-hal level mocks at the bottom back the real drivers when
//! a test wants to run the `HardwareAdapter` itself.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use wastesort::app::events::AppEvent;
use wastesort::app::model::{GatePair, ImageArtifact, PairPosition, Rgb};
use wastesort::app::ports::{
    ActuatorPort, CapturePort, DisplayPort, EventSink, SensorPort,
};
use wastesort::app::service::SortController;
use wastesort::app::shutdown::ShutdownToken;
use wastesort::classifier::{GeminiClassifier, HttpResponse, HttpTransport};
use wastesort::config::SorterConfig;
use wastesort::drivers::light_strip::PixelBus;
use wastesort::error::{ActuatorError, CaptureError, ClassifyError};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetPair { pair: GatePair, first: f32, second: f32 },
    Rotate(i32),
    FillLight(Rgb),
    ReleaseAll,
    Clear,
    PutStr(String),
    Capture,
    HttpPost { url: String },
    Delay(u32),
}

pub struct Recorder {
    calls: Vec<Call>,
    trigger: Option<(ShutdownToken, fn(&Call) -> bool)>,
}

/// Shared, ordered call log.
#[derive(Clone)]
pub struct CallLog(Rc<RefCell<Recorder>>);

impl CallLog {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Recorder {
            calls: Vec::new(),
            trigger: None,
        })))
    }

    pub fn record(&self, call: Call) {
        let mut r = self.0.borrow_mut();
        if let Some((token, matches)) = &r.trigger {
            if matches(&call) {
                token.request();
            }
        }
        r.calls.push(call);
    }

    /// Request `token` as soon as a call matching `matches` is recorded.
    pub fn shutdown_when(&self, token: &ShutdownToken, matches: fn(&Call) -> bool) {
        self.0.borrow_mut().trigger = Some((token.clone(), matches));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Everything except delays.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Delay(_)))
            .collect()
    }

    pub fn rotations(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Rotate(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: fn(&Call) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn last_text(&self) -> Option<String> {
        self.0.borrow().calls.iter().rev().find_map(|c| match c {
            Call::PutStr(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }
}

impl Default for CallLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_pair(pair: GatePair, first: f32, second: f32) -> Call {
    Call::SetPair {
        pair,
        first,
        second,
    }
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor + actuators + display.  Presence readings come from a script;
/// once it runs out the sensor reads clear.
pub struct MockHardware {
    log: CallLog,
    presence: VecDeque<bool>,
    pub polls: u32,
}

impl MockHardware {
    pub fn new(log: CallLog, presence: &[bool]) -> Self {
        Self {
            log,
            presence: presence.iter().copied().collect(),
            polls: 0,
        }
    }
}

impl SensorPort for MockHardware {
    fn is_present(&mut self) -> bool {
        self.polls += 1;
        self.presence.pop_front().unwrap_or(false)
    }
}

impl ActuatorPort for MockHardware {
    fn set_pair(&mut self, pair: GatePair, position: PairPosition) {
        self.log.record(set_pair(pair, position.first, position.second));
    }

    fn rotate(&mut self, steps: i32) {
        self.log.record(Call::Rotate(steps));
    }

    fn fill_light(&mut self, colour: Rgb) {
        self.log.record(Call::FillLight(colour));
    }

    fn release_all(&mut self) {
        self.log.record(Call::ReleaseAll);
    }
}

impl DisplayPort for MockHardware {
    fn clear(&mut self) {
        self.log.record(Call::Clear);
    }

    fn put_str(&mut self, text: &str) {
        self.log.record(Call::PutStr(text.to_owned()));
    }
}

// ── MockCamera ────────────────────────────────────────────────

pub const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xD9];

/// Scripted capture results; a JPEG stub once the script runs out.
pub struct MockCamera {
    log: CallLog,
    results: VecDeque<Result<Vec<u8>, CaptureError>>,
}

impl MockCamera {
    pub fn new(log: CallLog, results: Vec<Result<Vec<u8>, CaptureError>>) -> Self {
        Self {
            log,
            results: results.into(),
        }
    }
}

impl CapturePort for MockCamera {
    fn capture(&mut self) -> Result<ImageArtifact, CaptureError> {
        self.log.record(Call::Capture);
        self.results
            .pop_front()
            .unwrap_or_else(|| Ok(JPEG.to_vec()))
            .map(ImageArtifact::new)
    }
}

// ── MockTransport ─────────────────────────────────────────────

/// Scripted HTTP replies; a transport error once the script runs out.
pub struct MockTransport {
    log: CallLog,
    replies: VecDeque<Result<HttpResponse, ClassifyError>>,
    pub bodies: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new(log: CallLog, replies: Vec<Result<HttpResponse, ClassifyError>>) -> Self {
        Self {
            log,
            replies: replies.into(),
            bodies: Vec::new(),
        }
    }
}

impl HttpTransport for MockTransport {
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassifyError> {
        self.log.record(Call::HttpPost {
            url: url.to_owned(),
        });
        self.bodies.push(body.to_vec());
        self.replies
            .pop_front()
            .unwrap_or(Err(ClassifyError::Transport))
    }
}

/// A 200 reply whose first candidate says `text`.
pub fn reply(text: &str) -> Result<HttpResponse, ClassifyError> {
    let body = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    });
    Ok(HttpResponse {
        status: 200,
        body: serde_json::to_vec(&body).unwrap(),
    })
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records millisecond holds without sleeping.
pub struct MockDelay {
    log: CallLog,
}

impl MockDelay {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.log.record(Call::Delay(ms));
    }
}

/// Delay that returns immediately, for drivers.
#[derive(Clone, Copy, Default)]
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Controller rig ────────────────────────────────────────────

pub const TEST_URL: &str = "https://classifier.test/v1/generate?key=test";

pub type TestController = SortController<
    MockHardware,
    MockCamera,
    GeminiClassifier<MockTransport>,
    MockDelay,
    RecordingSink,
>;

pub struct Rig {
    pub log: CallLog,
    pub shutdown: ShutdownToken,
    pub controller: TestController,
}

impl Rig {
    pub fn new(
        config: SorterConfig,
        presence: &[bool],
        captures: Vec<Result<Vec<u8>, CaptureError>>,
        replies: Vec<Result<HttpResponse, ClassifyError>>,
    ) -> Self {
        let log = CallLog::new();
        let classifier = GeminiClassifier::new(
            MockTransport::new(log.clone(), replies),
            TEST_URL.into(),
            config.classifier_prompt.clone(),
        );
        let controller = SortController::new(
            config,
            MockHardware::new(log.clone(), presence),
            MockCamera::new(log.clone(), captures),
            classifier,
            MockDelay::new(log.clone()),
            RecordingSink::default(),
        );
        Self {
            log,
            shutdown: ShutdownToken::new(),
            controller,
        }
    }

    /// Default config, one successful capture, one reply.
    pub fn with_reply(text: &str) -> Self {
        Self::new(SorterConfig::default(), &[], vec![], vec![reply(text)])
    }

    pub fn events(&self) -> &[AppEvent] {
        &self.controller.sink().events
    }
}

// ── embedded-hal level mocks ──────────────────────────────────

/// PWM channel with a 10-bit range that remembers its duty.
#[derive(Clone)]
pub struct MockPwm {
    pub duty: Rc<RefCell<u16>>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self {
            duty: Rc::new(RefCell::new(0)),
        }
    }
}

impl embedded_hal::pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        *self.duty.borrow_mut() = duty;
        Ok(())
    }
}

/// Output pin that remembers its level.
#[derive(Clone)]
pub struct MockPin {
    pub high: Rc<RefCell<bool>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            high: Rc::new(RefCell::new(false)),
        }
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        *self.high.borrow_mut() = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        *self.high.borrow_mut() = true;
        Ok(())
    }
}

/// Input pin reading a shared level; `true` = electrically low.
#[derive(Clone)]
pub struct MockInput {
    pub low: Rc<RefCell<bool>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self {
            low: Rc::new(RefCell::new(false)),
        }
    }
}

impl embedded_hal::digital::ErrorType for MockInput {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!*self.low.borrow())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(*self.low.borrow())
    }
}

/// Pixel bus keeping the last frame.
#[derive(Clone)]
pub struct MockPixelBus {
    pub last_frame: Rc<RefCell<Vec<u8>>>,
}

impl MockPixelBus {
    pub fn new() -> Self {
        Self {
            last_frame: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl PixelBus for MockPixelBus {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), ActuatorError> {
        *self.last_frame.borrow_mut() = frame.to_vec();
        Ok(())
    }
}

/// I²C bus that accepts every write.
#[derive(Default)]
pub struct MockI2c {
    pub writes: usize,
}

impl embedded_hal::i2c::ErrorType for MockI2c {
    type Error = embedded_hal::i2c::ErrorKind;
}

impl embedded_hal::i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [embedded_hal::i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.writes += operations.len();
        Ok(())
    }
}
