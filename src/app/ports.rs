//! Port traits — the hexagonal boundary between the sort controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SortController (domain)
//! ```
//!
//! Driven adapters (sensor, actuators, display, camera, classifier, event
//! sinks) implement these traits.  The
//! [`SortController`](super::service::SortController) owns one of each,
//! injected at construction, so the domain core never touches hardware
//! directly and every cycle can be replayed against mocks.
//!
//! ## Error policy
//!
//! - Sensor, actuator and display ports are infallible at this boundary.
//!   Control is open-loop; adapters log driver errors and carry on.
//! - Capture is the only port whose failure changes the cycle.
//! - Classification always yields a category; failures become
//!   [`WasteCategory::Unknown`].

use super::events::AppEvent;
use super::model::{GatePair, ImageArtifact, PairPosition, Rgb, WasteCategory};
use crate::error::CaptureError;

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Binary presence detector, sampled by polling.
pub trait SensorPort {
    /// `true` when an object sits in front of the sensor.
    fn is_present(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Idempotent motion commands.  Every call blocks until the command has
/// been issued; mechanical travel time is modelled by the controller's
/// explicit holds.
pub trait ActuatorPort {
    /// Move both servos of `pair` to `position`.  Angles outside
    /// [0, 180] are clamped by the implementation.
    fn set_pair(&mut self, pair: GatePair, position: PairPosition);

    /// Rotate the conveyor.  Sign is direction, magnitude is step count.
    fn rotate(&mut self, steps: i32);

    /// Fill the indicator strip with one colour; `Rgb::OFF` extinguishes it.
    fn fill_light(&mut self, colour: Rgb);

    /// De-energise every actuator output (servo PWM, stepper coils, light).
    fn release_all(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → operator)
// ───────────────────────────────────────────────────────────────

/// Short status text.  Best-effort; never blocks the cycle on failure.
pub trait DisplayPort {
    fn clear(&mut self);
    fn put_str(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Capture port
// ───────────────────────────────────────────────────────────────

/// Produces one still per call.
pub trait CapturePort {
    fn capture(&mut self) -> Result<ImageArtifact, CaptureError>;
}

// ───────────────────────────────────────────────────────────────
// Classifier port
// ───────────────────────────────────────────────────────────────

/// Remote classification.  Takes the artifact by value: it is consumed
/// exactly once.  Must not block beyond the transport's own timeout.
pub trait ClassifierPort {
    fn classify(&mut self, artifact: ImageArtifact) -> WasteCategory;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
