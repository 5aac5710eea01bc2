//! Unified error types for the WasteSort firmware.
//!
//! One top-level `Error` enum that every subsystem converts into, so the
//! boot path in `main` can funnel failures through a single type.  All
//! variants are `Copy`: they travel through events and cycle reports
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The camera produced no usable frame.
    Capture(CaptureError),
    /// The remote classification call failed.
    Classify(ClassifyError),
    /// An actuator command failed at the driver level.
    Actuator(ActuatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Classify(e) => write!(f, "classify: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Capture errors
// ---------------------------------------------------------------------------

/// Reasons the capture service yielded no artifact.  The controller treats
/// every variant the same way ("no artifact"); the distinction is for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// Camera not initialised or busy.
    HardwareUnavailable,
    /// The driver could not hand out a frame buffer.
    BufferUnavailable,
    /// A frame buffer was returned but held no data.
    EmptyFrame,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareUnavailable => write!(f, "camera unavailable"),
            Self::BufferUnavailable => write!(f, "frame buffer unavailable"),
            Self::EmptyFrame => write!(f, "empty frame"),
        }
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// Connection, TLS, write or read failure (including transport timeout).
    Transport,
    /// The endpoint answered with a non-success status code.
    HttpStatus(u16),
    /// The body was not the expected JSON document.
    MalformedResponse,
    /// Well-formed JSON without a candidate text field.
    MissingCategory,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failure"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::MalformedResponse => write!(f, "malformed response body"),
            Self::MissingCategory => write!(f, "response has no category text"),
        }
    }
}

impl From<ClassifyError> for Error {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Driver-level write failures.  Open-loop control means these are only
/// ever logged; no recovery path exists above the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
    /// I²C / RMT bus transfer failed.
    BusWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::BusWriteFailed => write!(f, "bus write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}
