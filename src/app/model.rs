//! Domain value types shared by the controller, ports, and adapters.

use core::fmt;

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// WasteCategory
// ───────────────────────────────────────────────────────────────

/// Classification outcome for one cycle.  Fixed once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteCategory {
    Recyclable,
    NonRecyclable,
    Organic,
    Unknown,
}

impl WasteCategory {
    /// The exact tokens the classification prompt asks the model to answer
    /// with.  Matching is case-sensitive.
    pub const TOKENS: [(&'static str, WasteCategory); 3] = [
        ("Recyclable", WasteCategory::Recyclable),
        ("Non-recyclable", WasteCategory::NonRecyclable),
        ("Organic", WasteCategory::Organic),
    ];

    /// Map a textual response to a category.
    ///
    /// Leading/trailing ASCII whitespace (the model usually appends a
    /// newline) is ignored; everything else must match a token exactly.
    /// Near misses such as `"recyclable"` or `"Plastic"` resolve to
    /// [`WasteCategory::Unknown`].
    pub fn from_response(text: &str) -> Self {
        let token = text.trim_matches(|c: char| c.is_ascii_whitespace());
        Self::TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map_or(Self::Unknown, |&(_, c)| c)
    }

    /// Label shown on the status display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Recyclable => "Recyclable",
            Self::NonRecyclable => "Non-recyclable",
            Self::Organic => "Organic",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ───────────────────────────────────────────────────────────────
// ImageArtifact
// ───────────────────────────────────────────────────────────────

/// A captured still.  Produced once per cycle and moved into the
/// classifier, which drops it after encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    bytes: Vec<u8>,
}

impl ImageArtifact {
    /// Content type of every artifact the capture service produces.
    pub const MIME_TYPE: &'static str = "image/jpeg";

    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("mime_type", &Self::MIME_TYPE)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator values
// ───────────────────────────────────────────────────────────────

/// The two servo pairs on the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatePair {
    /// Front gate that funnels the object into the camera chamber.
    Intake,
    /// Bottom gate that releases the object onto the chute.
    Drop,
}

/// Angles (degrees) for both members of a servo pair.  Always applied
/// together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairPosition {
    pub first: f32,
    pub second: f32,
}

impl PairPosition {
    pub const fn new(first: f32, second: f32) -> Self {
        Self { first, second }
    }
}

/// Conveyor rotation sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDirection {
    Forward,
    Reverse,
}

impl RotationDirection {
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Signed step count for a move of `steps` in this direction.
    pub fn signed(self, steps: u32) -> i32 {
        let steps = steps.min(i32::MAX as u32) as i32;
        match self {
            Self::Forward => steps,
            Self::Reverse => -steps,
        }
    }
}

/// 8-bit RGB colour for the indicator strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
