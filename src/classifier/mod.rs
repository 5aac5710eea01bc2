//! Remote waste classifier (Gemini `generateContent`).
//!
//! One request per artifact:
//!
//! ```text
//! { "contents": [ { "parts": [
//!     { "text": "<prompt>" },
//!     { "inline_data": { "mime_type": "image/jpeg", "data": "<base64>" } }
//! ] } ] }
//! ```
//!
//! The answer is read from `candidates[0].content.parts[0].text` and
//! mapped through [`WasteCategory::from_response`].  Nothing is retried;
//! every failure ends as `Unknown` at the port boundary.

pub mod transport;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::model::{ImageArtifact, WasteCategory};
use crate::app::ports::ClassifierPort;
use crate::error::ClassifyError;

pub use transport::{HttpResponse, HttpTransport, NullTransport};

// ── Wire format ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Serialise the request body for `artifact`.
pub fn build_request(prompt: &str, artifact: &ImageArtifact) -> Result<Vec<u8>, ClassifyError> {
    let request = GenerateRequest {
        contents: [Content {
            parts: [
                Part::Text { text: prompt },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: artifact.mime_type(),
                        data: STANDARD.encode(artifact.bytes()),
                    },
                },
            ],
        }],
    };
    serde_json::to_vec(&request).map_err(|_| ClassifyError::Transport)
}

/// Pull the first candidate's text out of a response body.
pub fn candidate_text(body: &[u8]) -> Result<String, ClassifyError> {
    let response: GenerateResponse =
        serde_json::from_slice(body).map_err(|_| ClassifyError::MalformedResponse)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(ClassifyError::MissingCategory)
}

/// Parse a raw response body all the way to a category.
pub fn parse_response(body: &[u8]) -> Result<WasteCategory, ClassifyError> {
    candidate_text(body).map(|text| WasteCategory::from_response(&text))
}

// ── Client ────────────────────────────────────────────────────

pub struct GeminiClassifier<T> {
    transport: T,
    url: String,
    prompt: String,
    requests: u32,
    last_error: Option<ClassifyError>,
}

impl<T: HttpTransport> GeminiClassifier<T> {
    /// `url` must already carry the API key.
    pub fn new(transport: T, url: String, prompt: String) -> Self {
        Self {
            transport,
            url,
            prompt,
            requests: 0,
            last_error: None,
        }
    }

    /// Classify with the failure reason preserved.
    pub fn classify_detailed(
        &mut self,
        artifact: ImageArtifact,
    ) -> Result<WasteCategory, ClassifyError> {
        let body = build_request(&self.prompt, &artifact)?;
        drop(artifact);

        self.requests = self.requests.wrapping_add(1);
        let response = self.transport.post_json(&self.url, &body)?;
        if !response.is_success() {
            return Err(ClassifyError::HttpStatus(response.status));
        }
        parse_response(&response.body)
    }

    /// Requests issued so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Failure of the most recent classification, if it failed.
    pub fn last_error(&self) -> Option<ClassifyError> {
        self.last_error
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: HttpTransport> ClassifierPort for GeminiClassifier<T> {
    fn classify(&mut self, artifact: ImageArtifact) -> WasteCategory {
        match self.classify_detailed(artifact) {
            Ok(category) => {
                self.last_error = None;
                if category == WasteCategory::Unknown {
                    warn!("classifier: unrecognised answer, using Unknown");
                } else {
                    info!("classifier: {}", category);
                }
                category
            }
            Err(e) => {
                warn!("classifier: {}, using Unknown", e);
                self.last_error = Some(e);
                WasteCategory::Unknown
            }
        }
    }
}
