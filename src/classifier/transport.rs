//! Blocking HTTP transport seam for the classifier.
//!
//! The classifier only ever issues one JSON POST per cycle, so the trait is
//! exactly that one operation.  Timeouts are the transport's business.

use crate::error::ClassifyError;

/// Status line and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpTransport {
    /// POST `body` as `application/json` to `url` and read the full reply.
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassifyError>;
}

/// Transport for builds without a network stack.  Every request fails, so
/// every classification resolves to `Unknown`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl HttpTransport for NullTransport {
    fn post_json(&mut self, _url: &str, _body: &[u8]) -> Result<HttpResponse, ClassifyError> {
        Err(ClassifyError::Transport)
    }
}
