//! ESP-IDF HTTPS transport for the classifier.
//!
//! One blocking POST per call over `EspHttpConnection`, TLS verified
//! against the bundled CA store.  The configured timeout bounds the whole
//! exchange; nothing is retried here.

use core::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::debug;

use crate::classifier::{HttpResponse, HttpTransport};
use crate::error::ClassifyError;

/// Upper bound on the response body we are willing to buffer.
const MAX_BODY_BYTES: usize = 16 * 1024;

pub struct EspHttpTransport {
    timeout: Duration,
}

impl EspHttpTransport {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout: Duration::from_millis(u64::from(timeout_ms)),
        }
    }

    fn connect(&self) -> Result<Client<EspHttpConnection>, ClassifyError> {
        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(self.timeout),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            buffer_size_tx: Some(4096),
            ..Default::default()
        })
        .map_err(|_| ClassifyError::Transport)?;
        Ok(Client::wrap(connection))
    }
}

impl HttpTransport for EspHttpTransport {
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassifyError> {
        let mut client = self.connect()?;

        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];
        let mut request = client
            .post(url, &headers)
            .map_err(|_| ClassifyError::Transport)?;
        request
            .write_all(body)
            .map_err(|_| ClassifyError::Transport)?;
        request.flush().map_err(|_| ClassifyError::Transport)?;

        let mut response = request.submit().map_err(|_| ClassifyError::Transport)?;
        let status = response.status();

        let mut buf = [0u8; 1024];
        let mut body = Vec::new();
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|_| ClassifyError::Transport)?;
            if n == 0 {
                break;
            }
            if body.len() + n > MAX_BODY_BYTES {
                return Err(ClassifyError::MalformedResponse);
            }
            body.extend_from_slice(&buf[..n]);
        }
        debug!("http: status {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}
