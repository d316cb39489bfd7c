//! Outbound transport for the upload request.

use crate::errors::{AppError, AppResult};
use crate::sync::payload::{FORM_CONTENT_TYPE, preview};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can POST a form body and hand back the raw response.
///
/// Only failures to complete the exchange are errors here; HTTP status
/// handling belongs to the caller.
pub trait Transport {
    fn post_form(&mut self, url: &str, body: String) -> AppResult<TransportResponse>;
}

/// Blocking `reqwest` transport with a fixed per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rangelog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("network unreachable ({err})")
    } else {
        err.to_string()
    }
}

impl Transport for HttpTransport {
    fn post_form(&mut self, url: &str, body: String) -> AppResult<TransportResponse> {
        debug!(url, bytes = body.len(), "posting sync batch");

        let res = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|e| AppError::transport(None, describe(&e)))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .map_err(|e| AppError::transport(Some(status), describe(&e)))?;

        debug!(status, body = %preview(&body), "collector responded");
        Ok(TransportResponse { status, body })
    }
}
