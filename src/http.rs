//! Blocking HTTP client.
//!
//! Wraps an async `reqwest` client in a private tokio runtime so the rest of
//! the crate can stay synchronous.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Response status and body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

pub struct HttpClient {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or the TLS backend cannot be set up.
    pub fn new(timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catadm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { runtime, client })
    }

    /// POST `body` to `url`, blocking until the full response is read.
    ///
    /// Non-2xx statuses are returned, not treated as errors.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, timeout, or an unreadable body.
    pub fn post(&self, url: &str, body: String, content_type: &str) -> Result<HttpResponse> {
        self.runtime.block_on(async {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await
                .map_err(|e| Error::Http(format!("Request to {url} failed: {e}")))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| Error::Http(format!("Failed to read response from {url}: {e}")))?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost is reserved (discard) and normally closed.
        let err = client
            .post("http://127.0.0.1:9/csw", "<x/>".into(), "application/xml")
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let bad = HttpResponse { status: 500, body: String::new() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
