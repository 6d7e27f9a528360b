// crates/formsmith-submit/src/lib.rs
// ============================================================================
// Module: formsmith HTTP Submission Transport
// Description: Blocking HTTP implementation of SubmissionTransport.
// Purpose: Send preview submissions to the form's endpoint.
// Dependencies: formsmith-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] sends one [`SubmissionRequest`] per call. It does not
//! retry and does not follow redirects.
//! Invariants:
//! - Only `https://` endpoints are accepted unless `allow_http` is set.
//! - Redirects are rejected.
//! - Response bodies are capped at [`HttpTransportConfig::max_response_bytes`].
//! - Non-2xx responses are returned, not raised; callers decide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use formsmith_core::HttpMethod;
use formsmith_core::SubmissionRequest;
use formsmith_core::SubmissionResponse;
use formsmith_core::SubmissionTransport;
use formsmith_core::TransportError;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default response size cap in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Hard upper bound for the response size cap.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// HTTP transport settings.
///
/// # Invariants
/// - `timeout_ms` is greater than zero.
/// - `max_response_bytes` is in `1..=MAX_RESPONSE_BYTES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpTransportConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// Whether plain `http://` endpoints are allowed.
    pub allow_http: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            allow_http: false,
        }
    }
}

impl HttpTransportConfig {
    /// Validates the configured limits.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(format!(
                "max_response_bytes out of range: {} (max {MAX_RESPONSE_BYTES})",
                self.max_response_bytes
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking HTTP submission transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client with redirects disabled.
    client: Client,
    /// Transport settings.
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Builds a transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Builds a transport with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the settings are invalid or the HTTP
    /// client cannot be constructed.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::Transport)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            config,
        })
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Parses the endpoint and enforces the scheme policy.
    fn parse_endpoint(&self, endpoint: &str) -> Result<Url, TransportError> {
        let url = Url::parse(endpoint).map_err(|err| TransportError::InvalidEndpoint(err.to_string()))?;
        match url.scheme() {
            "https" => Ok(url),
            "http" if self.config.allow_http => Ok(url),
            "http" => Err(TransportError::InvalidEndpoint(
                "plain http endpoints are disabled".to_string(),
            )),
            scheme => Err(TransportError::InvalidEndpoint(format!("unsupported scheme: {scheme}"))),
        }
    }
}

impl SubmissionTransport for HttpTransport {
    fn send(&self, request: &SubmissionRequest) -> Result<SubmissionResponse, TransportError> {
        let url = self.parse_endpoint(&request.endpoint)?;
        let mut builder = self.client.request(method_for(request.method), url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let response = builder.send().map_err(|err| TransportError::Transport(err.to_string()))?;
        if response.url() != &url {
            return Err(TransportError::Transport(format!(
                "redirected from {url} to {}",
                response.url()
            )));
        }
        let status = response.status().as_u16();
        let limit = self.config.max_response_bytes;
        if let Some(length) = response.content_length()
            && length > u64::try_from(limit).unwrap_or(u64::MAX)
        {
            return Err(TransportError::TooLarge {
                limit,
                actual: usize::try_from(length).unwrap_or(usize::MAX),
            });
        }
        let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
        let mut bytes = Vec::new();
        response
            .take(cap)
            .read_to_end(&mut bytes)
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        if bytes.len() > limit {
            return Err(TransportError::TooLarge {
                limit,
                actual: bytes.len(),
            });
        }
        Ok(SubmissionResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Maps a form method onto the HTTP client's method type.
const fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
