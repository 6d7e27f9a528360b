// crates/formsmith-core/src/interfaces/mod.rs
// ============================================================================
// Module: formsmith Interfaces
// Description: Backend-agnostic interfaces for form storage and submission.
// Purpose: Define the seams the authoring runtime uses to reach I/O.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime never touches a database or the network directly. Saved form
//! libraries go through [`FormStore`] and previewed submissions go through
//! [`SubmissionTransport`]. Implementations must fail closed on missing or
//! invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::FormDefinition;
use crate::core::HttpMethod;

// ============================================================================
// SECTION: Form Store
// ============================================================================

/// Form store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("form store io error: {0}")]
    Io(String),
    /// Stored data fails integrity checks.
    #[error("form store corruption: {0}")]
    Corrupt(String),
    /// Stored data version is incompatible.
    #[error("form store version mismatch: {0}")]
    VersionMismatch(String),
    /// Data is invalid or exceeds limits.
    #[error("form store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("form store error: {0}")]
    Store(String),
}

/// Key-value persistence for saved form lists.
pub trait FormStore {
    /// Loads the form list stored under `key`; `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, key: &str) -> Result<Option<Vec<FormDefinition>>, StoreError>;

    /// Replaces the form list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, key: &str, forms: &[FormDefinition]) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Submission Transport
// ============================================================================

/// Fully resolved submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Target URL, including the query string for GET submissions.
    pub endpoint: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Request headers, `Content-Type` included.
    pub headers: BTreeMap<String, String>,
    /// JSON body; absent for GET.
    pub body: Option<String>,
}

/// Response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl SubmissionResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint URL is invalid or uses an unsupported scheme.
    #[error("invalid submission endpoint: {0}")]
    InvalidEndpoint(String),
    /// Response exceeded the configured size limit.
    #[error("submission response exceeds size limit ({actual} > {limit})")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
        /// Observed size in bytes.
        actual: usize,
    },
    /// Request could not be completed.
    #[error("submission transport error: {0}")]
    Transport(String),
}

/// Sends a resolved submission request.
pub trait SubmissionTransport {
    /// Sends the request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request cannot be completed.
    fn send(&self, request: &SubmissionRequest) -> Result<SubmissionResponse, TransportError>;
}
