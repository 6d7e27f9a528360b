// crates/formsmith-core/src/runtime/preview.rs
// ============================================================================
// Module: formsmith Form Preview
// Description: In-process validation and submission of form values.
// Purpose: Exercise a form definition exactly as generated artifacts would.
// Dependencies: crate::{core, interfaces}, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! [`FormPreview`] applies the validation codec to a map of submitted values
//! keyed by field key, builds the payload in field order, and hands one
//! request to a [`SubmissionTransport`] when the form has an endpoint. The
//! request shape matches what the generated client runtime sends: merged
//! headers with a forced JSON content type, a JSON body for body-carrying
//! verbs, and a query string for GET.
//!
//! Submission is attempted once; there is no retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::core::FieldKey;
use crate::core::FormDefinition;
use crate::core::FormError;
use crate::core::ValidationDescriptor;
use crate::core::ValidationIssue;
use crate::interfaces::SubmissionRequest;
use crate::interfaces::SubmissionResponse;
use crate::interfaces::SubmissionTransport;
use crate::interfaces::TransportError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validation failure for one field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{label}: {issue}")]
pub struct FieldError {
    /// Field key.
    pub key: FieldKey,
    /// Field label.
    pub label: String,
    /// Failed rule.
    pub issue: ValidationIssue,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Form has no endpoint; the payload is returned to the caller.
    Local(Map<String, Value>),
    /// Payload was delivered and accepted.
    Sent {
        /// Submitted payload.
        payload: Map<String, Value>,
        /// Endpoint response.
        response: SubmissionResponse,
    },
}

/// Submission failures.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Values failed validation; nothing was sent.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),
    /// Transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Endpoint answered with a non-2xx status.
    #[error("submission rejected with status {}", .0.status)]
    Rejected(SubmissionResponse),
    /// Payload could not be encoded.
    #[error("failed to encode submission payload: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Form Preview
// ============================================================================

/// Validation and submission over a validated form definition.
#[derive(Debug, Clone)]
pub struct FormPreview<'a> {
    /// Form being previewed.
    form: &'a FormDefinition,
    /// Descriptor per field, in field order.
    descriptors: Vec<ValidationDescriptor>,
}

impl<'a> FormPreview<'a> {
    /// Creates a preview for a form.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] when the form is structurally invalid.
    pub fn new(form: &'a FormDefinition) -> Result<Self, FormError> {
        form.validate()?;
        let descriptors = form.fields.iter().map(ValidationDescriptor::from_field).collect();
        Ok(Self {
            form,
            descriptors,
        })
    }

    /// Validates values and returns the payload in field order.
    ///
    /// Values for unknown keys are ignored; absent values are omitted.
    ///
    /// # Errors
    ///
    /// Returns every failing field, in field order.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<Map<String, Value>, Vec<FieldError>> {
        let mut payload = Map::new();
        let mut errors = Vec::new();
        for (field, descriptor) in self.form.fields.iter().zip(&self.descriptors) {
            let value = values.get(field.key.as_str()).unwrap_or(&Value::Null);
            if let Err(issue) = descriptor.check(value) {
                errors.push(FieldError {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    issue,
                });
                continue;
            }
            if !value.is_null() {
                payload.insert(field.key.to_string(), value.clone());
            }
        }
        if errors.is_empty() { Ok(payload) } else { Err(errors) }
    }

    /// Builds the request the generated client would send for a payload.
    ///
    /// Returns `None` when the form has no endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Encode`] when the payload cannot be serialized.
    pub fn request_for(&self, payload: &Map<String, Value>) -> Result<Option<SubmissionRequest>, SubmitError> {
        let Some(endpoint) = self.form.endpoint.as_deref().filter(|endpoint| !endpoint.is_empty())
        else {
            return Ok(None);
        };
        let headers = self.form.submission_headers();
        if self.form.method.carries_body() {
            let body = serde_json::to_string(payload).map_err(|err| SubmitError::Encode(err.to_string()))?;
            return Ok(Some(SubmissionRequest {
                endpoint: endpoint.to_string(),
                method: self.form.method,
                headers,
                body: Some(body),
            }));
        }
        let query = query_string(payload);
        let endpoint = if query.is_empty() {
            endpoint.to_string()
        } else if endpoint.contains('?') {
            format!("{endpoint}&{query}")
        } else {
            format!("{endpoint}?{query}")
        };
        Ok(Some(SubmissionRequest {
            endpoint,
            method: self.form.method,
            headers,
            body: None,
        }))
    }

    /// Validates and, when the form has an endpoint, submits once.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] for validation, transport, or status failures.
    pub fn submit<T>(&self, transport: &T, values: &Map<String, Value>) -> Result<SubmitOutcome, SubmitError>
    where
        T: SubmissionTransport + ?Sized,
    {
        let payload = self.validate(values).map_err(SubmitError::Validation)?;
        let Some(request) = self.request_for(&payload)? else {
            return Ok(SubmitOutcome::Local(payload));
        };
        let response = transport.send(&request)?;
        if !response.is_success() {
            return Err(SubmitError::Rejected(response));
        }
        Ok(SubmitOutcome::Sent {
            payload,
            response,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Encodes a payload as `application/x-www-form-urlencoded`; arrays repeat the key.
fn query_string(payload: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        match value {
            Value::Array(items) => {
                for item in items {
                    serializer.append_pair(key, &scalar_text(item));
                }
            }
            other => {
                serializer.append_pair(key, &scalar_text(other));
            }
        }
    }
    serializer.finish()
}

/// Renders a JSON scalar the way `String(value)` does in the browser.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
