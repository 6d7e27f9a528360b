// crates/formsmith-core/src/core/form.rs
// ============================================================================
// Module: formsmith Form Definition
// Description: Complete description of one form and its submission settings.
// Purpose: Hold ordered fields plus endpoint, method, and headers.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`FormDefinition`] is a pure value: ordered fields plus submission
//! settings. [`FormDefinition::validate`] enforces the structural invariants
//! that exporters and the preview rely on; it fails fast with a descriptive
//! [`FormError`] rather than letting a malformed definition produce a
//! partially formed artifact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::field::Field;
use crate::core::field::FieldType;
use crate::core::identifiers::FormId;
use crate::core::pattern::compile_pattern;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header forced onto every submission request.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// Media type forced onto every submission request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: HTTP Method
// ============================================================================

/// HTTP verb used for form submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET; values travel as a query string.
    Get,
    /// POST (default).
    #[default]
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns true when the request carries a JSON body.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(FormError::InvalidMethod(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural violations of a form definition.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A field has an empty identifier.
    #[error("field at position {0} has an empty id")]
    EmptyFieldId(usize),
    /// A field has an empty key.
    #[error("field at position {0} has an empty key")]
    EmptyFieldKey(usize),
    /// Two fields share a key.
    #[error("duplicate field key: {0}")]
    DuplicateKey(String),
    /// Two fields share an identifier.
    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),
    /// A field has an empty type tag.
    #[error("field {0} has an empty type")]
    MissingType(String),
    /// A custom type reuses a built-in tag.
    #[error("field {key} uses reserved type tag {tag}")]
    ReservedType {
        /// Field key.
        key: String,
        /// Offending tag.
        tag: String,
    },
    /// A choice field has no options.
    #[error("field {0} requires at least one option")]
    MissingOptions(String),
    /// Validation bounds are not finite or are inverted.
    #[error("field {key} has invalid bounds: {reason}")]
    InvalidBounds {
        /// Field key.
        key: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Validation pattern does not compile.
    #[error("field {key} has an invalid pattern: {reason}")]
    InvalidPattern {
        /// Field key.
        key: String,
        /// Compiler error.
        reason: String,
    },
    /// Header name or value cannot be sent verbatim.
    #[error("invalid header {0}")]
    InvalidHeader(String),
    /// Unknown HTTP verb.
    #[error("invalid http method: {0}")]
    InvalidMethod(String),
}

// ============================================================================
// SECTION: Form Definition
// ============================================================================

/// Complete, serializable description of one form.
///
/// # Invariants
/// - `fields` order is significant and preserved by every consumer.
/// - `headers` iterate in sorted order, keeping generated output stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Stable identifier; absent for unsaved forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FormId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Ordered fields.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Submission destination URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Submission HTTP verb.
    #[serde(default)]
    pub method: HttpMethod,
    /// Caller-supplied submission headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl FormDefinition {
    /// Creates an empty, unsaved form with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validates the structural invariants of the definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found, scanning fields in order.
    pub fn validate(&self) -> Result<(), FormError> {
        let mut keys = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.id.as_str().is_empty() {
                return Err(FormError::EmptyFieldId(index));
            }
            if field.key.as_str().is_empty() {
                return Err(FormError::EmptyFieldKey(index));
            }
            if !keys.insert(field.key.as_str()) {
                return Err(FormError::DuplicateKey(field.key.to_string()));
            }
            if !ids.insert(field.id.as_str()) {
                return Err(FormError::DuplicateFieldId(field.id.to_string()));
            }
            validate_field(field)?;
        }
        for (name, value) in &self.headers {
            if !is_header_token(name) || value.contains(['\r', '\n']) {
                return Err(FormError::InvalidHeader(name.clone()));
            }
        }
        Ok(())
    }

    /// Returns the headers sent on submission.
    ///
    /// Any caller-supplied `Content-Type` (matched case-insensitively) is
    /// replaced by `Content-Type: application/json`.
    #[must_use]
    pub fn submission_headers(&self) -> BTreeMap<String, String> {
        let mut headers: BTreeMap<String, String> = self
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.insert(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string());
        headers
    }

    /// Returns the field with the given key.
    #[must_use]
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key.as_str() == key)
    }

    /// Returns the position of the field with the given key.
    #[must_use]
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.key.as_str() == key)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates per-field rules that do not depend on sibling fields.
fn validate_field(field: &Field) -> Result<(), FormError> {
    let key = field.key.as_str();
    if let FieldType::Custom(tag) = &field.field_type {
        if tag.trim().is_empty() {
            return Err(FormError::MissingType(key.to_string()));
        }
        if !matches!(FieldType::parse(tag), FieldType::Custom(_)) {
            return Err(FormError::ReservedType {
                key: key.to_string(),
                tag: tag.clone(),
            });
        }
    }
    if field.field_type.requires_options() && field.options.is_empty() {
        return Err(FormError::MissingOptions(key.to_string()));
    }
    let Some(rules) = &field.validation else {
        return Ok(());
    };
    for bound in [rules.min, rules.max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(FormError::InvalidBounds {
                key: key.to_string(),
                reason: "bounds must be finite".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max)
        && min > max
    {
        return Err(FormError::InvalidBounds {
            key: key.to_string(),
            reason: format!("min {min} exceeds max {max}"),
        });
    }
    if let Some(pattern) = &rules.pattern {
        compile_pattern(pattern).map_err(|err| FormError::InvalidPattern {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
    }
    Ok(())
}

/// Returns true for RFC 9110 header field-name tokens.
fn is_header_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|byte| {
            byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
        })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
