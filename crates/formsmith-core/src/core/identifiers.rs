// crates/formsmith-core/src/core/identifiers.rs
// ============================================================================
// Module: formsmith Identifiers
// Description: Opaque identifiers for forms and fields.
// Purpose: Provide strongly typed, serializable IDs with one generation strategy.
// Dependencies: rand, serde, uuid
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings. Generated identifiers use a single random
//! strategy: form ids are random version-4 UUID strings, field ids pair a
//! process-wide counter with a random suffix, and field keys are
//! `"{type}_{suffix}"` tokens with a random base-36 suffix. Deserialized
//! identifiers are accepted as-is; emptiness and uniqueness are checked by
//! [`crate::FormDefinition::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Alphabet used for random key suffixes.
const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Length of the random suffix appended to field keys.
const KEY_SUFFIX_LEN: usize = 8;

/// Process-wide counter backing [`FieldId::generate`].
static FIELD_COUNTER: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Stable identifier of a saved form definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(String);

impl FormId {
    /// Creates a form identifier from an existing value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random version-4 UUID string.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for FormId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FormId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Process-unique identifier of a field, assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Creates a field identifier from an existing value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates an identifier that is never reused within this process.
    #[must_use]
    pub fn generate() -> Self {
        let sequence = FIELD_COUNTER.fetch_add(1, Ordering::Relaxed);
        let salt: u32 = rand::random();
        Self(format!("field-{sequence:x}-{salt:08x}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Human-debuggable field token used as the submission payload key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    /// Creates a field key from an existing value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a `"{type}_{suffix}"` key with a random base-36 suffix.
    #[must_use]
    pub fn generate(type_tag: &str) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0 .. KEY_SUFFIX_LEN)
            .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0 .. SUFFIX_ALPHABET.len())]))
            .collect();
        Self(format!("{type_tag}_{suffix}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
