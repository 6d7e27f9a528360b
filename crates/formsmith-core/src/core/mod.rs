// crates/formsmith-core/src/core/mod.rs
// ============================================================================
// Module: formsmith Core Types
// Description: Form definitions, fields, identifiers, and validation rules.
// Purpose: Provide the canonical, serializable form model.
// Dependencies: serde, serde_json, regex, rand
// ============================================================================

//! ## Overview
//! Core types describe one form: its ordered fields, the validation rules per
//! field, and the submission settings. All types are plain values with
//! deterministic serialization; nothing here performs I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod field;
pub mod form;
pub mod hashing;
pub mod identifiers;
pub mod pattern;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use field::Field;
pub use field::FieldType;
pub use field::ValidationRules;
pub use form::CONTENT_TYPE_HEADER;
pub use form::FormDefinition;
pub use form::FormError;
pub use form::HttpMethod;
pub use form::JSON_CONTENT_TYPE;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::FieldId;
pub use identifiers::FieldKey;
pub use identifiers::FormId;
pub use pattern::PatternError;
pub use pattern::compile_pattern;
pub use validation::HtmlAttribute;
pub use validation::Measure;
pub use validation::ValidationDescriptor;
pub use validation::ValidationIssue;
