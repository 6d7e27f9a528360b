// crates/formsmith-export/src/data.rs
// ============================================================================
// Module: formsmith Data Export
// Description: Importable JSON snapshot of a form definition.
// Purpose: Provide the round-trip artifact consumed by `parse_data`.
// Dependencies: formsmith-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The data export is a pretty-printed JSON document:
//!
//! ```json
//! { "format": "formsmith.form", "version": 1, "form": { ... }, "rules": [ ... ] }
//! ```
//!
//! `rules` lists the validation descriptor of every field in field order. It
//! is derived data for downstream tooling; [`parse_data`] ignores it and
//! rebuilds the form from `form` alone, so `parse_data(export(f)) == f`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use formsmith_core::FormDefinition;
use formsmith_core::ValidationDescriptor;
use serde::Deserialize;
use serde::Serialize;

use crate::ExportError;
use crate::ExportFormat;
use crate::ExportOptions;
use crate::Exporter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Format tag written to every data artifact.
pub const DATA_FORMAT_TAG: &str = "formsmith.form";
/// Current data artifact version.
pub const DATA_FORMAT_VERSION: u32 = 1;
/// Maximum data artifact size accepted by [`parse_data`].
pub const MAX_DATA_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Serialized data artifact.
#[derive(Debug, Serialize)]
struct DataDocument<'a> {
    /// Format tag.
    format: &'static str,
    /// Artifact version.
    version: u32,
    /// Form snapshot.
    form: &'a FormDefinition,
    /// Descriptor per field.
    rules: Vec<RuleEntry<'a>>,
}

/// Descriptor of one field, keyed for readability.
#[derive(Debug, Serialize)]
struct RuleEntry<'a> {
    /// Field key.
    key: &'a str,
    /// Normalized rule.
    #[serde(flatten)]
    descriptor: ValidationDescriptor,
}

/// Fields read back by [`parse_data`]; anything else is ignored.
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    /// Format tag.
    format: String,
    /// Artifact version.
    version: u32,
    /// Form snapshot.
    form: FormDefinition,
}

// ============================================================================
// SECTION: Exporter
// ============================================================================

/// Renders the importable JSON snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataExporter;

impl Exporter for DataExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Data
    }

    fn export(&self, form: &FormDefinition, _options: &ExportOptions) -> Result<String, ExportError> {
        form.validate()?;
        let document = DataDocument {
            format: DATA_FORMAT_TAG,
            version: DATA_FORMAT_VERSION,
            form,
            rules: form
                .fields
                .iter()
                .map(|field| RuleEntry {
                    key: field.key.as_str(),
                    descriptor: ValidationDescriptor::from_field(field),
                })
                .collect(),
        };
        let mut out =
            serde_json::to_string_pretty(&document).map_err(|err| ExportError::Json(err.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

// ============================================================================
// SECTION: Import
// ============================================================================

/// Rebuilds a form definition from a data artifact.
///
/// # Errors
///
/// Returns [`ExportError::Import`] for oversized input, malformed JSON, or an
/// unknown format tag or version, and [`ExportError::InvalidForm`] when the
/// embedded form fails validation.
pub fn parse_data(text: &str) -> Result<FormDefinition, ExportError> {
    if text.len() > MAX_DATA_BYTES {
        return Err(ExportError::Import(format!("data artifact exceeds {MAX_DATA_BYTES} bytes")));
    }
    let envelope: DataEnvelope =
        serde_json::from_str(text).map_err(|err| ExportError::Import(err.to_string()))?;
    if envelope.format != DATA_FORMAT_TAG {
        return Err(ExportError::Import(format!("unknown format tag: {}", envelope.format)));
    }
    if envelope.version != DATA_FORMAT_VERSION {
        return Err(ExportError::Import(format!("unsupported version: {}", envelope.version)));
    }
    envelope.form.validate()?;
    Ok(envelope.form)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
