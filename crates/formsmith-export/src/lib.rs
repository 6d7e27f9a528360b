// crates/formsmith-export/src/lib.rs
// ============================================================================
// Module: formsmith Export Engine
// Description: Deterministic renderers for form definition artifacts.
// Purpose: Turn one FormDefinition into component, data, markup, or script text.
// Dependencies: formsmith-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The export engine takes a [`FormDefinition`] and emits one of four text
//! artifacts: a Vue single-file component, an importable JSON document, a
//! standalone HTML page, or an embeddable script loader.
//!
//! ### Design Notes
//! - Output is deterministic: fields render in stored order, headers in
//!   sorted order, and nothing depends on time or randomness.
//! - Every exporter validates the form first and fails fast; no partial
//!   artifact is ever returned.
//! - User strings are escaped for the syntax they land in (see [`escape`]).
//!   Generated scripts share one client runtime (see [`runtime`]) so the
//!   validation and submission behavior is identical across artifacts.
//! - The engine performs no I/O and keeps no state.
//!
//! ## Index
//! - Public API: [`dispatch`], [`dispatch_with`], [`export`], [`ExportFormat`],
//!   [`ExportOptions`], [`ExportError`], [`Exporter`]
//! - Exporters: [`ComponentExporter`], [`DataExporter`], [`MarkupExporter`],
//!   [`ScriptExporter`]
//! - Re-import: [`parse_data`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod component;
pub mod data;
pub mod dispatcher;
pub mod escape;
pub mod markup;
pub mod runtime;
pub mod script;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use formsmith_core::FormDefinition;
use formsmith_core::FormError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use component::ComponentExporter;
pub use data::DATA_FORMAT_TAG;
pub use data::DATA_FORMAT_VERSION;
pub use data::MAX_DATA_BYTES;
pub use data::DataExporter;
pub use data::parse_data;
pub use dispatcher::dispatch;
pub use dispatcher::dispatch_with;
pub use dispatcher::export;
pub use dispatcher::exporter_for;
pub use markup::MarkupExporter;
pub use script::ScriptExporter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the export engine.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
/// - [`ExportError::UnsupportedFormat`] carries the requested value verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Requested format is not one of the supported formats.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    /// Form definition failed validation.
    #[error("invalid form definition: {0}")]
    InvalidForm(String),
    /// JSON serialization failed.
    #[error("json error: {0}")]
    Json(String),
    /// Data artifact could not be imported.
    #[error("import error: {0}")]
    Import(String),
}

impl From<FormError> for ExportError {
    fn from(err: FormError) -> Self {
        Self::InvalidForm(err.to_string())
    }
}

// ============================================================================
// SECTION: Export Format
// ============================================================================

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Vue single-file component.
    Component,
    /// Importable JSON document.
    Data,
    /// Standalone HTML page.
    Markup,
    /// Embeddable script loader.
    Script,
}

impl ExportFormat {
    /// All formats in menu order.
    pub const ALL: [Self; 4] = [Self::Component, Self::Data, Self::Markup, Self::Script];

    /// Returns the canonical format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Data => "data",
            Self::Markup => "markup",
            Self::Script => "script",
        }
    }

    /// Returns the conventional file extension.
    #[must_use]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Component => "vue",
            Self::Data => "json",
            Self::Markup => "html",
            Self::Script => "js",
        }
    }

    /// Returns the menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Component => "Vue/Nuxt Component",
            Self::Data => "JSON (Importable)",
            Self::Markup => "Embeddable HTML",
            Self::Script => "JavaScript (Head Script)",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "component" | "vue" => Ok(Self::Component),
            "data" | "json" => Ok(Self::Data),
            "markup" | "html" => Ok(Self::Markup),
            "script" | "js" => Ok(Self::Script),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Export Options
// ============================================================================

/// Presentation knobs shared by all exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Component name used by the Vue export.
    pub component_name: String,
    /// Submit button text.
    pub submit_label: String,
    /// Title used when the form name is blank.
    pub untitled_label: String,
    /// Element id the script loader mounts into.
    pub mount_id: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            component_name: "GeneratedForm".to_string(),
            submit_label: "Submit".to_string(),
            untitled_label: "Untitled Form".to_string(),
            mount_id: "dynamic-form-container".to_string(),
        }
    }
}

impl ExportOptions {
    /// Returns the display title for a form.
    #[must_use]
    pub fn title_for<'a>(&'a self, form: &'a FormDefinition) -> &'a str {
        if form.name.trim().is_empty() { &self.untitled_label } else { &form.name }
    }
}

// ============================================================================
// SECTION: Exporter
// ============================================================================

/// Renders one artifact format.
pub trait Exporter {
    /// Returns the format this exporter renders.
    fn format(&self) -> ExportFormat;

    /// Renders the artifact for a form.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when the form is invalid or encoding fails.
    fn export(&self, form: &FormDefinition, options: &ExportOptions) -> Result<String, ExportError>;
}
