// crates/formsmith-export/src/dispatcher.rs
// ============================================================================
// Module: formsmith Export Dispatcher
// Description: Format selection and exporter invocation.
// Purpose: Map a format selector to its exporter and return the artifact unchanged.
// Dependencies: formsmith-core
// ============================================================================

//! ## Overview
//! The dispatcher is stateless. Every call re-renders from the given form;
//! nothing is cached, so concurrent calls never interfere.

use formsmith_core::FormDefinition;

use crate::ComponentExporter;
use crate::DataExporter;
use crate::ExportError;
use crate::ExportFormat;
use crate::ExportOptions;
use crate::Exporter;
use crate::MarkupExporter;
use crate::ScriptExporter;

/// Returns the exporter for a format.
#[must_use]
pub fn exporter_for(format: ExportFormat) -> &'static dyn Exporter {
    match format {
        ExportFormat::Component => &ComponentExporter,
        ExportFormat::Data => &DataExporter,
        ExportFormat::Markup => &MarkupExporter,
        ExportFormat::Script => &ScriptExporter,
    }
}

/// Renders a form in the given format.
///
/// # Errors
///
/// Returns [`ExportError`] when the form is invalid or encoding fails.
pub fn export(
    form: &FormDefinition,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    exporter_for(format).export(form, options)
}

/// Renders a form for a format selector using default options.
///
/// # Errors
///
/// Returns [`ExportError::UnsupportedFormat`] naming `format` when it is not
/// a known format, or any exporter error.
pub fn dispatch(form: &FormDefinition, format: &str) -> Result<String, ExportError> {
    dispatch_with(form, format, &ExportOptions::default())
}

/// Renders a form for a format selector with explicit options.
///
/// # Errors
///
/// Returns [`ExportError::UnsupportedFormat`] naming `format` when it is not
/// a known format, or any exporter error.
pub fn dispatch_with(
    form: &FormDefinition,
    format: &str,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let format: ExportFormat = format.parse()?;
    export(form, format, options)
}
