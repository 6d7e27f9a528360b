// crates/formsmith-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation helpers for the CLI.
// Purpose: Centralize user-facing strings.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every string the `formsmith` binary prints is looked up here through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitution follows argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "formsmith {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    ("input.read_too_large", "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit})."),
    ("input.not_utf8", "{kind} at {path} is not valid UTF-8."),
    ("input.kind.form", "form data artifact"),
    ("input.kind.values", "preview values"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid ({source})."),
    ("config.source.defaults", "built-in defaults"),
    ("audit.open_failed", "Failed to open audit log at {path}: {error}"),
    ("form.parse_failed", "Failed to read form from {path}: {error}"),
    ("export.source_missing", "Pass --form FILE or --id ID to choose the form to export."),
    ("export.failed", "Export failed: {error}"),
    ("export.write_failed", "Failed to write {format} export to {path}: {error}"),
    ("export.written", "Wrote {format} export to {path} ({bytes} bytes)."),
    ("store.open_failed", "Failed to open form store: {error}"),
    ("store.load_failed", "Failed to load saved forms: {error}"),
    ("store.save_failed", "Failed to save form: {error}"),
    ("store.history_failed", "Failed to list saved versions: {error}"),
    ("import.ok", "Imported form {id} ({name}) into '{key}'."),
    ("forms.not_found", "Saved form not found: {id}"),
    ("forms.list.header", "Saved forms in '{key}':"),
    ("forms.list.none", "No saved forms in '{key}'."),
    ("forms.list.entry", "- {id} {name} ({fields} fields)"),
    ("forms.delete.ok", "Deleted form {id}."),
    ("forms.history.header", "Saved versions of '{key}':"),
    ("forms.history.none", "No saved versions of '{key}'."),
    ("forms.history.entry", "- version {version} saved_at={saved_at} forms={forms} {algorithm}:{hash}"),
    ("forms.untitled", "(untitled)"),
    ("preview.form_invalid", "Form cannot be previewed: {error}"),
    ("preview.values_invalid", "Preview values must be a JSON object: {error}"),
    ("preview.field_error", "- {key} ({label}): {issue}"),
    ("preview.validate.failed", "Validation failed:"),
    ("preview.submit.local", "No endpoint configured; payload kept locally:"),
    ("preview.submit.sent", "Submitted with status {status}:"),
    ("preview.submit.rejected", "Submission rejected with status {status}: {body}"),
    ("preview.submit.failed", "Submission failed: {error}"),
    ("preview.encode_failed", "Failed to encode payload: {error}"),
    ("submit.transport_failed", "Failed to initialize HTTP transport: {error}"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

/// Returns the ordered catalog entries.
#[must_use]
pub const fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG_EN
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
