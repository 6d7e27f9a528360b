// crates/formsmith-cli/src/audit.rs
// ============================================================================
// Module: CLI Audit Logging
// Description: Structured audit events for export, store, and submit actions.
// Purpose: Emit JSON-line audit records without a logging framework.
// Dependencies: formsmith-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Commands build one [`AuditEvent`] per action and hand it to the configured
//! [`AuditSink`]. Sinks never fail the command: write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use formsmith_config::AuditConfig;
use formsmith_config::AuditSinkKind;
use serde::Serialize;

// ============================================================================
// SECTION: Event Labels
// ============================================================================

/// A form was rendered to an artifact.
pub const EVENT_EXPORT: &str = "form_export";
/// A data artifact was imported into the store.
pub const EVENT_IMPORT: &str = "form_import";
/// A saved form was deleted.
pub const EVENT_DELETE: &str = "form_delete";
/// A preview submission was attempted.
pub const EVENT_SUBMIT: &str = "preview_submit";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Action completed.
    #[default]
    Success,
    /// Action failed.
    Failure,
}

/// Audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action outcome.
    pub outcome: AuditOutcome,
    /// Form identifier when known.
    pub form_id: Option<String>,
    /// Artifact format label for exports.
    pub format: Option<String>,
    /// Store key for store actions.
    pub store_key: Option<String>,
    /// Artifact or payload size in bytes.
    pub bytes: Option<usize>,
    /// HTTP status for submissions.
    pub status: Option<u16>,
    /// Error message on failure.
    pub error: Option<String>,
}

/// Inputs for [`AuditEvent::new`].
#[derive(Debug, Clone, Default)]
pub struct AuditEventParams {
    /// Action outcome.
    pub outcome: AuditOutcome,
    /// Form identifier when known.
    pub form_id: Option<String>,
    /// Artifact format label.
    pub format: Option<String>,
    /// Store key.
    pub store_key: Option<String>,
    /// Size in bytes.
    pub bytes: Option<usize>,
    /// HTTP status.
    pub status: Option<u16>,
    /// Error message.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str, params: AuditEventParams) -> Self {
        let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            outcome: params.outcome,
            form_id: params.form_id,
            format: params.format,
            store_key: params.store_key,
            bytes: params.bytes,
            status: params.status,
            error: params.error,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Builds the sink selected by the `[audit]` config section.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its log file.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Box<dyn AuditSink>> {
    match (config.sink, &config.path) {
        (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
        (AuditSinkKind::File, Some(path)) => Ok(Box::new(FileAuditSink::new(path)?)),
        (AuditSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "audit.path is required for the file sink"))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
