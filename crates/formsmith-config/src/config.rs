// crates/formsmith-config/src/config.rs
// ============================================================================
// Module: formsmith Configuration
// Description: Configuration loading and validation for the formsmith CLI.
// Purpose: Provide strict, fail-closed config parsing with size limits.
// Dependencies: formsmith-export, formsmith-store-sqlite, formsmith-submit, serde, toml
// ============================================================================

//! ## Overview
//! The config file is resolved from an explicit path, then the
//! `FORMSMITH_CONFIG` environment variable, then `./formsmith.toml`.
//! A missing default file yields [`FormsmithConfig::default`]; a missing
//! explicit or environment-selected file is an error.
//!
//! Security posture: config inputs are untrusted and validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use formsmith_core::DEFAULT_LIBRARY_KEY;
use formsmith_export::ExportFormat;
use formsmith_export::ExportOptions;
use formsmith_store_sqlite::MAX_PAYLOAD_BYTES;
use formsmith_store_sqlite::SqliteStoreConfig;
use formsmith_store_sqlite::SqliteStoreMode;
use formsmith_store_sqlite::SqliteSyncMode;
use formsmith_submit::HttpTransportConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "formsmith.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FORMSMITH_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum store key length in bytes.
pub const MAX_STORE_KEY_LENGTH: usize = 255;
/// Maximum length of export labels and identifiers.
pub const MAX_LABEL_LENGTH: usize = 256;
/// Default `SQLite` database path.
const DEFAULT_STORE_PATH: &str = "formsmith.db";
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum `SQLite` busy timeout in milliseconds.
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// formsmith configuration loaded from `formsmith.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormsmithConfig {
    /// Saved-forms store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
    /// Preview submission transport settings.
    #[serde(default)]
    pub submit: HttpTransportConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl FormsmithConfig {
    /// Loads configuration using the standard resolution order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, required) = resolve_path(path)?;
        load_resolved(&resolved, required)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.export.validate()?;
        self.submit.validate().map_err(|err| ConfigError::Invalid(format!("submit: {err}")))?;
        self.audit.validate()
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// `[store]` section: where saved forms live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Key the form list is saved under.
    #[serde(default = "default_store_key")]
    pub key: String,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional max versions to retain per key.
    #[serde(default)]
    pub max_versions: Option<u64>,
    /// Optional snapshot size limit in bytes.
    #[serde(default)]
    pub max_payload_bytes: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            key: default_store_key(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
            max_payload_bytes: None,
        }
    }
}

impl StoreConfig {
    /// Builds the `SQLite` store configuration for this section.
    #[must_use]
    pub fn to_sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            max_versions: self.max_versions,
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.key.trim().is_empty() {
            return Err(ConfigError::Invalid("store.key must be non-empty".to_string()));
        }
        if self.key.len() > MAX_STORE_KEY_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "store.key exceeds {MAX_STORE_KEY_LENGTH} bytes"
            )));
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        if self.max_versions == Some(0) {
            return Err(ConfigError::Invalid("store.max_versions must be greater than zero".to_string()));
        }
        if let Some(limit) = self.max_payload_bytes
            && (limit == 0 || limit > MAX_PAYLOAD_BYTES)
        {
            return Err(ConfigError::Invalid(format!(
                "store.max_payload_bytes must be in 1..={MAX_PAYLOAD_BYTES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Export Config
// ============================================================================

/// `[export]` section: default format and presentation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Format used when the CLI is not given one.
    #[serde(default = "default_export_format")]
    pub default_format: ExportFormat,
    /// Presentation overrides (`[export.options]`).
    #[serde(default)]
    pub options: ExportOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: default_export_format(),
            options: ExportOptions::default(),
        }
    }
}

impl ExportConfig {
    /// Validates export settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let options = &self.options;
        if !is_identifier(&options.component_name) {
            return Err(ConfigError::Invalid(
                "export.options.component_name must be an identifier".to_string(),
            ));
        }
        if options.mount_id.is_empty() || options.mount_id.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "export.options.mount_id must be non-empty without whitespace".to_string(),
            ));
        }
        for (field, value) in [
            ("component_name", &options.component_name),
            ("submit_label", &options.submit_label),
            ("untitled_label", &options.untitled_label),
            ("mount_id", &options.mount_id),
        ] {
            if value.len() > MAX_LABEL_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "export.options.{field} exceeds {MAX_LABEL_LENGTH} bytes"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit events are discarded.
    None,
}

/// `[audit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path, required for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", &path.to_string_lossy()),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string())),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether the file must exist.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Reads and validates a resolved config file.
fn load_resolved(path: &Path, required: bool) -> Result<FormsmithConfig, ConfigError> {
    validate_path(path)?;
    if !required && !path.exists() {
        return Ok(FormsmithConfig::default());
    }
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    let mut config = FormsmithConfig::from_toml_str(content)?;
    config.source_path = Some(path.to_path_buf());
    Ok(config)
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Returns true for ASCII identifiers usable as component names.
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Default store path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Default store key.
fn default_store_key() -> String {
    DEFAULT_LIBRARY_KEY.to_string()
}

/// Default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default export format.
const fn default_export_format() -> ExportFormat {
    ExportFormat::Markup
}

// ============================================================================
// SECTION: Tests
// ============================================================================
