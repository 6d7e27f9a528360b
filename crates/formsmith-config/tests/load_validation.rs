// crates/formsmith-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: File loading, parsing, and section validation for formsmith.toml.
// Purpose: Ensure config input fails closed on malformed or out-of-range data.
// Dependencies: formsmith-config, formsmith-export, formsmith-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises [`FormsmithConfig::load`] with explicit paths and
//! [`FormsmithConfig::from_toml_str`] for section validation.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use formsmith_config::AuditSinkKind;
use formsmith_config::ConfigError;
use formsmith_config::FormsmithConfig;
use formsmith_config::MAX_CONFIG_FILE_SIZE;
use formsmith_export::ExportFormat;
use formsmith_store_sqlite::SqliteStoreMode;
use formsmith_store_sqlite::SqliteSyncMode;

fn assert_invalid(content: &str, needle: &str) {
    match FormsmithConfig::from_toml_str(content) {
        Err(ConfigError::Invalid(message)) => {
            assert!(message.contains(needle), "unexpected message: {message}");
        }
        Err(other) => panic!("expected invalid config, got {other}"),
        Ok(_) => panic!("expected invalid config for {content}"),
    }
}

#[test]
fn load_reads_all_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formsmith.toml");
    fs::write(
        &path,
        r#"
[store]
path = "data/forms.db"
key = "team-forms"
journal_mode = "delete"
sync_mode = "normal"
max_versions = 5

[export]
default_format = "script"

[export.options]
submit_label = "Send"
mount_id = "signup"

[submit]
timeout_ms = 2500
allow_http = true

[audit]
sink = "file"
path = "logs/audit.jsonl"
"#,
    )
    .unwrap();

    let config = FormsmithConfig::load(Some(&path)).unwrap();
    assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    assert_eq!(config.store.key, "team-forms");
    assert_eq!(config.store.max_versions, Some(5));
    assert_eq!(config.export.default_format, ExportFormat::Script);
    assert_eq!(config.export.options.submit_label, "Send");
    assert_eq!(config.export.options.component_name, "GeneratedForm");
    assert_eq!(config.submit.timeout_ms, 2500);
    assert!(config.submit.allow_http);
    assert_eq!(config.audit.sink, AuditSinkKind::File);

    let sqlite = config.store.to_sqlite_config();
    assert_eq!(sqlite.path, PathBuf::from("data/forms.db"));
    assert_eq!(sqlite.journal_mode, SqliteStoreMode::Delete);
    assert_eq!(sqlite.sync_mode, SqliteSyncMode::Normal);
    assert_eq!(sqlite.max_versions, Some(5));
}

#[test]
fn empty_file_uses_defaults() {
    let config = FormsmithConfig::from_toml_str("").unwrap();
    assert_eq!(config, FormsmithConfig::default());
    assert_eq!(config.store.key, "forms");
    assert_eq!(config.export.default_format, ExportFormat::Markup);
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FormsmithConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.toml");
    fs::write(&path, format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE))).unwrap();
    let err = FormsmithConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("size limit"));
}

#[test]
fn non_utf8_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).unwrap();
    let err = FormsmithConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("utf-8"));
}

#[test]
fn unknown_keys_are_parse_errors() {
    let err = FormsmithConfig::from_toml_str("[store]\nbogus = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    let err = FormsmithConfig::from_toml_str("[export.options]\ntheme = \"dark\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    let err = FormsmithConfig::from_toml_str("[export]\ndefault_format = \"pdf\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn store_section_limits() {
    assert_invalid("[store]\nkey = \"  \"\n", "store.key");
    assert_invalid("[store]\nmax_versions = 0\n", "max_versions");
    assert_invalid("[store]\nmax_payload_bytes = 0\n", "max_payload_bytes");
    assert_invalid("[store]\nbusy_timeout_ms = 600000\n", "busy_timeout_ms");
    assert_invalid("[store]\npath = \"\"\n", "store.path");
}

#[test]
fn export_options_limits() {
    assert_invalid("[export.options]\ncomponent_name = \"my-form\"\n", "component_name");
    assert_invalid("[export.options]\nmount_id = \"two words\"\n", "mount_id");
    let long = "a".repeat(300);
    assert_invalid(&format!("[export.options]\nsubmit_label = \"{long}\"\n"), "submit_label");
}

#[test]
fn submit_section_limits() {
    assert_invalid("[submit]\ntimeout_ms = 0\n", "submit");
    assert_invalid("[submit]\nmax_response_bytes = 0\n", "max_response_bytes");
}

#[test]
fn audit_sink_path_rules() {
    assert_invalid("[audit]\nsink = \"file\"\n", "audit.path is required");
    assert_invalid("[audit]\nsink = \"stderr\"\npath = \"audit.log\"\n", "only valid");
    let config = FormsmithConfig::from_toml_str("[audit]\nsink = \"none\"\n").unwrap();
    assert_eq!(config.audit.sink, AuditSinkKind::None);
}
