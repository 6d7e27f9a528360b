// crates/formsmith-cli/tests/cli_workflows.rs
// ============================================================================
// Module: CLI Workflow Tests
// Description: End-to-end tests for the formsmith binary.
// Purpose: Verify export, import, store, preview, and config commands.
// Dependencies: formsmith-cli binary, formsmith-core, formsmith-export, tempfile
// ============================================================================

//! ## Overview
//! Each test writes a config into a temp dir so the store and audit log stay
//! isolated, then drives the binary through `std::process::Command`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::FormId;
use formsmith_export::dispatch;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Temp workspace with a config, a form artifact, and an audit log.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("formsmith.toml");
        let store = dir.path().join("forms.db");
        let audit = dir.path().join("audit.jsonl");
        fs::write(
            &config,
            format!(
                "[store]\npath = '{store}'\nkey = \"test-forms\"\n\n[audit]\nsink = \"file\"\npath = '{audit}'\n",
                store = store.to_string_lossy(),
                audit = audit.to_string_lossy(),
            ),
        )
        .unwrap();
        Self {
            dir,
            config,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_form(&self, name: &str, form: &FormDefinition) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, dispatch(form, "data").unwrap()).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_formsmith"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("run formsmith")
    }

    fn audit_events(&self) -> Vec<Value> {
        let text = fs::read_to_string(self.path("audit.jsonl")).unwrap_or_default();
        text.lines().map(|line| serde_json::from_str(line).unwrap()).collect()
    }
}

fn signup_form() -> FormDefinition {
    let mut form = FormDefinition::new("Signup");
    form.id = Some(FormId::new("signup"));
    let mut email = Field::new(FieldType::Email, "Email").with_required(true);
    email.key = "email".into();
    let mut plan = Field::new(FieldType::Select, "Plan").with_options(["free", "pro"]);
    plan.key = "plan".into();
    form.fields = vec![email, plan];
    form
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// SECTION: Export
// ============================================================================

#[test]
fn export_renders_each_format_to_stdout() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    for (format, marker) in [
        ("component", "<template>"),
        ("data", "\"formsmith.form\""),
        ("markup", "<!DOCTYPE html>"),
        ("script", "DynamicFormLoader"),
    ] {
        let output = ws.run(&["export", "--form", path_arg(&form), "--format", format]);
        assert!(output.status.success(), "{format}: {}", stderr(&output));
        assert!(stdout(&output).contains(marker), "{format} output lacks {marker}");
    }
    let events = ws.audit_events();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|event| event["event"] == "form_export" && event["outcome"] == "success"));
}

#[test]
fn export_uses_configured_default_format() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let output = ws.run(&["export", "--form", path_arg(&form)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("<!DOCTYPE html>"));
}

#[test]
fn export_rejects_unknown_format() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let output = ws.run(&["export", "--form", path_arg(&form), "--format", "pdf"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported export format: pdf"));
    let events = ws.audit_events();
    assert_eq!(events[0]["outcome"], "failure");
    assert_eq!(events[0]["format"], "pdf");
}

#[test]
fn export_writes_output_file() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let out = ws.path("signup.vue");
    let output = ws.run(&["export", "--form", path_arg(&form), "--format", "vue", "--out", path_arg(&out)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Wrote vue export"));
    assert!(fs::read_to_string(&out).unwrap().contains("<template>"));
}

#[test]
fn export_rejects_malformed_artifact() {
    let ws = Workspace::new();
    let bad = ws.path("bad.json");
    fs::write(&bad, "{\"format\":\"other\",\"version\":1}").unwrap();
    let output = ws.run(&["export", "--form", path_arg(&bad), "--format", "data"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read form"));
}

// ============================================================================
// SECTION: Store
// ============================================================================

#[test]
fn import_list_show_delete_round_trip() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());

    let output = ws.run(&["import", "--input", path_arg(&form)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Imported form signup (Signup) into 'test-forms'"));

    let output = ws.run(&["forms", "list"]);
    assert!(stdout(&output).contains("- signup Signup (2 fields)"));

    let output = ws.run(&["forms", "show", "--id", "signup"]);
    assert!(output.status.success());
    let shown: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(shown["form"]["name"], "Signup");

    let output = ws.run(&["export", "--id", "signup", "--format", "script"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("formConfig"));

    let output = ws.run(&["forms", "delete", "--id", "signup"]);
    assert!(output.status.success());
    let output = ws.run(&["forms", "list"]);
    assert!(stdout(&output).contains("No saved forms in 'test-forms'"));

    let output = ws.run(&["forms", "delete", "--id", "signup"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Saved form not found: signup"));

    let output = ws.run(&["forms", "history"]);
    assert!(stdout(&output).contains("- version 1 "));
    assert!(stdout(&output).contains("- version 2 "));

    let labels: Vec<String> =
        ws.audit_events().iter().map(|event| event["event"].as_str().unwrap().to_string()).collect();
    assert!(labels.contains(&"form_import".to_string()));
    assert!(labels.contains(&"form_delete".to_string()));
}

#[test]
fn empty_store_lists_nothing() {
    let ws = Workspace::new();
    let output = ws.run(&["forms", "list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("No saved forms"));
    let output = ws.run(&["forms", "history"]);
    assert!(stdout(&output).contains("No saved versions"));
}

// ============================================================================
// SECTION: Preview
// ============================================================================

#[test]
fn preview_validate_reports_field_errors() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let values = ws.path("values.json");
    fs::write(&values, "{\"email\": \"\", \"plan\": \"enterprise\"}").unwrap();
    let output = ws.run(&["preview", "validate", "--form", path_arg(&form), "--values", path_arg(&values)]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Validation failed:"));
    assert!(text.contains("- email (Email): this field is required"));
}

#[test]
fn preview_validate_prints_payload() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let values = ws.path("values.json");
    fs::write(&values, "{\"email\": \"ada@example.test\", \"plan\": \"pro\"}").unwrap();
    let output = ws.run(&["preview", "validate", "--form", path_arg(&form), "--values", path_arg(&values)]);
    assert!(output.status.success(), "{}", stderr(&output));
    let payload: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(payload["email"], "ada@example.test");
    assert_eq!(payload["plan"], "pro");
}

#[test]
fn preview_submit_without_endpoint_stays_local() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let values = ws.path("values.json");
    fs::write(&values, "{\"email\": \"ada@example.test\"}").unwrap();
    let output = ws.run(&["preview", "submit", "--form", path_arg(&form), "--values", path_arg(&values)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("No endpoint configured"));
    let events = ws.audit_events();
    assert_eq!(events[0]["event"], "preview_submit");
    assert_eq!(events[0]["outcome"], "success");
}

#[test]
fn preview_rejects_non_object_values() {
    let ws = Workspace::new();
    let form = ws.write_form("signup.json", &signup_form());
    let values = ws.path("values.json");
    fs::write(&values, "[1, 2]").unwrap();
    let output = ws.run(&["preview", "validate", "--form", path_arg(&form), "--values", path_arg(&values)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must be a JSON object"));
}

// ============================================================================
// SECTION: Config
// ============================================================================

#[test]
fn config_validate_reports_source() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "validate"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Config valid"));
    assert!(stdout(&output).contains("formsmith.toml"));
}

#[test]
fn config_validate_rejects_bad_config() {
    let ws = Workspace::new();
    fs::write(&ws.config, "[store]\nmax_versions = 0\n").unwrap();
    let output = ws.run(&["config", "validate"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"));
    assert!(stderr(&output).contains("max_versions"));
}

#[test]
fn version_flag_prints_version() {
    let ws = Workspace::new();
    let output = ws.run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("formsmith "));
}
