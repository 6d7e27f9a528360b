// crates/formsmith-export/tests/client_runtime.rs
// ============================================================================
// Module: Client Runtime Execution Tests
// Description: Runs generated component, markup, and script code in a JS engine.
// Purpose: Verify generated artifacts validate and submit exactly like the preview.
// Dependencies: boa_engine, formsmith-core, formsmith-export, serde_json
// ============================================================================

//! ## Overview
//! Each runnable artifact is evaluated in a fresh `boa_engine` context on top
//! of a minimal DOM and `fetch` stub. The artifact's own scope is exposed by
//! appending one assignment, so the code under test is the exported code.
//! Validation results and outgoing requests are compared with
//! [`FormPreview`].

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

use boa_engine::Context;
use boa_engine::Source;
use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::FormPreview;
use formsmith_core::HttpMethod;
use formsmith_core::ValidationRules;
use formsmith_export::ExportFormat;
use formsmith_export::dispatch;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Browser globals the artifacts touch, reduced to inert stand-ins.
const DOM_STUB: &str = r"var window = globalThis;
var listeners = [];
var sentRequests = [];
function StubElement(tag) {
  this.tagName = tag;
  this.children = [];
  this.attributes = {};
  this.parentNode = null;
}
StubElement.prototype.appendChild = function (child) {
  child.parentNode = this;
  this.children.push(child);
  return child;
};
StubElement.prototype.insertBefore = function (child) {
  return this.appendChild(child);
};
StubElement.prototype.setAttribute = function (name, value) {
  this.attributes[name] = String(value);
};
StubElement.prototype.addEventListener = function (name, handler) {
  listeners.push({ name: name, handler: handler });
};
StubElement.prototype.querySelector = function () {
  return new StubElement('stub');
};
StubElement.prototype.querySelectorAll = function () {
  return [];
};
StubElement.prototype.reset = function () {};
var document = {
  readyState: 'complete',
  currentScript: null,
  head: new StubElement('head'),
  body: new StubElement('body'),
  createElement: function (tag) { return new StubElement(tag); },
  createTextNode: function (text) { return { text: text }; },
  getElementById: function (id) { var element = new StubElement('div'); element.id = id; return element; },
  addEventListener: function () {}
};
function fetch(url, init) {
  sentRequests.push({ url: url, init: init });
  return new Promise(function () {});
}
";

/// Publishes the artifact's runtime functions under `runtime`.
fn expose(config_name: &str) -> String {
    format!(
        "globalThis.runtime = {{ validateField: validateField, collectErrors: collectErrors, \
         buildPayload: buildPayload, submitForm: submitForm, config: {config_name} }};\n"
    )
}

/// Returns the artifact's JavaScript with its scope exposed.
fn runnable_source(format: ExportFormat, artifact: &str) -> String {
    match format {
        ExportFormat::Component => {
            let (_, rest) = artifact.split_once("<script>\n").unwrap();
            let (body, _) = rest.rsplit_once("</script>").unwrap();
            assert_eq!(body.matches("export default {").count(), 1);
            let body = body.replacen("export default {", "globalThis.component = {", 1);
            body + &expose("formDefinition")
        }
        ExportFormat::Markup => {
            let (_, rest) = artifact.split_once("<script>\n").unwrap();
            let (body, _) = rest.rsplit_once("  </script>").unwrap();
            expose_before_iife_close(body)
        }
        ExportFormat::Script => expose_before_iife_close(artifact),
        ExportFormat::Data => panic!("data artifacts carry no code"),
    }
}

/// Inserts the exposure assignment before the final `})();`.
fn expose_before_iife_close(body: &str) -> String {
    let (head, tail) = body.rsplit_once("})();").unwrap();
    [head, expose("formConfig").as_str(), "})();", tail].concat()
}

/// A JS context with one artifact loaded.
struct Artifact {
    format: ExportFormat,
    context: Context,
}

impl Artifact {
    fn load(form: &FormDefinition, format: ExportFormat) -> Self {
        let artifact = dispatch(form, format.as_str()).unwrap();
        let mut context = Context::default();
        let source = [DOM_STUB, runnable_source(format, &artifact).as_str()].concat();
        if let Err(err) = context.eval(Source::from_bytes(source.as_str())) {
            panic!("{format} artifact failed to run: {err}");
        }
        Self {
            format,
            context,
        }
    }

    /// Evaluates an expression and returns its string conversion.
    fn eval(&mut self, code: &str) -> String {
        let value = match self.context.eval(Source::from_bytes(code)) {
            Ok(value) => value,
            Err(err) => panic!("{} evaluation failed: {err}", self.format),
        };
        value.to_string(&mut self.context).unwrap().to_std_string_escaped()
    }

    /// Evaluates an expression that yields JSON text.
    fn eval_json(&mut self, code: &str) -> Value {
        serde_json::from_str(&self.eval(&format!("JSON.stringify({code})"))).unwrap()
    }

    /// Returns `key:code` for every failing field.
    fn error_codes(&mut self, values: &Value) -> Vec<String> {
        let code = format!(
            "runtime.collectErrors(runtime.config, {values}).map(function (error) {{ return error.key + ':' + error.code; }})"
        );
        serde_json::from_value(self.eval_json(&code)).unwrap()
    }
}

/// Returns `key:code` for every failing field according to the preview.
fn preview_codes(form: &FormDefinition, values: &Value) -> Vec<String> {
    let values: Map<String, Value> = serde_json::from_value(values.clone()).unwrap();
    match FormPreview::new(form).unwrap().validate(&values) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(|error| format!("{}:{}", error.key, error.issue.code())).collect(),
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const HOSTILE_LABEL: &str = "</script><script>alert('x')</script> \"q\" `t` ${x} \u{2028} \\";

const RUNNABLE: [ExportFormat; 3] = [ExportFormat::Component, ExportFormat::Markup, ExportFormat::Script];

fn keyed(mut field: Field, key: &str) -> Field {
    field.key = key.into();
    field
}

fn fidelity_form() -> FormDefinition {
    let mut form = FormDefinition::new(HOSTILE_LABEL);
    form.fields = vec![
        keyed(
            Field::new(FieldType::Text, HOSTILE_LABEL)
                .with_required(true)
                .with_validation(ValidationRules::bounds(Some(2.0), Some(50.0))),
            "name",
        ),
        keyed(
            Field::new(FieldType::Number, "Age").with_validation(ValidationRules::bounds(Some(18.0), Some(120.0))),
            "age",
        ),
        keyed(
            Field::new(FieldType::Text, "Nickname").with_validation(ValidationRules {
                pattern: Some(r"\p{L}+".to_string()),
                ..ValidationRules::default()
            }),
            "nickname",
        ),
        keyed(
            Field::new(FieldType::Text, "Zip").with_validation(ValidationRules {
                pattern: Some("[0-9]{5}".to_string()),
                ..ValidationRules::default()
            }),
            "zip",
        ),
        keyed(
            Field::new(FieldType::Checkbox, "Plans")
                .with_options(["free", "pro", "team"])
                .with_validation(ValidationRules::bounds(Some(1.0), Some(2.0))),
            "plans",
        ),
    ];
    form.endpoint = Some("https://example.test/submit".to_string());
    form.method = HttpMethod::Post;
    form.headers.insert("X-Test".to_string(), "1".to_string());
    form.headers.insert("content-type".to_string(), "text/plain".to_string());
    form
}

fn value_cases() -> Vec<Value> {
    vec![
        json!({}),
        json!({ "name": "" }),
        json!({ "name": "a" }),
        json!({ "name": "ab" }),
        json!({ "name": "a".repeat(50) }),
        json!({ "name": "a".repeat(51) }),
        json!({ "name": "Ada", "age": " " }),
        json!({ "name": "Ada", "age": "0x10" }),
        json!({ "name": "Ada", "age": "17" }),
        json!({ "name": "Ada", "age": " 18 " }),
        json!({ "name": "Ada", "age": 121 }),
        json!({ "name": "Ada", "age": [30] }),
        json!({ "name": "Ada", "nickname": "abc" }),
        json!({ "name": "Ada", "nickname": "çé" }),
        json!({ "name": "Ada", "nickname": "a1" }),
        json!({ "name": "Ada", "zip": "1234" }),
        json!({ "name": "Ada", "zip": "12345" }),
        json!({ "name": "Ada", "plans": [] }),
        json!({ "name": "Ada", "plans": ["pro"] }),
        json!({ "name": "Ada", "plans": ["free", "pro", "team"] }),
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn artifacts_with_hostile_labels_run_and_keep_the_label() {
    let form = fidelity_form();
    for format in RUNNABLE {
        let mut artifact = Artifact::load(&form, format);
        assert_eq!(artifact.eval("runtime.config.fields[0].label"), HOSTILE_LABEL, "{format}");
        assert_eq!(artifact.eval("runtime.config.name"), HOSTILE_LABEL, "{format}");
    }
}

#[test]
fn required_length_rule_is_enforced_by_every_artifact() {
    let form = fidelity_form();
    for format in RUNNABLE {
        let mut artifact = Artifact::load(&form, format);
        let rule = "runtime.config.fields[0].rule";
        assert_eq!(artifact.eval(&format!("runtime.validateField({rule}, '').code")), "required", "{format}");
        assert_eq!(artifact.eval(&format!("runtime.validateField({rule}, 'a').code")), "too_short", "{format}");
        assert_eq!(artifact.eval(&format!("runtime.validateField({rule}, 'ab')")), "null", "{format}");
        let fifty = "a".repeat(50);
        assert_eq!(artifact.eval(&format!("runtime.validateField({rule}, '{fifty}')")), "null", "{format}");
        assert_eq!(
            artifact.eval(&format!("runtime.validateField({rule}, '{fifty}a').code")),
            "too_long",
            "{format}"
        );
    }
}

#[test]
fn artifacts_report_the_same_errors_as_the_preview() {
    let form = fidelity_form();
    for format in RUNNABLE {
        let mut artifact = Artifact::load(&form, format);
        for values in value_cases() {
            assert_eq!(artifact.error_codes(&values), preview_codes(&form, &values), "{format}: {values}");
        }
    }
}

#[test]
fn artifacts_send_the_request_the_preview_builds() {
    let form = fidelity_form();
    let values = json!({ "name": "Ada", "age": "42", "zip": "12345", "plans": ["pro"] });
    let map: Map<String, Value> = serde_json::from_value(values.clone()).unwrap();
    let preview = FormPreview::new(&form).unwrap();
    let payload = preview.validate(&map).unwrap();
    let request = preview.request_for(&payload).unwrap().unwrap();
    let expected_body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();

    for format in RUNNABLE {
        let mut artifact = Artifact::load(&form, format);
        artifact.eval(&format!("runtime.submitForm(runtime.config, runtime.buildPayload(runtime.config, {values}))"));
        let sent = artifact.eval_json("sentRequests[sentRequests.length - 1]");
        assert_eq!(sent["url"], json!(request.endpoint), "{format}");
        assert_eq!(sent["init"]["method"], json!(request.method.as_str()), "{format}");
        assert_eq!(sent["init"]["headers"], serde_json::to_value(&request.headers).unwrap(), "{format}");
        let body: Value = serde_json::from_str(sent["init"]["body"].as_str().unwrap()).unwrap();
        assert_eq!(body, expected_body, "{format}");
    }
}

#[test]
fn component_submit_handler_validates_before_sending() {
    let form = fidelity_form();
    let mut artifact = Artifact::load(&form, ExportFormat::Component);
    let setup = "var emitted = [];
var vm = component.data();
vm.$emit = function (name) { emitted.push(name); };
component.methods.handleSubmit.call(vm);
emitted.join(',') + '|' + sentRequests.length";
    assert_eq!(artifact.eval(setup), "validation-error|0");
    let submit = "vm.values.name = 'Ada';
vm.values.plans = ['pro'];
component.methods.handleSubmit.call(vm);
emitted.join(',') + '|' + sentRequests.length + '|' + vm.submitting";
    assert_eq!(artifact.eval(submit), "validation-error,submit|1|true");
}

#[test]
fn markup_and_script_wire_a_submit_listener() {
    let form = fidelity_form();
    for format in [ExportFormat::Markup, ExportFormat::Script] {
        let mut artifact = Artifact::load(&form, format);
        let run = "var submits = listeners.filter(function (entry) { return entry.name === 'submit'; });
var prevented = false;
submits[0].handler({ preventDefault: function () { prevented = true; } });
submits.length + '|' + prevented + '|' + sentRequests.length";
        assert_eq!(artifact.eval(run), "1|true|0", "{format}");
    }
    let mut loader = Artifact::load(&form, ExportFormat::Script);
    assert_eq!(loader.eval("window.DynamicFormLoader.mounted"), "true");
    assert_eq!(loader.eval("window.DynamicFormLoader.validate({ name: 'a' })[0].code"), "too_short");
}
