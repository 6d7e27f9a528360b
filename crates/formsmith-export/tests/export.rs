// crates/formsmith-export/tests/export.rs
// ============================================================================
// Module: Export Engine Integration Tests
// Description: End-to-end checks of the four exporters and the dispatcher.
// Purpose: Verify ordering, escaping, rule fidelity, and format selection.
// Dependencies: formsmith-core, formsmith-export
// ============================================================================

//! ## Overview
//! Renders shared fixtures through the public dispatcher API.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::HttpMethod;
use formsmith_core::ValidationRules;
use formsmith_export::ExportError;
use formsmith_export::ExportFormat;
use formsmith_export::ExportOptions;
use formsmith_export::dispatch;
use formsmith_export::dispatch_with;
use formsmith_export::exporter_for;
use formsmith_export::parse_data;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn contact_form() -> FormDefinition {
    let mut form = FormDefinition::new("Contact");
    form.fields.push(
        Field::new(FieldType::Text, "Name")
            .with_required(true)
            .with_validation(ValidationRules::bounds(Some(2.0), Some(50.0))),
    );
    form.fields.push(Field::new(FieldType::Email, "Email").with_placeholder("you@example.com"));
    form.fields.push(Field::new(FieldType::Select, "Topic").with_options(["Sales", "Support"]));
    form.fields.push(
        Field::new(FieldType::Number, "Seats").with_validation(ValidationRules::bounds(Some(1.0), Some(10.0))),
    );
    form.endpoint = Some("https://example.test/api/submit".to_string());
    form.method = HttpMethod::Post;
    form.headers.insert("X-Test".to_string(), "1".to_string());
    form
}

fn hostile_form() -> FormDefinition {
    let mut form = FormDefinition::new("</script><b>\"Quotes\" & <tags>");
    form.fields.push(Field::new(FieldType::Text, "</script><script>alert(1)</script>"));
    form.fields.push(Field::new(FieldType::Radio, "Pick \"one\"").with_options(["a & b", "<c>"]));
    form
}

fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

#[test]
fn unknown_format_is_reported_verbatim() {
    let err = dispatch(&contact_form(), "xml").unwrap_err();
    assert_eq!(err, ExportError::UnsupportedFormat("xml".to_string()));
    assert_eq!(err.to_string(), "unsupported export format: xml");
}

#[test]
fn aliases_select_the_same_exporter() {
    let form = contact_form();
    for (canonical, alias) in [("component", "vue"), ("data", "json"), ("markup", "html"), ("script", "js")] {
        assert_eq!(dispatch(&form, canonical).unwrap(), dispatch(&form, alias).unwrap());
    }
}

#[test]
fn exporter_for_reports_its_format() {
    for format in ExportFormat::ALL {
        assert_eq!(exporter_for(format).format(), format);
    }
}

#[test]
fn invalid_forms_fail_before_rendering() {
    let mut form = contact_form();
    form.fields[2].options.clear();
    for format in ExportFormat::ALL {
        let err = dispatch(&form, format.as_str()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidForm(_)), "{format}: {err}");
    }
}

// ============================================================================
// SECTION: Determinism and Ordering
// ============================================================================

#[test]
fn exports_are_deterministic() {
    let form = contact_form();
    let copy = form.clone();
    for format in ExportFormat::ALL {
        assert_eq!(dispatch(&form, format.as_str()).unwrap(), dispatch(&copy, format.as_str()).unwrap());
    }
}

#[test]
fn every_format_keeps_field_order() {
    let form = contact_form();
    for format in ExportFormat::ALL {
        let out = dispatch(&form, format.as_str()).unwrap();
        let positions: Vec<usize> = form
            .fields
            .iter()
            .map(|field| out.find(&format!("\"{}\"", field.key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{format}");
    }
}

#[test]
fn header_order_is_stable_across_insertion_order() {
    let mut first = contact_form();
    first.headers.insert("A-First".to_string(), "a".to_string());
    let mut second = contact_form();
    second.headers.clear();
    second.headers.insert("A-First".to_string(), "a".to_string());
    second.headers.insert("X-Test".to_string(), "1".to_string());
    assert_eq!(dispatch(&first, "script").unwrap(), dispatch(&second, "script").unwrap());
}

// ============================================================================
// SECTION: Escaping
// ============================================================================

#[test]
fn markup_escapes_user_text() {
    let out = dispatch(&hostile_form(), "markup").unwrap();
    assert_eq!(occurrences(&out, "</script>"), 1);
    assert!(!out.contains("<b>"));
    assert!(out.contains("&lt;/script&gt;&lt;b&gt;&quot;Quotes&quot; &amp; &lt;tags&gt;"));
    assert!(out.contains("value=\"a &amp; b\""));
    assert!(out.contains("\\u003c/script\\u003e"));
}

#[test]
fn component_keeps_user_text_in_the_script_block() {
    let out = dispatch(&hostile_form(), "component").unwrap();
    assert_eq!(occurrences(&out, "</script>"), 1);
    assert!(!out.contains("alert(1)</"));
    assert!(out.contains("\"label\": \"Pick \\\"one\\\"\""));
}

#[test]
fn script_never_closes_the_host_script_tag() {
    let out = dispatch(&hostile_form(), "script").unwrap();
    assert!(!out.contains("</script>"));
    assert!(!out.contains("<c>"));
    assert!(out.contains("\\u003cc\\u003e"));
    assert!(out.contains("a \\u0026 b"));
}

#[test]
fn data_preserves_user_text_exactly() {
    let form = hostile_form();
    let restored = parse_data(&dispatch(&form, "data").unwrap()).unwrap();
    assert_eq!(restored, form);
}

// ============================================================================
// SECTION: Validation Fidelity
// ============================================================================

#[test]
fn markup_carries_rules_as_html_attributes() {
    let out = dispatch(&contact_form(), "markup").unwrap();
    assert!(out.contains("<!DOCTYPE html>"));
    assert!(out.contains("<html"));
    assert!(out.contains("    <form>\n"));
    assert!(out.contains("type=\"text\" placeholder=\"\" required minlength=\"2\" maxlength=\"50\">"));
    assert!(out.contains("type=\"number\" placeholder=\"\" min=\"1\" max=\"10\">"));
    assert!(out.contains("\"X-Test\": \"1\""));
    assert!(out.contains("\"Content-Type\": \"application/json\""));
    assert!(out.contains("\"endpoint\": \"https://example.test/api/submit\""));
}

#[test]
fn caller_content_type_is_replaced() {
    let mut form = contact_form();
    form.headers.insert("content-type".to_string(), "text/plain".to_string());
    for format in [ExportFormat::Component, ExportFormat::Markup, ExportFormat::Script] {
        let out = dispatch(&form, format.as_str()).unwrap();
        assert!(!out.contains("text/plain"), "{format}");
        assert!(out.contains("\"Content-Type\": \"application/json\""), "{format}");
    }
}

#[test]
fn component_shape() {
    let out = dispatch(&contact_form(), "component").unwrap();
    assert!(out.contains("<template>"));
    assert!(out.contains("<script>"));
    assert!(out.contains("<style scoped>"));
    assert!(out.contains("\"required\": true"));
    assert!(out.contains("\"measure\": \"length\""));
}

#[test]
fn script_shape() {
    let out = dispatch(&contact_form(), "script").unwrap();
    assert!(out.contains("(function()"));
    assert!(out.contains("DynamicFormLoader"));
    assert!(out.contains("formConfig"));
    assert!(out.contains("window.DynamicFormLoader = DynamicFormLoader;"));
}

#[test]
fn options_flow_into_every_artifact() {
    let options = ExportOptions {
        component_name: "ContactForm".to_string(),
        submit_label: "Send it".to_string(),
        untitled_label: "Nameless".to_string(),
        mount_id: "contact-root".to_string(),
    };
    let mut form = contact_form();
    form.name = "   ".to_string();
    let component = dispatch_with(&form, "component", &options).unwrap();
    assert!(component.contains("name: \"ContactForm\""));
    assert!(component.contains("\"name\": \"Nameless\""));
    let markup = dispatch_with(&form, "markup", &options).unwrap();
    assert!(markup.contains("<title>Nameless</title>"));
    assert!(markup.contains("<main id=\"contact-root\""));
    assert!(markup.contains(">Send it</button>"));
    let script = dispatch_with(&form, "script", &options).unwrap();
    assert!(script.contains("var mountId = \"contact-root\";"));
}
