// crates/formsmith-export/src/markup.rs
// ============================================================================
// Module: formsmith Markup Export
// Description: Standalone HTML page renderer.
// Purpose: Emit a self-contained page with static fields and an inline submit handler.
// Dependencies: formsmith-core, crate::{escape, runtime}
// ============================================================================

//! ## Overview
//! The markup export is a complete HTML document. Fields are rendered as
//! static, HTML-escaped elements that carry the codec's HTML attributes
//! (`required`, `minlength`, `min`, ...), so the browser enforces the same
//! rules before the inline script runs. The inline script embeds the client
//! configuration as `formConfig` plus the shared runtime, validates again on
//! submit, and performs the JSON submission.
//!
//! Field containers are addressed by `data-field-index`, never by user text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::HtmlAttribute;
use formsmith_core::ValidationDescriptor;

use crate::ExportError;
use crate::ExportFormat;
use crate::ExportOptions;
use crate::Exporter;
use crate::escape::html_attr;
use crate::escape::html_text;
use crate::escape::js_string;
use crate::escape::script_json;
use crate::runtime::CLIENT_RUNTIME;
use crate::runtime::DOM_RUNTIME;
use crate::runtime::client_config;

// ============================================================================
// SECTION: Exporter
// ============================================================================

/// Renders a standalone HTML page.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupExporter;

impl Exporter for MarkupExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Markup
    }

    fn export(&self, form: &FormDefinition, options: &ExportOptions) -> Result<String, ExportError> {
        form.validate()?;
        let config = script_json(&client_config(form, options))?;
        let title = html_text(options.title_for(form));

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\">\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(out, "  <title>{title}</title>");
        out.push_str(PAGE_STYLE);
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        let _ = writeln!(
            out,
            "  <main id=\"{}\" class=\"generated-form\">",
            html_attr(&options.mount_id)
        );
        let _ = writeln!(out, "    <h1>{title}</h1>");
        out.push_str("    <form>\n");
        for (index, field) in form.fields.iter().enumerate() {
            render_field(&mut out, index, field);
        }
        let _ = writeln!(
            out,
            "      <button type=\"submit\" class=\"form-submit\">{}</button>",
            html_text(&options.submit_label)
        );
        out.push_str("      <p class=\"form-status\" role=\"status\" hidden></p>\n");
        out.push_str("    </form>\n");
        out.push_str("  </main>\n");
        out.push_str("  <script>\n");
        out.push_str("(function () {\n");
        out.push_str("var formConfig = ");
        out.push_str(&config);
        out.push_str(";\n\n");
        out.push_str(CLIENT_RUNTIME);
        out.push('\n');
        out.push_str(DOM_RUNTIME);
        out.push('\n');
        let _ = writeln!(
            out,
            "wireForm(document.getElementById({}).querySelector('form'), formConfig);",
            js_string(&options.mount_id)
        );
        out.push_str("})();\n");
        out.push_str("  </script>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        Ok(out)
    }
}

// ============================================================================
// SECTION: Static Blocks
// ============================================================================

/// Inline page styles.
const PAGE_STYLE: &str = "  <style>
    body { font-family: system-ui, sans-serif; background: #f9fafb; margin: 0; padding: 2rem; }
    .generated-form { max-width: 32rem; margin: 0 auto; background: #fff; padding: 2rem; border-radius: 0.5rem; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
    .generated-form form { display: flex; flex-direction: column; gap: 1rem; }
    .form-field { display: flex; flex-direction: column; gap: 0.25rem; }
    .form-field input, .form-field textarea, .form-field select { padding: 0.5rem; border: 1px solid #d1d5db; border-radius: 0.375rem; font: inherit; }
    .form-choice { display: flex; align-items: center; gap: 0.5rem; }
    .form-required, .form-error { color: #dc2626; }
    .form-error { font-size: 0.875rem; margin: 0; }
    .form-submit { align-self: flex-start; padding: 0.5rem 1rem; border: 0; border-radius: 0.375rem; background: #2563eb; color: #fff; cursor: pointer; }
    .form-status { margin: 0; }
    .form-status.is-error { color: #dc2626; }
  </style>
";

// ============================================================================
// SECTION: Field Rendering
// ============================================================================

/// Renders one static field block.
fn render_field(out: &mut String, index: usize, field: &Field) {
    let descriptor = ValidationDescriptor::from_field(field);
    let attributes = descriptor.html_attributes();
    let name = html_attr(field.key.as_str());
    let _ = writeln!(out, "      <div class=\"form-field\" data-field-index=\"{index}\">");
    let marker = if field.required { "<span class=\"form-required\"> *</span>" } else { "" };
    if field.is_choice() {
        let _ = writeln!(out, "        <span class=\"form-label\">{}{marker}</span>", html_text(&field.label));
    } else {
        let _ = writeln!(
            out,
            "        <label for=\"field-{index}\">{}{marker}</label>",
            html_text(&field.label)
        );
    }
    let placeholder = html_attr(&field.placeholder);
    match &field.field_type {
        FieldType::Textarea => {
            let _ = writeln!(
                out,
                "        <textarea id=\"field-{index}\" name=\"{name}\" placeholder=\"{placeholder}\"{}></textarea>",
                render_attributes(&attributes)
            );
        }
        FieldType::Select => {
            let _ = writeln!(
                out,
                "        <select id=\"field-{index}\" name=\"{name}\"{}>",
                render_attributes(&attributes)
            );
            let prompt = if field.placeholder.is_empty() { "Select an option" } else { field.placeholder.as_str() };
            let _ = writeln!(out, "          <option value=\"\">{}</option>", html_text(prompt));
            for option in &field.options {
                let _ = writeln!(
                    out,
                    "          <option value=\"{}\">{}</option>",
                    html_attr(option),
                    html_text(option)
                );
            }
            out.push_str("        </select>\n");
        }
        FieldType::Radio | FieldType::Checkbox if field.is_choice() => {
            let input_type = field.field_type.html_input_type();
            // `required` on a checkbox group would demand every box.
            let required = if matches!(field.field_type, FieldType::Radio) {
                render_attributes(&attributes)
            } else {
                String::new()
            };
            for (option_index, option) in field.options.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "        <label class=\"form-choice\"><input id=\"field-{index}-{option_index}\" type=\"{input_type}\" name=\"{name}\" value=\"{}\"{required}> {}</label>",
                    html_attr(option),
                    html_text(option)
                );
            }
        }
        other => {
            let _ = writeln!(
                out,
                "        <input id=\"field-{index}\" name=\"{name}\" type=\"{}\" placeholder=\"{placeholder}\"{}>",
                other.html_input_type(),
                render_attributes(&attributes)
            );
        }
    }
    out.push_str("        <p class=\"form-error\" hidden></p>\n");
    out.push_str("      </div>\n");
}

/// Renders codec attributes with a leading space each.
fn render_attributes(attributes: &[HtmlAttribute]) -> String {
    let mut out = String::new();
    for attribute in attributes {
        match &attribute.value {
            Some(value) => {
                let _ = write!(out, " {}=\"{}\"", attribute.name, html_attr(value));
            }
            None => {
                let _ = write!(out, " {}", attribute.name);
            }
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
