// crates/formsmith-export/src/component.rs
// ============================================================================
// Module: formsmith Component Export
// Description: Vue single-file component renderer.
// Purpose: Reproduce the live preview's render and submit logic as source text.
// Dependencies: formsmith-core, crate::{escape, runtime}
// ============================================================================

//! ## Overview
//! The component export is a Vue 3 single-file component with `<template>`,
//! `<script>`, and `<style scoped>` blocks. All user strings live in the
//! script block's `formDefinition` object, encoded with
//! [`crate::escape::script_json`]. The template only references fields by
//! position (`form.fields[0].label`), so interpolation syntax such as `{{`
//! inside a label stays inert text.
//!
//! The component emits `validation-error` with the failing fields, `submit`
//! with the payload, and `submit-success` / `submit-error` after the network
//! call when the form has an endpoint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;

use crate::ExportError;
use crate::ExportFormat;
use crate::ExportOptions;
use crate::Exporter;
use crate::escape::js_string;
use crate::escape::script_json;
use crate::runtime::CLIENT_RUNTIME;
use crate::runtime::client_config;

// ============================================================================
// SECTION: Exporter
// ============================================================================

/// Renders a Vue single-file component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentExporter;

impl Exporter for ComponentExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Component
    }

    fn export(&self, form: &FormDefinition, options: &ExportOptions) -> Result<String, ExportError> {
        form.validate()?;
        let definition = script_json(&client_config(form, options))?;

        let mut out = String::new();
        out.push_str("<template>\n");
        out.push_str("  <form class=\"generated-form\" novalidate @submit.prevent=\"handleSubmit\">\n");
        out.push_str("    <h2 class=\"form-title\">{{ form.name }}</h2>\n");
        for (index, field) in form.fields.iter().enumerate() {
            render_field(&mut out, index, field);
        }
        out.push_str("    <button type=\"submit\" class=\"form-submit\" :disabled=\"submitting\">{{ form.submitLabel }}</button>\n");
        out.push_str("  </form>\n");
        out.push_str("</template>\n\n");

        out.push_str("<script>\n");
        out.push_str("const formDefinition = ");
        out.push_str(&definition);
        out.push_str(";\n\n");
        out.push_str(CLIENT_RUNTIME);
        out.push('\n');
        out.push_str("export default {\n");
        out.push_str("  name: ");
        out.push_str(&js_string(&options.component_name));
        out.push_str(",\n");
        out.push_str(COMPONENT_BODY);
        out.push_str("};\n");
        out.push_str("</script>\n\n");
        out.push_str(COMPONENT_STYLE);
        Ok(out)
    }
}

// ============================================================================
// SECTION: Template Rendering
// ============================================================================

/// Component options after `name`.
const COMPONENT_BODY: &str = "  emits: ['submit', 'submit-success', 'submit-error', 'validation-error'],
  data() {
    return {
      form: formDefinition,
      values: initialValues(formDefinition),
      errors: {},
      submitting: false
    };
  },
  methods: {
    handleSubmit() {
      const errors = collectErrors(this.form, this.values);
      this.errors = {};
      errors.forEach((error) => {
        this.errors[error.key] = error.message;
      });
      if (errors.length > 0) {
        this.$emit('validation-error', errors);
        return;
      }
      const payload = buildPayload(this.form, this.values);
      this.$emit('submit', payload);
      if (!this.form.endpoint) {
        return;
      }
      this.submitting = true;
      submitForm(this.form, payload)
        .then((data) => {
          this.$emit('submit-success', data);
        })
        .catch((error) => {
          this.$emit('submit-error', error);
        })
        .finally(() => {
          this.submitting = false;
        });
    }
  }
";

/// Scoped styles for the component.
const COMPONENT_STYLE: &str = "<style scoped>
.generated-form { display: flex; flex-direction: column; gap: 1rem; max-width: 32rem; }
.form-field { display: flex; flex-direction: column; gap: 0.25rem; }
.form-label { font-weight: 600; }
.form-choice { display: flex; align-items: center; gap: 0.5rem; }
.form-required { color: #dc2626; }
.form-error { color: #dc2626; font-size: 0.875rem; margin: 0; }
.form-submit { align-self: flex-start; padding: 0.5rem 1rem; }
</style>
";

/// Renders one field block; every user string is read from `form.fields[index]`.
fn render_field(out: &mut String, index: usize, field: &Field) {
    let path = format!("form.fields[{index}]");
    let model = format!("values[{path}.key]");
    let required = format!("<span v-if=\"{path}.rule.required\" class=\"form-required\"> *</span>");
    out.push_str("    <div class=\"form-field\">\n");
    let is_group = matches!(field.field_type, FieldType::Radio)
        || (matches!(field.field_type, FieldType::Checkbox) && field.is_checkbox_group());
    if is_group {
        let _ = writeln!(out, "      <span class=\"form-label\">{{{{ {path}.label }}}}{required}</span>");
    } else {
        let _ = writeln!(out, "      <label for=\"field-{index}\">{{{{ {path}.label }}}}{required}</label>");
    }
    match &field.field_type {
        FieldType::Textarea => {
            let _ = writeln!(
                out,
                "      <textarea id=\"field-{index}\" v-model=\"{model}\" :name=\"{path}.key\" :placeholder=\"{path}.placeholder\" v-bind=\"{path}.attrs\"></textarea>"
            );
        }
        FieldType::Select => {
            let _ = writeln!(
                out,
                "      <select id=\"field-{index}\" v-model=\"{model}\" :name=\"{path}.key\" v-bind=\"{path}.attrs\">"
            );
            let _ = writeln!(
                out,
                "        <option value=\"\" disabled>{{{{ {path}.placeholder || 'Select an option' }}}}</option>"
            );
            let _ = writeln!(
                out,
                "        <option v-for=\"option in {path}.options\" :key=\"option\" :value=\"option\">{{{{ option }}}}</option>"
            );
            out.push_str("      </select>\n");
        }
        FieldType::Radio => render_choices(out, index, &path, &model, "radio"),
        FieldType::Checkbox if field.is_checkbox_group() => {
            render_choices(out, index, &path, &model, "checkbox");
        }
        other => {
            let _ = writeln!(
                out,
                "      <input id=\"field-{index}\" type=\"{input_type}\" v-model=\"{model}\" :name=\"{path}.key\" :placeholder=\"{path}.placeholder\" v-bind=\"{path}.attrs\" />",
                input_type = other.html_input_type()
            );
        }
    }
    let _ = writeln!(
        out,
        "      <p v-if=\"errors[{path}.key]\" class=\"form-error\">{{{{ errors[{path}.key] }}}}</p>"
    );
    out.push_str("    </div>\n");
}

/// Renders a radio or checkbox group.
fn render_choices(out: &mut String, index: usize, path: &str, model: &str, input_type: &str) {
    let _ = writeln!(
        out,
        "      <label v-for=\"(option, optionIndex) in {path}.options\" :key=\"option\" class=\"form-choice\">"
    );
    let _ = writeln!(
        out,
        "        <input :id=\"'field-{index}-' + optionIndex\" type=\"{input_type}\" :name=\"{path}.key\" :value=\"option\" v-model=\"{model}\" />"
    );
    out.push_str("        {{ option }}\n");
    out.push_str("      </label>\n");
}

// ============================================================================
// SECTION: Tests
// ============================================================================
