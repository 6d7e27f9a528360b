// crates/formsmith-export/src/script.rs
// ============================================================================
// Module: formsmith Script Export
// Description: Self-invoking loader that builds the form on a host page.
// Purpose: Let third-party pages embed a form with one script tag.
// Dependencies: formsmith-core, crate::{escape, runtime}
// ============================================================================

//! ## Overview
//! The script export is a `(function() { ... })();` loader. It embeds the
//! client configuration as `formConfig`, locates the element with the
//! configured mount id (creating it after the loading script, or at the end of
//! `<body>` when loaded from `<head>`), and builds the form with
//! `createElement`, `setAttribute`, and `textContent`. The loader object is
//! published as `window.DynamicFormLoader`.
//!
//! The `DynamicFormLoader` marker and the `formConfig` name are detected by
//! downstream tooling and must stay verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use formsmith_core::FormDefinition;

use crate::ExportError;
use crate::ExportFormat;
use crate::ExportOptions;
use crate::Exporter;
use crate::escape::js_string;
use crate::escape::script_json;
use crate::runtime::CLIENT_RUNTIME;
use crate::runtime::DOM_RUNTIME;
use crate::runtime::client_config;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Loader marker detected by downstream tooling.
pub const LOADER_MARKER: &str = "DynamicFormLoader";
/// Name of the embedded configuration object.
pub const CONFIG_NAME: &str = "formConfig";

// ============================================================================
// SECTION: Exporter
// ============================================================================

/// Renders the embeddable script loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExporter;

impl Exporter for ScriptExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Script
    }

    fn export(&self, form: &FormDefinition, options: &ExportOptions) -> Result<String, ExportError> {
        form.validate()?;
        let config = script_json(&client_config(form, options))?;

        let mut out = String::new();
        let _ = writeln!(out, "/* formsmith {LOADER_MARKER} */");
        out.push_str("(function() {\n");
        let _ = writeln!(out, "var {CONFIG_NAME} = {config};");
        out.push('\n');
        out.push_str(CLIENT_RUNTIME);
        out.push('\n');
        out.push_str(DOM_RUNTIME);
        out.push('\n');
        let _ = writeln!(out, "var mountId = {};", js_string(&options.mount_id));
        out.push_str(LOADER_BODY);
        out.push_str("})();\n");
        Ok(out)
    }
}

// ============================================================================
// SECTION: Loader Body
// ============================================================================

/// DOM construction and loader object; expects `formConfig` and `mountId`.
const LOADER_BODY: &str = r#"var loaderScript = document.currentScript;

var INPUT_TYPES = { number: 'number', date: 'date', email: 'email', password: 'password', checkbox: 'checkbox' };

function findOrCreateMount() {
  var mount = document.getElementById(mountId);
  if (mount) {
    return mount;
  }
  mount = document.createElement('div');
  mount.id = mountId;
  var parent = loaderScript && loaderScript.parentNode;
  if (parent && parent !== document.head) {
    parent.insertBefore(mount, loaderScript.nextSibling);
  } else {
    document.body.appendChild(mount);
  }
  return mount;
}

function applyAttrs(element, attrs) {
  Object.keys(attrs).forEach(function (name) {
    element.setAttribute(name, attrs[name]);
  });
}

function buildChoices(wrapper, field, index) {
  var inputType = field.type === 'radio' ? 'radio' : 'checkbox';
  field.options.forEach(function (option, optionIndex) {
    var choice = document.createElement('label');
    choice.className = 'form-choice';
    var input = document.createElement('input');
    input.type = inputType;
    input.id = mountId + '-field-' + index + '-' + optionIndex;
    input.name = field.key;
    input.value = option;
    if (inputType === 'radio') {
      applyAttrs(input, field.attrs);
    }
    choice.appendChild(input);
    choice.appendChild(document.createTextNode(' ' + option));
    wrapper.appendChild(choice);
  });
}

function buildControl(field, index) {
  var control;
  if (field.type === 'textarea') {
    control = document.createElement('textarea');
  } else if (field.type === 'select') {
    control = document.createElement('select');
    var prompt = document.createElement('option');
    prompt.value = '';
    prompt.textContent = field.placeholder || 'Select an option';
    control.appendChild(prompt);
    field.options.forEach(function (option) {
      var item = document.createElement('option');
      item.value = option;
      item.textContent = option;
      control.appendChild(item);
    });
  } else {
    control = document.createElement('input');
    control.type = INPUT_TYPES[field.type] || 'text';
  }
  control.id = mountId + '-field-' + index;
  control.name = field.key;
  if (field.placeholder && field.type !== 'select') {
    control.placeholder = field.placeholder;
  }
  applyAttrs(control, field.attrs);
  return control;
}

function buildField(field, index) {
  var wrapper = document.createElement('div');
  wrapper.className = 'form-field';
  wrapper.setAttribute('data-field-index', String(index));
  var isGroup = field.type === 'radio' || (field.type === 'checkbox' && field.options.length > 0);
  var label = document.createElement(isGroup ? 'span' : 'label');
  label.textContent = field.label + (field.rule.required ? ' *' : '');
  if (!isGroup) {
    label.htmlFor = mountId + '-field-' + index;
  }
  wrapper.appendChild(label);
  if (isGroup) {
    buildChoices(wrapper, field, index);
  } else {
    wrapper.appendChild(buildControl(field, index));
  }
  var error = document.createElement('p');
  error.className = 'form-error';
  error.hidden = true;
  wrapper.appendChild(error);
  return wrapper;
}

function buildForm() {
  var form = document.createElement('form');
  form.className = 'generated-form';
  var title = document.createElement('h2');
  title.textContent = formConfig.name;
  form.appendChild(title);
  formConfig.fields.forEach(function (field, index) {
    form.appendChild(buildField(field, index));
  });
  var button = document.createElement('button');
  button.type = 'submit';
  button.className = 'form-submit';
  button.textContent = formConfig.submitLabel;
  form.appendChild(button);
  var status = document.createElement('p');
  status.className = 'form-status';
  status.setAttribute('role', 'status');
  status.hidden = true;
  form.appendChild(status);
  wireForm(form, formConfig);
  return form;
}

var DynamicFormLoader = {
  config: formConfig,
  mounted: false,
  validate: function (values) {
    return collectErrors(formConfig, values);
  },
  submit: function (values) {
    return submitForm(formConfig, buildPayload(formConfig, values));
  },
  mount: function () {
    if (DynamicFormLoader.mounted) {
      return;
    }
    DynamicFormLoader.mounted = true;
    findOrCreateMount().appendChild(buildForm());
  }
};

window.DynamicFormLoader = DynamicFormLoader;

if (document.readyState === 'loading') {
  document.addEventListener('DOMContentLoaded', DynamicFormLoader.mount);
} else {
  DynamicFormLoader.mount();
}
"#;

// ============================================================================
// SECTION: Tests
// ============================================================================
