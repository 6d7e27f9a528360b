// crates/formsmith-export/src/runtime.rs
// ============================================================================
// Module: formsmith Client Runtime
// Description: Shared JavaScript helpers and the client configuration object.
// Purpose: Give every generated artifact the same validation and submit logic.
// Dependencies: formsmith-core, serde_json
// ============================================================================

//! ## Overview
//! Generated artifacts embed two things from this module:
//! - [`client_config`]: the form as a JSON object (`name`, `endpoint`,
//!   `method`, `headers`, `fields`), where each field carries its codec rule
//!   (`rule`) and HTML attributes (`attrs`).
//! - [`CLIENT_RUNTIME`]: plain ES5 functions that read that object.
//!   `validateField(rule, value)` mirrors
//!   [`formsmith_core::ValidationDescriptor::check`] (numeric strings use the
//!   same decimal grammar on both sides), `collectErrors` and
//!   `buildPayload` walk fields in order, and `submitForm(config, values)`
//!   performs the single network call with merged headers and a forced
//!   `Content-Type: application/json`.
//! - [`DOM_RUNTIME`]: form wiring used by the markup page and script loader.

// ============================================================================
// SECTION: Imports
// ============================================================================

use formsmith_core::Field;
use formsmith_core::FormDefinition;
use formsmith_core::ValidationDescriptor;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::ExportOptions;

// ============================================================================
// SECTION: Runtime Source
// ============================================================================

/// Shared client helpers as top-level function declarations.
pub const CLIENT_RUNTIME: &str = r#"var DECIMAL_PATTERN = /^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$/;

function parseDecimal(value) {
  if (typeof value !== 'string') {
    return NaN;
  }
  var text = value.trim();
  return DECIMAL_PATTERN.test(text) ? Number(text) : NaN;
}

function isEmptyValue(value) {
  return value === undefined || value === null || value === '' || value === false ||
    (Array.isArray(value) && value.length === 0);
}

function validateField(rule, value) {
  if (isEmptyValue(value)) {
    return rule.required ? { code: 'required', message: 'this field is required' } : null;
  }
  if (rule.measure === 'length') {
    var text = String(value);
    if (rule.min !== undefined && text.length < rule.min) {
      return { code: 'too_short', message: 'must be at least ' + rule.min + ' characters' };
    }
    if (rule.max !== undefined && text.length > rule.max) {
      return { code: 'too_long', message: 'must be at most ' + rule.max + ' characters' };
    }
    if (rule.pattern !== undefined && !new RegExp('^(?:' + rule.pattern + ')$', 'u').test(text)) {
      return { code: 'pattern_mismatch', message: 'has an invalid format' };
    }
  } else if (rule.measure === 'value') {
    var number = typeof value === 'number' ? value : parseDecimal(value);
    if (!isFinite(number)) {
      return { code: 'not_a_number', message: 'must be a number' };
    }
    if (rule.min !== undefined && number < rule.min) {
      return { code: 'below_minimum', message: 'must be at least ' + rule.min };
    }
    if (rule.max !== undefined && number > rule.max) {
      return { code: 'above_maximum', message: 'must be at most ' + rule.max };
    }
  } else if (rule.measure === 'count') {
    var count = Array.isArray(value) ? value.length : 1;
    if (rule.min !== undefined && count < rule.min) {
      return { code: 'too_few_selected', message: 'select at least ' + rule.min + ' options' };
    }
    if (rule.max !== undefined && count > rule.max) {
      return { code: 'too_many_selected', message: 'select at most ' + rule.max + ' options' };
    }
  }
  return null;
}

function initialValues(config) {
  var values = {};
  config.fields.forEach(function (field) {
    if (field.type === 'checkbox') {
      values[field.key] = field.options.length > 0 ? [] : false;
    } else {
      values[field.key] = '';
    }
  });
  return values;
}

function collectErrors(config, values) {
  var errors = [];
  config.fields.forEach(function (field) {
    var issue = validateField(field.rule, values[field.key]);
    if (issue) {
      errors.push({ key: field.key, label: field.label, code: issue.code, message: issue.message });
    }
  });
  return errors;
}

function buildPayload(config, values) {
  var payload = {};
  config.fields.forEach(function (field) {
    var value = values[field.key];
    if (value !== undefined && value !== null) {
      payload[field.key] = value;
    }
  });
  return payload;
}

function submitForm(config, payload) {
  var headers = {};
  Object.keys(config.headers).forEach(function (name) {
    if (name.toLowerCase() !== 'content-type') {
      headers[name] = config.headers[name];
    }
  });
  headers['Content-Type'] = 'application/json';
  var url = config.endpoint;
  var init = { method: config.method, headers: headers };
  if (config.method === 'GET') {
    var params = new URLSearchParams();
    Object.keys(payload).forEach(function (key) {
      var value = payload[key];
      (Array.isArray(value) ? value : [value]).forEach(function (item) {
        params.append(key, String(item));
      });
    });
    var query = params.toString();
    if (query) {
      url += (url.indexOf('?') === -1 ? '?' : '&') + query;
    }
  } else {
    init.body = JSON.stringify(payload);
  }
  return fetch(url, init).then(function (response) {
    if (!response.ok) {
      throw new Error('submission rejected with status ' + response.status);
    }
    return response.text().then(function (text) {
      try {
        return JSON.parse(text);
      } catch (err) {
        return text;
      }
    });
  });
}
"#;

/// DOM helpers shared by the markup page and the script loader.
///
/// Field containers are found by `data-field-index`; messages are written
/// with `textContent` only.
pub const DOM_RUNTIME: &str = r#"function fieldContainer(form, index) {
  return form.querySelector('[data-field-index="' + index + '"]');
}

function readValues(form, config) {
  var values = {};
  config.fields.forEach(function (field, index) {
    var container = fieldContainer(form, index);
    if (field.type === 'radio') {
      var checked = container.querySelector('input:checked');
      values[field.key] = checked ? checked.value : '';
    } else if (field.type === 'checkbox' && field.options.length > 0) {
      values[field.key] = Array.prototype.map.call(
        container.querySelectorAll('input:checked'),
        function (input) { return input.value; }
      );
    } else if (field.type === 'checkbox') {
      values[field.key] = container.querySelector('input').checked;
    } else {
      values[field.key] = container.querySelector('input, textarea, select').value;
    }
  });
  return values;
}

function showErrors(form, config, errors) {
  config.fields.forEach(function (field, index) {
    var slot = fieldContainer(form, index).querySelector('.form-error');
    slot.textContent = '';
    slot.hidden = true;
  });
  errors.forEach(function (error) {
    var index = config.fields.map(function (field) { return field.key; }).indexOf(error.key);
    var slot = fieldContainer(form, index).querySelector('.form-error');
    slot.textContent = error.message;
    slot.hidden = false;
  });
}

function setStatus(form, message, isError) {
  var status = form.querySelector('.form-status');
  status.textContent = message;
  status.className = isError ? 'form-status is-error' : 'form-status';
  status.hidden = false;
}

function wireForm(form, config) {
  var button = form.querySelector('.form-submit');
  form.addEventListener('submit', function (event) {
    event.preventDefault();
    var values = readValues(form, config);
    var errors = collectErrors(config, values);
    showErrors(form, config, errors);
    if (errors.length > 0) {
      return;
    }
    var payload = buildPayload(config, values);
    if (!config.endpoint) {
      setStatus(form, 'Form is valid.', false);
      return;
    }
    button.disabled = true;
    submitForm(config, payload)
      .then(function () {
        setStatus(form, 'Thank you! Your submission was received.', false);
        form.reset();
      })
      .catch(function (err) {
        setStatus(form, err.message, true);
      })
      .then(function () {
        button.disabled = false;
      });
  });
}
"#;

// ============================================================================
// SECTION: Client Configuration
// ============================================================================

/// Builds the configuration object embedded in generated scripts.
#[must_use]
pub fn client_config(form: &FormDefinition, options: &ExportOptions) -> Value {
    json!({
        "name": options.title_for(form),
        "endpoint": form.endpoint.as_deref().filter(|endpoint| !endpoint.is_empty()),
        "method": form.method.as_str(),
        "headers": form.submission_headers(),
        "submitLabel": options.submit_label,
        "fields": form.fields.iter().map(field_config).collect::<Vec<_>>(),
    })
}

/// Builds the configuration entry for one field.
fn field_config(field: &Field) -> Value {
    let descriptor = ValidationDescriptor::from_field(field);
    json!({
        "key": field.key.as_str(),
        "type": field.field_type.as_str(),
        "label": field.label,
        "placeholder": field.placeholder,
        "options": field.options,
        "rule": descriptor.to_rule_json(),
        "attrs": attribute_map(&descriptor),
    })
}

/// Converts codec HTML attributes to a name/value object; flags map to `""`.
fn attribute_map(descriptor: &ValidationDescriptor) -> Value {
    let attrs: Map<String, Value> = descriptor
        .html_attributes()
        .into_iter()
        .map(|attr| (attr.name.to_string(), Value::String(attr.value.unwrap_or_default())))
        .collect();
    Value::Object(attrs)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use formsmith_core::FieldType;
    use formsmith_core::ValidationRules;

    use super::*;

    #[test]
    fn config_carries_rules_attrs_and_forced_content_type() {
        let mut form = FormDefinition::new("Contact");
        form.fields.push(
            Field::new(FieldType::Text, "Name")
                .with_required(true)
                .with_validation(ValidationRules::bounds(Some(2.0), None)),
        );
        form.headers.insert("content-type".to_string(), "text/plain".to_string());
        let config = client_config(&form, &ExportOptions::default());
        assert_eq!(config["headers"], json!({ "Content-Type": "application/json" }));
        assert_eq!(config["endpoint"], Value::Null);
        assert_eq!(config["fields"][0]["attrs"], json!({ "required": "", "minlength": "2" }));
        assert_eq!(config["fields"][0]["rule"]["measure"], json!("length"));
    }

    #[test]
    fn runtime_never_closes_a_script_block() {
        assert!(!CLIENT_RUNTIME.contains("</"));
        assert!(CLIENT_RUNTIME.contains("function validateField(rule, value)"));
        assert!(CLIENT_RUNTIME.contains("function submitForm(config, payload)"));
        assert!(CLIENT_RUNTIME.contains("')$', 'u')"));
        assert!(!DOM_RUNTIME.contains("</"));
        assert!(!DOM_RUNTIME.contains("innerHTML"));
    }
}
