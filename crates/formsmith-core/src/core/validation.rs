// crates/formsmith-core/src/core/validation.rs
// ============================================================================
// Module: formsmith Validation Codec
// Description: Normalized validation descriptors derived from fields.
// Purpose: Share one rule semantic between previews and generated artifacts.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ValidationDescriptor::from_field`] normalizes a field's `required` flag
//! and [`crate::ValidationRules`] into `{required, measure, min, max,
//! pattern}`. The [`Measure`] records which semantic the bounds carry for the
//! field's type, so every consumer applies the same rule:
//!
//! | Field type                          | Measure  |
//! |-------------------------------------|----------|
//! | text, textarea, email, password, custom | `length` (UTF-16 code units) |
//! | number                              | `value`  |
//! | checkbox with options               | `count`  |
//! | date, select, radio, checkbox       | `none`   |
//!
//! The descriptor has three renderings: [`ValidationDescriptor::check`] for
//! in-process previews, [`ValidationDescriptor::html_attributes`] for markup,
//! and [`ValidationDescriptor::to_rule_json`] for generated script code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::core::field::Field;
use crate::core::field::FieldType;
use crate::core::pattern::compile_pattern;

// ============================================================================
// SECTION: Measure
// ============================================================================

/// Semantic carried by descriptor bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Bounds apply to string length.
    Length,
    /// Bounds apply to the numeric value.
    Value,
    /// Bounds apply to the number of selected options.
    Count,
    /// Bounds do not apply.
    None,
}

impl Measure {
    /// Returns the measure that applies to a field.
    #[must_use]
    pub const fn for_field(field: &Field) -> Self {
        match field.field_type {
            FieldType::Number => Self::Value,
            FieldType::Checkbox if !field.options.is_empty() => Self::Count,
            FieldType::Date | FieldType::Select | FieldType::Radio | FieldType::Checkbox => {
                Self::None
            }
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Password
            | FieldType::Custom(_) => Self::Length,
        }
    }

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Value => "value",
            Self::Count => "count",
            Self::None => "none",
        }
    }
}

// ============================================================================
// SECTION: Issues
// ============================================================================

/// Reason a value fails its descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    /// Required value is empty.
    #[error("this field is required")]
    Required,
    /// String shorter than `min`.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Lower length bound.
        min: f64,
    },
    /// String longer than `max`.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Upper length bound.
        max: f64,
    },
    /// Number below `min`.
    #[error("must be at least {min}")]
    BelowMinimum {
        /// Lower value bound.
        min: f64,
    },
    /// Number above `max`.
    #[error("must be at most {max}")]
    AboveMaximum {
        /// Upper value bound.
        max: f64,
    },
    /// Fewer options selected than `min`.
    #[error("select at least {min} options")]
    TooFewSelected {
        /// Lower count bound.
        min: f64,
    },
    /// More options selected than `max`.
    #[error("select at most {max} options")]
    TooManySelected {
        /// Upper count bound.
        max: f64,
    },
    /// Value is not numeric.
    #[error("must be a number")]
    NotANumber,
    /// Value does not match the pattern.
    #[error("has an invalid format")]
    PatternMismatch,
}

impl ValidationIssue {
    /// Returns the stable machine code shared with generated artifacts.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort {
                ..
            } => "too_short",
            Self::TooLong {
                ..
            } => "too_long",
            Self::BelowMinimum {
                ..
            } => "below_minimum",
            Self::AboveMaximum {
                ..
            } => "above_maximum",
            Self::TooFewSelected {
                ..
            } => "too_few_selected",
            Self::TooManySelected {
                ..
            } => "too_many_selected",
            Self::NotANumber => "not_a_number",
            Self::PatternMismatch => "pattern_mismatch",
        }
    }
}

// ============================================================================
// SECTION: HTML Attributes
// ============================================================================

/// Raw HTML attribute produced by the codec; callers escape `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlAttribute {
    /// Attribute name.
    pub name: &'static str,
    /// Attribute value; `None` for boolean attributes.
    pub value: Option<String>,
}

impl HtmlAttribute {
    /// Boolean attribute.
    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            value: None,
        }
    }

    /// Valued attribute.
    const fn valued(name: &'static str, value: String) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }
}

// ============================================================================
// SECTION: Descriptor
// ============================================================================

/// Normalized validation rule for one field.
///
/// # Invariants
/// - `min`/`max` are `None` whenever `measure` is [`Measure::None`].
/// - `pattern` is only set for [`Measure::Length`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDescriptor {
    /// True when empty input is rejected.
    pub required: bool,
    /// Semantic of the bounds.
    pub measure: Measure,
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whole-value pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationDescriptor {
    /// Derives the descriptor for a field. Pure.
    #[must_use]
    pub fn from_field(field: &Field) -> Self {
        let measure = Measure::for_field(field);
        let rules = field.validation.clone().unwrap_or_default();
        let (min, max) = if measure == Measure::None { (None, None) } else { (rules.min, rules.max) };
        let pattern = if measure == Measure::Length { rules.pattern } else { None };
        Self {
            required: field.required,
            measure,
            min,
            max,
            pattern,
        }
    }

    /// Checks a submitted value against the descriptor.
    ///
    /// Empty values (`null`, `""`, `[]`, `false`) only fail when required.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationIssue`] found.
    pub fn check(&self, value: &Value) -> Result<(), ValidationIssue> {
        if is_empty_value(value) {
            return if self.required { Err(ValidationIssue::Required) } else { Ok(()) };
        }
        match self.measure {
            Measure::Length => self.check_length(value),
            Measure::Value => self.check_value(value),
            Measure::Count => self.check_count(value),
            Measure::None => Ok(()),
        }
    }

    /// Returns the HTML attributes expressing this descriptor.
    ///
    /// Length bounds become `minlength`/`maxlength` (rounded inward to whole
    /// code units), value bounds become `min`/`max`. Count bounds have no
    /// HTML form and are enforced by the generated script only.
    #[must_use]
    pub fn html_attributes(&self) -> Vec<HtmlAttribute> {
        let mut attributes = Vec::new();
        if self.required {
            attributes.push(HtmlAttribute::flag("required"));
        }
        match self.measure {
            Measure::Length => {
                if let Some(min) = self.min.map(f64::ceil).filter(|min| *min >= 0.0) {
                    attributes.push(HtmlAttribute::valued("minlength", format_bound(min)));
                }
                if let Some(max) = self.max.map(f64::floor).filter(|max| *max >= 0.0) {
                    attributes.push(HtmlAttribute::valued("maxlength", format_bound(max)));
                }
                if let Some(pattern) = &self.pattern {
                    attributes.push(HtmlAttribute::valued("pattern", pattern.clone()));
                }
            }
            Measure::Value => {
                if let Some(min) = self.min {
                    attributes.push(HtmlAttribute::valued("min", format_bound(min)));
                }
                if let Some(max) = self.max {
                    attributes.push(HtmlAttribute::valued("max", format_bound(max)));
                }
            }
            Measure::Count | Measure::None => {}
        }
        attributes
    }

    /// Returns the rule object consumed by the generated `validateField`.
    #[must_use]
    pub fn to_rule_json(&self) -> Value {
        let mut rule = Map::new();
        rule.insert("required".to_string(), Value::Bool(self.required));
        rule.insert("measure".to_string(), Value::String(self.measure.as_str().to_string()));
        if let Some(min) = self.min.and_then(Number::from_f64) {
            rule.insert("min".to_string(), Value::Number(min));
        }
        if let Some(max) = self.max.and_then(Number::from_f64) {
            rule.insert("max".to_string(), Value::Number(max));
        }
        if let Some(pattern) = &self.pattern {
            rule.insert("pattern".to_string(), Value::String(pattern.clone()));
        }
        Value::Object(rule)
    }

    /// Checks string length in UTF-16 code units, matching browser semantics.
    fn check_length(&self, value: &Value) -> Result<(), ValidationIssue> {
        let text = value_text(value);
        let length = count_as_f64(text.encode_utf16().count());
        if let Some(min) = self.min
            && length < min
        {
            return Err(ValidationIssue::TooShort {
                min,
            });
        }
        if let Some(max) = self.max
            && length > max
        {
            return Err(ValidationIssue::TooLong {
                max,
            });
        }
        if let Some(pattern) = &self.pattern {
            let matched = compile_pattern(pattern).is_ok_and(|regex| regex.is_match(&text));
            if !matched {
                return Err(ValidationIssue::PatternMismatch);
            }
        }
        Ok(())
    }

    /// Checks numeric bounds; numeric strings are accepted.
    fn check_value(&self, value: &Value) -> Result<(), ValidationIssue> {
        let number = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => {
                text.trim_matches(is_script_space).parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
        .ok_or(ValidationIssue::NotANumber)?;
        if let Some(min) = self.min
            && number < min
        {
            return Err(ValidationIssue::BelowMinimum {
                min,
            });
        }
        if let Some(max) = self.max
            && number > max
        {
            return Err(ValidationIssue::AboveMaximum {
                max,
            });
        }
        Ok(())
    }

    /// Checks the number of selected options.
    fn check_count(&self, value: &Value) -> Result<(), ValidationIssue> {
        let count = match value {
            Value::Array(items) => count_as_f64(items.len()),
            _ => 1.0,
        };
        if let Some(min) = self.min
            && count < min
        {
            return Err(ValidationIssue::TooFewSelected {
                min,
            });
        }
        if let Some(max) = self.max
            && count > max
        {
            return Err(ValidationIssue::TooManySelected {
                max,
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Formats a bound without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_bound(value: f64) -> String {
    format!("{value}")
}

/// Returns true for values treated as "no input".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(true) | Value::Number(_) | Value::Object(_) => false,
    }
}

/// Renders a scalar value as the text a browser input would hold.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Returns true for characters ECMAScript `String.prototype.trim` removes.
const fn is_script_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}' ..= '\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Converts a length to `f64` without lossy casts.
fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
