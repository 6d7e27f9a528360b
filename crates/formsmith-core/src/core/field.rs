// crates/formsmith-core/src/core/field.rs
// ============================================================================
// Module: formsmith Field Model
// Description: Field types, validation rule sets, and field definitions.
// Purpose: Describe one input element of a form definition.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Field`] describes one input element: its [`FieldType`], display text,
//! the `required` flag, an optional [`ValidationRules`] set, and the ordered
//! choice list for select, radio, and checkbox-group fields. Field types
//! serialize as their plain string tag; unknown tags are preserved as
//! [`FieldType::Custom`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FieldId;
use crate::core::identifiers::FieldKey;

// ============================================================================
// SECTION: Field Type
// ============================================================================

/// Input element kind.
///
/// # Invariants
/// - Built-in tags never round-trip as [`FieldType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Multi-line text area.
    Textarea,
    /// Numeric input.
    Number,
    /// Drop-down choice.
    Select,
    /// Radio button group.
    Radio,
    /// Single checkbox, or a checkbox group when options are present.
    Checkbox,
    /// Calendar date input.
    Date,
    /// Email address input.
    Email,
    /// Masked password input.
    Password,
    /// Caller-defined field type rendered as a text input.
    Custom(String),
}

impl FieldType {
    /// Built-in field types in palette order.
    pub const BUILTIN: [Self; 9] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::Date,
        Self::Email,
        Self::Password,
    ];

    /// Parses a type tag, mapping unknown tags to [`FieldType::Custom`].
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "email" => Self::Email,
            "password" => Self::Password,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the serialized type tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Email => "email",
            Self::Password => "password",
            Self::Custom(tag) => tag,
        }
    }

    /// Returns true when `min`/`max` bound the string length of the value.
    #[must_use]
    pub const fn is_text_like(&self) -> bool {
        matches!(self, Self::Text | Self::Textarea | Self::Email | Self::Password | Self::Custom(_))
    }

    /// Returns true when the field requires a non-empty options list.
    #[must_use]
    pub const fn requires_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Returns the HTML `type` attribute for input-backed fields.
    ///
    /// Textarea, select, and radio fields render their own elements; the
    /// value returned for them is only a fallback.
    #[must_use]
    pub const fn html_input_type(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
            Self::Password => "password",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Text | Self::Textarea | Self::Select | Self::Custom(_) => "text",
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Custom(tag) => tag,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Validation Rules
// ============================================================================

/// Optional validation rule set attached to a field.
///
/// `min`/`max` bound the string length for text-like fields, the numeric
/// value for number fields, and the selection count for checkbox groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whole-value regular expression for text-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    /// Builds a rule set with length or value bounds.
    #[must_use]
    pub const fn bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            pattern: None,
        }
    }

    /// Returns true when no rule is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none()
    }
}

// ============================================================================
// SECTION: Field
// ============================================================================

/// One input element of a form definition.
///
/// # Invariants
/// - `id` and `key` are non-empty for fields created through [`Field::new`].
/// - `options` order is the caller-visible choice order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Process-unique field identifier.
    pub id: FieldId,
    /// Submission payload key.
    pub key: FieldKey,
    /// Input element kind.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: String,
    /// True when an empty value is rejected.
    #[serde(default)]
    pub required: bool,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Ordered choice values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Field {
    /// Creates a field with a generated id and key.
    #[must_use]
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        let key = FieldKey::generate(field_type.as_str());
        Self {
            id: FieldId::generate(),
            key,
            field_type,
            label: label.into(),
            placeholder: String::new(),
            required: false,
            validation: None,
            options: Vec::new(),
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the required flag.
    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the validation rules.
    #[must_use]
    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    /// Sets the ordered choice values.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true for checkbox fields that carry options.
    #[must_use]
    pub const fn is_checkbox_group(&self) -> bool {
        matches!(self.field_type, FieldType::Checkbox) && !self.options.is_empty()
    }

    /// Returns true when the value is picked from `options`.
    #[must_use]
    pub const fn is_choice(&self) -> bool {
        self.field_type.requires_options() || self.is_checkbox_group()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
