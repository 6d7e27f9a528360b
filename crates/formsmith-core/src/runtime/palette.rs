// crates/formsmith-core/src/runtime/palette.rs
// ============================================================================
// Module: formsmith Component Palette
// Description: Field components offered to form authors.
// Purpose: Combine default and custom components with an optional allow-list.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The palette lists the nine built-in components followed by any custom
//! components. An optional list of active type keys narrows what is offered
//! without changing the relative order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::FieldType;

// ============================================================================
// SECTION: Palette Entry
// ============================================================================

/// One component offered by the palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Field type created by this component.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label, also used as the default field label.
    pub label: String,
    /// Icon name.
    pub icon: String,
}

impl PaletteEntry {
    /// Creates a palette entry.
    #[must_use]
    pub fn new(field_type: FieldType, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            icon: icon.into(),
        }
    }
}

/// Built-in components as `(type, label, icon)`.
const DEFAULT_COMPONENTS: [(FieldType, &str, &str); 9] = [
    (FieldType::Text, "Text Input", "text-fields"),
    (FieldType::Textarea, "Text Area", "subject"),
    (FieldType::Number, "Number", "filter-9-plus"),
    (FieldType::Select, "Select", "arrow-drop-down-circle"),
    (FieldType::Radio, "Radio", "radio-button-checked"),
    (FieldType::Checkbox, "Checkbox", "check-box"),
    (FieldType::Date, "Date", "date-range"),
    (FieldType::Email, "Email", "email"),
    (FieldType::Password, "Password", "vpn-key"),
];

// ============================================================================
// SECTION: Component Palette
// ============================================================================

/// Ordered set of components available to a builder session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPalette {
    /// Default then custom entries.
    entries: Vec<PaletteEntry>,
    /// Allowed type tags; `None` allows everything.
    active: Option<Vec<String>>,
}

impl Default for ComponentPalette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_COMPONENTS
                .into_iter()
                .map(|(field_type, label, icon)| PaletteEntry::new(field_type, label, icon))
                .collect(),
            active: None,
        }
    }
}

impl ComponentPalette {
    /// Appends custom components after the defaults.
    #[must_use]
    pub fn with_custom(mut self, custom: impl IntoIterator<Item = PaletteEntry>) -> Self {
        self.entries.extend(custom);
        self
    }

    /// Restricts the palette to the given type tags.
    #[must_use]
    pub fn with_active_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the offered components in palette order.
    #[must_use]
    pub fn entries(&self) -> Vec<&PaletteEntry> {
        self.entries.iter().filter(|entry| self.is_active(&entry.field_type)).collect()
    }

    /// Returns the offered component for a field type.
    #[must_use]
    pub fn entry(&self, field_type: &FieldType) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.field_type == field_type && self.is_active(field_type))
    }

    /// Returns true when the type passes the active filter.
    fn is_active(&self, field_type: &FieldType) -> bool {
        self.active
            .as_ref()
            .is_none_or(|keys| keys.iter().any(|key| key == field_type.as_str()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_lists_nine_components_in_order() {
        let palette = ComponentPalette::default();
        let tags: Vec<&str> = palette.entries().iter().map(|entry| entry.field_type.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "text", "textarea", "number", "select", "radio", "checkbox", "date", "email",
                "password"
            ]
        );
    }

    #[test]
    fn active_keys_filter_defaults_and_custom_entries() {
        let palette = ComponentPalette::default()
            .with_custom([PaletteEntry::new(
                FieldType::parse("signature"),
                "Signature",
                "draw",
            )])
            .with_active_keys(["signature", "email", "text"]);
        let labels: Vec<&str> = palette.entries().iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["Text Input", "Email", "Signature"]);
        assert!(palette.entry(&FieldType::Number).is_none());
    }
}
