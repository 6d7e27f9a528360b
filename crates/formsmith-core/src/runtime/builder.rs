// crates/formsmith-core/src/runtime/builder.rs
// ============================================================================
// Module: formsmith Builder Session
// Description: Editing session over one form definition.
// Purpose: Apply field and settings edits as atomic, validated replacements.
// Dependencies: crate::core, crate::runtime::palette, thiserror
// ============================================================================

//! ## Overview
//! A [`FormBuilder`] owns the form being edited. Every mutation is computed
//! on a copy and validated before it replaces the current form, so a failed
//! edit leaves the session untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::CONTENT_TYPE_HEADER;
use crate::core::Field;
use crate::core::FieldId;
use crate::core::FieldType;
use crate::core::FormDefinition;
use crate::core::FormError;
use crate::core::HttpMethod;
use crate::runtime::palette::ComponentPalette;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Options seeded into new select and radio fields.
const DEFAULT_CHOICES: [&str; 2] = ["Option 1", "Option 2"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Builder edit failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Field index does not exist.
    #[error("field index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current field count.
        len: usize,
    },
    /// Reorder list is not a permutation of the current field ids.
    #[error("field order must list every field id exactly once")]
    NotAPermutation,
    /// Edit would produce an invalid form.
    #[error(transparent)]
    Invalid(#[from] FormError),
}

// ============================================================================
// SECTION: Settings Update
// ============================================================================

/// Partial update of form-level settings; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSettingsUpdate {
    /// New form name.
    pub name: Option<String>,
    /// New endpoint; blank values keep the current endpoint.
    pub endpoint: Option<String>,
    /// New HTTP verb.
    pub method: Option<HttpMethod>,
    /// Replacement header map.
    pub headers: Option<BTreeMap<String, String>>,
}

// ============================================================================
// SECTION: Form Builder
// ============================================================================

/// Editing session over one form definition.
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    /// Form being edited.
    form: FormDefinition,
    /// Components offered for new fields.
    palette: ComponentPalette,
}

impl FormBuilder {
    /// Starts a session on an empty form with the default palette.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session on an existing form.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Invalid`] when the form fails validation.
    pub fn with_form(form: FormDefinition, palette: ComponentPalette) -> Result<Self, BuilderError> {
        form.validate()?;
        Ok(Self {
            form,
            palette,
        })
    }

    /// Returns the form being edited.
    #[must_use]
    pub const fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// Returns the palette.
    #[must_use]
    pub const fn palette(&self) -> &ComponentPalette {
        &self.palette
    }

    /// Ends the session and returns the form.
    #[must_use]
    pub fn into_form(self) -> FormDefinition {
        self.form
    }

    /// Creates a field of the given type with a fresh id and key.
    ///
    /// The label comes from the palette entry, falling back to the type tag.
    #[must_use]
    pub fn create_default_field(&self, field_type: FieldType) -> Field {
        let label = self
            .palette
            .entry(&field_type)
            .map_or_else(|| field_type.as_str().to_string(), |entry| entry.label.clone());
        let seeded = field_type.requires_options();
        let field = Field::new(field_type, label);
        if seeded { field.with_options(DEFAULT_CHOICES) } else { field }
    }

    /// Appends a field.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Invalid`] when the field conflicts with the form.
    pub fn add_field(&mut self, field: Field) -> Result<(), BuilderError> {
        self.apply(|form| {
            form.fields.push(field);
            Ok(())
        })
    }

    /// Replaces the field at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] for unknown indices or invalid results.
    pub fn update_field(&mut self, index: usize, field: Field) -> Result<(), BuilderError> {
        self.apply(|form| {
            let len = form.fields.len();
            let slot = form.fields.get_mut(index).ok_or(BuilderError::IndexOutOfRange {
                index,
                len,
            })?;
            *slot = field;
            Ok(())
        })
    }

    /// Removes and returns the field at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::IndexOutOfRange`] for unknown indices.
    pub fn delete_field(&mut self, index: usize) -> Result<Field, BuilderError> {
        let len = self.form.fields.len();
        if index >= len {
            return Err(BuilderError::IndexOutOfRange {
                index,
                len,
            });
        }
        Ok(self.form.fields.remove(index))
    }

    /// Moves the field at `from` so it ends up at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::IndexOutOfRange`] for unknown indices.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), BuilderError> {
        let len = self.form.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(BuilderError::IndexOutOfRange {
                    index,
                    len,
                });
            }
        }
        let field = self.form.fields.remove(from);
        self.form.fields.insert(to, field);
        Ok(())
    }

    /// Reorders fields to match `order`, which must list every id once.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::NotAPermutation`] otherwise.
    pub fn reorder_fields(&mut self, order: &[FieldId]) -> Result<(), BuilderError> {
        let unique: BTreeSet<&FieldId> = order.iter().collect();
        if order.len() != self.form.fields.len() || unique.len() != order.len() {
            return Err(BuilderError::NotAPermutation);
        }
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let field = self
                .form
                .fields
                .iter()
                .find(|field| &field.id == id)
                .ok_or(BuilderError::NotAPermutation)?;
            reordered.push(field.clone());
        }
        self.form.fields = reordered;
        Ok(())
    }

    /// Applies a partial settings update.
    ///
    /// Caller-supplied `Content-Type` headers are dropped; submissions always
    /// send JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Invalid`] when headers are malformed.
    pub fn update_settings(&mut self, update: FormSettingsUpdate) -> Result<(), BuilderError> {
        self.apply(|form| {
            if let Some(name) = update.name {
                form.name = name;
            }
            if let Some(endpoint) = update.endpoint.filter(|endpoint| !endpoint.trim().is_empty()) {
                form.endpoint = Some(endpoint);
            }
            if let Some(method) = update.method {
                form.method = method;
            }
            if let Some(headers) = update.headers {
                form.headers = headers
                    .into_iter()
                    .filter(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
                    .collect();
            }
            Ok(())
        })
    }

    /// Replaces the session form with an empty, unsaved form.
    pub fn reset(&mut self) {
        self.form = FormDefinition::default();
    }

    /// Runs an edit on a copy and commits it only when the result validates.
    fn apply<F>(&mut self, edit: F) -> Result<(), BuilderError>
    where
        F: FnOnce(&mut FormDefinition) -> Result<(), BuilderError>,
    {
        let mut candidate = self.form.clone();
        edit(&mut candidate)?;
        candidate.validate()?;
        self.form = candidate;
        Ok(())
    }
}
