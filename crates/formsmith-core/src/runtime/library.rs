// crates/formsmith-core/src/runtime/library.rs
// ============================================================================
// Module: formsmith Form Library
// Description: Saved form list backed by a FormStore.
// Purpose: Load, save, and delete form definitions through an explicit store handle.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! A [`FormLibrary`] mirrors the form list stored under one key. Every
//! mutation persists the whole list first and only then updates the in-memory
//! copy, so a store failure leaves the library as it was.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::FormDefinition;
use crate::core::FormError;
use crate::core::FormId;
use crate::interfaces::FormStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Store key used when none is configured.
pub const DEFAULT_LIBRARY_KEY: &str = "forms";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Library failures.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Form failed validation and was not saved.
    #[error("form rejected: {0}")]
    Invalid(#[from] FormError),
}

// ============================================================================
// SECTION: Form Library
// ============================================================================

/// Saved form list persisted under one store key.
#[derive(Debug)]
pub struct FormLibrary<S> {
    /// Backing store.
    store: S,
    /// Store key.
    key: String,
    /// Current form list.
    forms: Vec<FormDefinition>,
}

impl<S: FormStore> FormLibrary<S> {
    /// Creates an empty library using [`DEFAULT_LIBRARY_KEY`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_LIBRARY_KEY)
    }

    /// Creates an empty library using a custom key.
    #[must_use]
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            forms: Vec::new(),
        }
    }

    /// Returns the store key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replaces the in-memory list with the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] when the store cannot be read.
    pub fn load(&mut self) -> Result<&[FormDefinition], LibraryError> {
        self.forms = self.store.load(&self.key)?.unwrap_or_default();
        Ok(&self.forms)
    }

    /// Returns the saved forms in save order.
    #[must_use]
    pub fn forms(&self) -> &[FormDefinition] {
        &self.forms
    }

    /// Returns the form with the given id.
    #[must_use]
    pub fn get(&self, id: &FormId) -> Option<&FormDefinition> {
        self.forms.iter().find(|form| form.id.as_ref() == Some(id))
    }

    /// Saves a form and returns it with its id set.
    ///
    /// Forms without an id get a generated one and are appended; forms with an
    /// id replace the saved form in place, or are appended when unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError`] when validation or persistence fails.
    pub fn save_form(&mut self, mut form: FormDefinition) -> Result<FormDefinition, LibraryError> {
        form.validate()?;
        let mut next = self.forms.clone();
        let position = form
            .id
            .as_ref()
            .and_then(|id| next.iter().position(|saved| saved.id.as_ref() == Some(id)));
        if form.id.is_none() {
            form.id = Some(FormId::generate());
        }
        match position {
            Some(index) => next[index] = form.clone(),
            None => next.push(form.clone()),
        }
        self.commit(next)?;
        Ok(form)
    }

    /// Deletes the form with the given id; returns true when one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] when persistence fails.
    pub fn delete_form(&mut self, id: &FormId) -> Result<bool, LibraryError> {
        let next: Vec<FormDefinition> =
            self.forms.iter().filter(|form| form.id.as_ref() != Some(id)).cloned().collect();
        let removed = next.len() != self.forms.len();
        self.commit(next)?;
        Ok(removed)
    }

    /// Persists `next` and adopts it as the current list.
    fn commit(&mut self, next: Vec<FormDefinition>) -> Result<(), LibraryError> {
        self.store.save(&self.key, &next)?;
        self.forms = next;
        Ok(())
    }
}
