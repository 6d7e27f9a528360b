// crates/formsmith-core/src/runtime/store.rs
// ============================================================================
// Module: formsmith In-Memory Store
// Description: Simple in-memory form store for tests and demos.
// Purpose: Provide a deterministic FormStore without external dependencies.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryFormStore`] keeps form lists in a shared map. Clones share the
//! same map, so a test can hand one clone to a library and inspect another.
//! It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::FormDefinition;
use crate::interfaces::FormStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory form store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFormStore {
    /// Form lists keyed by store key.
    entries: Arc<Mutex<BTreeMap<String, Vec<FormDefinition>>>>,
}

impl InMemoryFormStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormStore for InMemoryFormStore {
    fn load(&self, key: &str) -> Result<Option<Vec<FormDefinition>>, StoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StoreError::Store("form store mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn save(&self, key: &str, forms: &[FormDefinition]) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Store("form store mutex poisoned".to_string()))?
            .insert(key.to_string(), forms.to_vec());
        Ok(())
    }
}
