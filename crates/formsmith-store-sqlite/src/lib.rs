// crates/formsmith-store-sqlite/src/lib.rs
// ============================================================================
// Module: formsmith SQLite Form Store
// Description: Durable FormStore backend using SQLite WAL.
// Purpose: Persist saved form lists as hashed, versioned snapshots.
// Dependencies: formsmith-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`formsmith_core::FormStore`]. Each
//! save appends a canonical JSON snapshot of the whole form list to a version
//! table; loads verify the stored hash and fail closed on corruption.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::FormSetSummary;
pub use store::FormSetVersion;
pub use store::MAX_PAYLOAD_BYTES;
pub use store::SqliteFormStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
