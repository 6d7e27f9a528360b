// crates/formsmith-config/src/lib.rs
// ============================================================================
// Module: formsmith Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for formsmith.toml semantics.
// Dependencies: formsmith-core, formsmith-export, formsmith-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `formsmith-config` defines the configuration model consumed by the
//! `formsmith` CLI. Loading is strict and fail-closed: unknown keys, oversized
//! files, and out-of-range limits are rejected before any command runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
