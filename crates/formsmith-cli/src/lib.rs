// crates/formsmith-cli/src/lib.rs
// ============================================================================
// Module: formsmith CLI Library
// Description: Shared helpers for the formsmith binary.
// Purpose: Expose the message catalog, audit sinks, and file I/O helpers.
// Dependencies: formsmith-config, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `formsmith` binary keeps its command dispatch in `main.rs`; the pieces
//! here are reusable and tested on their own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod i18n;
pub mod output;
