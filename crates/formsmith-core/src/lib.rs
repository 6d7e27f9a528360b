// crates/formsmith-core/src/lib.rs
// ============================================================================
// Module: formsmith Core Library
// Description: Public API surface for the formsmith core.
// Purpose: Expose form model types, interfaces, and authoring runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! formsmith core defines the form definition model consumed by the export
//! engine, the validation codec shared by previews and generated artifacts,
//! and the authoring runtime (builder session, form library, preview). It is
//! storage- and transport-agnostic and integrates through explicit
//! interfaces rather than global state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::FormStore;
pub use interfaces::StoreError;
pub use interfaces::SubmissionRequest;
pub use interfaces::SubmissionResponse;
pub use interfaces::SubmissionTransport;
pub use interfaces::TransportError;
pub use runtime::BuilderError;
pub use runtime::ComponentPalette;
pub use runtime::DEFAULT_LIBRARY_KEY;
pub use runtime::FieldError;
pub use runtime::FormBuilder;
pub use runtime::FormLibrary;
pub use runtime::FormPreview;
pub use runtime::FormSettingsUpdate;
pub use runtime::InMemoryFormStore;
pub use runtime::LibraryError;
pub use runtime::PaletteEntry;
pub use runtime::SubmitError;
pub use runtime::SubmitOutcome;
