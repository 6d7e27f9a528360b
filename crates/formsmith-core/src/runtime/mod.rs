// crates/formsmith-core/src/runtime/mod.rs
// ============================================================================
// Module: formsmith Runtime
// Description: Authoring session, saved form library, and preview engine.
// Purpose: Drive form definitions through building, persistence, and submission.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the stateful parts of form authoring. Each one owns an
//! explicit value or store handle; there is no process-wide registry.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod builder;
pub mod library;
pub mod palette;
pub mod preview;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::BuilderError;
pub use builder::FormBuilder;
pub use builder::FormSettingsUpdate;
pub use library::DEFAULT_LIBRARY_KEY;
pub use library::FormLibrary;
pub use library::LibraryError;
pub use palette::ComponentPalette;
pub use palette::PaletteEntry;
pub use preview::FieldError;
pub use preview::FormPreview;
pub use preview::SubmitError;
pub use preview::SubmitOutcome;
pub use store::InMemoryFormStore;
