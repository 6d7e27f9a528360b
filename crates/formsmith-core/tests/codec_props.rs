// crates/formsmith-core/tests/codec_props.rs
// ============================================================================
// Module: Validation Codec Property Tests
// Description: Property-based checks of length and value bounds.
// Purpose: Ensure descriptor checks agree with their declared bounds.
// Dependencies: formsmith-core, proptest
// ============================================================================

//! ## Overview
//! Randomized inputs against the validation codec.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::ValidationDescriptor;
use formsmith_core::ValidationRules;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn ascii_length_check_matches_bounds(
        text in "[a-z]{1,40}",
        min in 0u32..20,
        span in 0u32..20,
    ) {
        let max = min + span;
        let field = Field::new(FieldType::Textarea, "Notes")
            .with_validation(ValidationRules::bounds(Some(f64::from(min)), Some(f64::from(max))));
        let descriptor = ValidationDescriptor::from_field(&field);
        let len = u32::try_from(text.len()).unwrap();
        let expected = len >= min && len <= max;
        prop_assert_eq!(descriptor.check(&json!(text)).is_ok(), expected);
    }

    #[test]
    fn number_check_matches_bounds(value in -1000i32..1000, min in -500i32..0, max in 0i32..500) {
        let field = Field::new(FieldType::Number, "Qty")
            .with_validation(ValidationRules::bounds(Some(f64::from(min)), Some(f64::from(max))));
        let descriptor = ValidationDescriptor::from_field(&field);
        let expected = value >= min && value <= max;
        prop_assert_eq!(descriptor.check(&json!(value)).is_ok(), expected);
        prop_assert_eq!(descriptor.check(&json!(value.to_string())).is_ok(), expected);
    }

    #[test]
    fn optional_fields_accept_empty_input(ty in prop::sample::select(vec![
        FieldType::Text,
        FieldType::Number,
        FieldType::Email,
        FieldType::Date,
    ])) {
        let field = Field::new(ty, "Optional")
            .with_validation(ValidationRules::bounds(Some(3.0), Some(5.0)));
        let descriptor = ValidationDescriptor::from_field(&field);
        prop_assert!(descriptor.check(&json!("")).is_ok());
        prop_assert!(descriptor.check(&serde_json::Value::Null).is_ok());
    }
}
