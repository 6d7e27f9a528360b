// crates/formsmith-export/tests/data_roundtrip.rs
// ============================================================================
// Module: Data Export Property Tests
// Description: Randomized re-import of data artifacts.
// Purpose: Ensure importing a data export restores an equal form definition.
// Dependencies: formsmith-core, formsmith-export, proptest
// ============================================================================

//! ## Overview
//! Generates forms with built-in field types, integer bounds, and free-form
//! text, then checks that `parse_data` inverts the data exporter.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::HttpMethod;
use formsmith_core::ValidationRules;
use formsmith_export::ExportError;
use formsmith_export::dispatch;
use formsmith_export::parse_data;
use proptest::prelude::*;

fn field_strategy() -> impl Strategy<Value = Field> {
    (
        prop::sample::select(FieldType::BUILTIN.to_vec()),
        "\\PC{0,24}",
        any::<bool>(),
        prop::option::of((0i32..50, 0i32..50)),
        prop::collection::vec("[A-Za-z0-9 <>&\"']{1,12}", 1..4),
    )
        .prop_map(|(field_type, label, required, bounds, options)| {
            let mut field = Field::new(field_type.clone(), label).with_required(required);
            if let Some((min, span)) = bounds {
                field = field.with_validation(ValidationRules::bounds(
                    Some(f64::from(min)),
                    Some(f64::from(min + span)),
                ));
            }
            if field_type.requires_options() {
                field = field.with_options(options);
            }
            field
        })
}

fn form_strategy() -> impl Strategy<Value = FormDefinition> {
    (
        "\\PC{0,32}",
        prop::collection::vec(field_strategy(), 0..8),
        prop::option::of("https://[a-z]{1,10}\\.test/[a-z]{0,8}"),
        prop::sample::select(vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put]),
    )
        .prop_map(|(name, fields, endpoint, method)| {
            let mut form = FormDefinition::new(name);
            form.fields = fields;
            form.endpoint = endpoint;
            form.method = method;
            form
        })
}

proptest! {
    #[test]
    fn data_export_round_trips(form in form_strategy()) {
        let text = dispatch(&form, "data").unwrap();
        let restored = parse_data(&text).unwrap();
        prop_assert_eq!(restored, form);
    }

    #[test]
    fn every_format_renders_generated_forms(form in form_strategy()) {
        for format in ["component", "data", "markup", "script"] {
            let out = dispatch(&form, format).unwrap();
            prop_assert!(!out.is_empty());
        }
    }
}

#[test]
fn custom_types_round_trip_unless_they_shadow_a_builtin() {
    for builtin in FieldType::BUILTIN {
        let mut form = FormDefinition::new("Shadow");
        form.fields.push(Field::new(FieldType::Custom(builtin.as_str().to_string()), "Field"));
        assert!(matches!(dispatch(&form, "data"), Err(ExportError::InvalidForm(_))), "{builtin}");
    }
    let mut form = FormDefinition::new("Signature");
    form.fields.push(Field::new(FieldType::Custom("signature".to_string()), "Sign here"));
    let restored = parse_data(&dispatch(&form, "data").unwrap()).unwrap();
    assert_eq!(restored, form);
}
