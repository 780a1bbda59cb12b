//! Property tests for the schema validator and schema validation.

mod common;

use std::collections::HashSet;

use adaptui::domain::models::{
    validate_schema, ArgumentSpec, ArgumentType, CandidateElement, RawComponentDefinition,
    RawSpaceHint, SchemaDocument, Size,
};
use adaptui::services::SchemaValidator;
use common::dashboard_schema;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 $%.]{0,12}".prop_map(Value::String),
        Just(json!("MetricCard")),
        Just(json!("TextBlock")),
        Just(json!("LineChart")),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("type".to_string()),
                    Just("id".to_string()),
                    Just("arguments".to_string()),
                    Just("placement".to_string()),
                    Just("label".to_string()),
                    Just("value".to_string()),
                    Just("content".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..5,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Candidates that are mostly well-formed, so acceptance paths are exercised too.
fn arb_candidate() -> impl Strategy<Value = Value> {
    let element_type = prop_oneof![
        Just("MetricCard"),
        Just("TextBlock"),
        Just("LineChart"),
        Just("Unknown")
    ];
    let id = prop::option::of(prop_oneof![Just("a"), Just("b"), Just("c")]);
    (element_type, id, arb_json(), arb_json()).prop_map(|(t, id, label, value)| {
        let mut candidate = json!({
            "type": t,
            "arguments": {"label": label, "value": value, "content": "Revenue grew 4%"},
        });
        if let Some(id) = id {
            candidate["id"] = json!(id);
        }
        candidate
    })
}

proptest! {
    /// Property: filtering never panics and accounts for every candidate.
    #[test]
    fn prop_filter_is_total(raw in prop::collection::vec(prop_oneof![arb_json(), arb_candidate()], 0..12)) {
        let validator = SchemaValidator::new(dashboard_schema());
        let count = raw.len();
        let candidates: Vec<CandidateElement> = raw.into_iter().map(CandidateElement::from).collect();

        let report = validator.filter(candidates);
        prop_assert_eq!(report.accepted.len() + report.rejections.len(), count);
    }

    /// Property: every accepted element conforms to the schema.
    #[test]
    fn prop_accepted_elements_conform(raw in prop::collection::vec(arb_candidate(), 0..12)) {
        let schema = dashboard_schema();
        let validator = SchemaValidator::new(schema.clone());
        let report = validator.filter(raw.into_iter().map(CandidateElement::from).collect());

        let mut ids = HashSet::new();
        for element in &report.accepted {
            prop_assert!(ids.insert(element.id.clone()), "duplicate id {}", element.id);

            let def = schema.get(&element.element_type);
            prop_assert!(def.is_some(), "unknown type {}", element.element_type);
            let def = def.unwrap();

            for (name, spec) in def.required_arguments() {
                let value = element.argument(name);
                prop_assert!(value.is_some(), "missing required {}", name);
                prop_assert_eq!(value.unwrap().kind(), spec.arg_type);
            }
            for (name, value) in &element.arguments {
                let spec = def.argument(name);
                prop_assert!(spec.is_some(), "undeclared argument {}", name);
                prop_assert!(spec.unwrap().allows(&value.to_json()));
            }
        }
    }

    /// Property: revalidating accepted output changes nothing.
    #[test]
    fn prop_revalidation_is_stable(raw in prop::collection::vec(arb_candidate(), 0..8)) {
        let validator = SchemaValidator::new(dashboard_schema());
        let report = validator.filter(raw.into_iter().map(CandidateElement::from).collect());

        let state = adaptui::UiState {
            elements: report.accepted.clone(),
            ..Default::default()
        };
        let (revalidated, dropped) = validator.revalidate(&state);
        prop_assert!(dropped.is_empty());
        prop_assert_eq!(revalidated, state);
    }
}

fn arb_size() -> impl Strategy<Value = Option<Size>> {
    prop::option::weighted(0.9, (1u32..6, 1u32..6).prop_map(|(w, h)| Size(w, h)))
}

fn arb_definition() -> impl Strategy<Value = RawComponentDefinition> {
    (
        prop_oneof![Just("Card"), Just("Chart"), Just("Table"), Just("")],
        prop::option::weighted(0.9, "[a-z ]{0,10}"),
        prop::option::weighted(0.9, prop::collection::btree_map("[a-z]{1,4}", any::<bool>(), 0..3)),
        prop::option::weighted(0.9, prop::collection::vec("[a-z ]{0,8}", 0..3)),
        prop::option::weighted(0.9, (arb_size(), arb_size(), arb_size())),
    )
        .prop_map(|(name, description, arguments, use_cases, hint)| RawComponentDefinition {
            name: name.to_string(),
            description,
            arguments: arguments.map(|args| {
                args.into_iter()
                    .map(|(k, required)| {
                        let spec = if required {
                            ArgumentSpec::required(ArgumentType::Text)
                        } else {
                            ArgumentSpec::new(ArgumentType::Number)
                        };
                        (k, spec)
                    })
                    .collect()
            }),
            use_cases,
            space_hint: hint.map(|(min, max, preferred)| RawSpaceHint { min, max, preferred }),
        })
}

proptest! {
    /// Property: a schema either fails validation or every type is complete,
    /// and validating the re-serialized schema yields the same schema.
    #[test]
    fn prop_schema_validation_is_complete_and_idempotent(
        components in prop::collection::vec(arb_definition(), 0..4)
    ) {
        let Ok(schema) = validate_schema(SchemaDocument { components }) else {
            return Ok(());
        };

        prop_assert!(!schema.is_empty());
        let mut names = HashSet::new();
        for def in schema.definitions() {
            prop_assert!(!def.name.is_empty());
            prop_assert!(names.insert(def.name.clone()));
            prop_assert!(!def.description.trim().is_empty());
            prop_assert!(!def.arguments.is_empty());
            prop_assert!(def.use_cases.iter().any(|c| !c.trim().is_empty()));
        }

        let again = validate_schema(schema.to_document());
        prop_assert_eq!(again.ok(), Some(schema));
    }
}
