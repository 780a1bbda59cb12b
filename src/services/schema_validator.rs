//! Schema validator: filters candidate elements against the component schema.
//!
//! `filter` is total. Whatever shape the candidates have, the worst outcome
//! is that an offending element is dropped with a [`Rejection`] diagnostic.
//! Surviving elements keep their original relative order and leave the
//! validator as typed [`UiElement`]s.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::{
    ArgumentType, ArgumentValue, CandidateElement, ComponentDefinition, ComponentSchema,
    Placement, UiElement, UiState,
};
use crate::services::content_guard::DegenerateContentGuard;

/// Why a candidate element was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("malformed element: {0}")]
    Malformed(String),

    #[error("missing element type")]
    MissingType,

    #[error("unknown element type '{0}'")]
    UnknownType(String),

    #[error("missing required argument '{0}'")]
    MissingRequiredArgument(String),

    #[error("argument '{argument}' must be {expected}, got {found}")]
    TypeMismatch {
        argument: String,
        expected: ArgumentType,
        found: &'static str,
    },

    #[error("argument '{argument}' has disallowed value {value}")]
    DisallowedValue { argument: String, value: Value },

    #[error("degenerate content: {0}")]
    DegenerateContent(String),

    #[error("duplicate element id '{0}'")]
    DuplicateId(String),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),
}

impl RejectionReason {
    /// Short machine-friendly name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::MissingType => "missing_type",
            Self::UnknownType(_) => "unknown_type",
            Self::MissingRequiredArgument(_) => "missing_required_argument",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DisallowedValue { .. } => "disallowed_value",
            Self::DegenerateContent(_) => "degenerate_content",
            Self::DuplicateId(_) => "duplicate_id",
            Self::InvalidPlacement(_) => "invalid_placement",
        }
    }
}

/// Diagnostic for one dropped candidate.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("candidate #{index} ({}) rejected: {reason}", .element_type.as_deref().unwrap_or("untyped"))]
pub struct Rejection {
    /// Position in the submitted batch.
    pub index: usize,
    pub element_id: Option<String>,
    pub element_type: Option<String>,
    pub reason: RejectionReason,
}

/// Outcome of one `filter` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub accepted: Vec<UiElement>,
    pub rejections: Vec<Rejection>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Arc<ComponentSchema>,
    guard: DegenerateContentGuard,
}

impl SchemaValidator {
    pub fn new(schema: Arc<ComponentSchema>) -> Self {
        Self {
            schema,
            guard: DegenerateContentGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: DegenerateContentGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn schema(&self) -> &Arc<ComponentSchema> {
        &self.schema
    }

    /// Keep the candidates that satisfy every schema invariant.
    pub fn filter(&self, candidates: Vec<CandidateElement>) -> ValidationReport {
        self.filter_against(candidates, &HashSet::new())
    }

    /// Like [`filter`](Self::filter), treating `existing_ids` as already taken.
    pub fn filter_against(
        &self,
        candidates: Vec<CandidateElement>,
        existing_ids: &HashSet<String>,
    ) -> ValidationReport {
        let mut taken = existing_ids.clone();
        let mut report = ValidationReport::default();

        for (index, candidate) in candidates.into_iter().enumerate() {
            match self.validate_one(index, candidate, &taken) {
                Ok(element) => {
                    taken.insert(element.id.clone());
                    report.accepted.push(element);
                }
                Err(rejection) => {
                    log_rejection(&rejection);
                    report.rejections.push(rejection);
                }
            }
        }

        debug!(
            accepted = report.accepted.len(),
            rejected = report.rejections.len(),
            "Filtered candidate elements"
        );
        report
    }

    /// Validate a single candidate against a set of taken ids.
    pub fn check(
        &self,
        candidate: CandidateElement,
        existing_ids: &HashSet<String>,
    ) -> Result<UiElement, Rejection> {
        self.validate_one(0, candidate, existing_ids)
            .inspect_err(log_rejection)
    }

    /// Re-check a whole UI-State, dropping elements that no longer conform.
    pub fn revalidate(&self, state: &UiState) -> (UiState, Vec<Rejection>) {
        let candidates = state.elements.iter().map(CandidateElement::from).collect();
        let report = self.filter(candidates);
        let revalidated = UiState {
            elements: report.accepted,
            ..state.clone()
        };
        (revalidated, report.rejections)
    }

    fn validate_one(
        &self,
        index: usize,
        candidate: CandidateElement,
        taken: &HashSet<String>,
    ) -> Result<UiElement, Rejection> {
        let reject = |reason| Rejection {
            index,
            element_id: candidate.id.clone(),
            element_type: candidate.element_type.clone(),
            reason,
        };

        if let Some(detail) = &candidate.malformed {
            return Err(reject(RejectionReason::Malformed(detail.clone())));
        }

        let element_type = match candidate.element_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(reject(RejectionReason::MissingType)),
        };

        let Some(definition) = self.schema.get(element_type) else {
            return Err(reject(RejectionReason::UnknownType(element_type.to_string())));
        };

        let arguments = check_arguments(definition, &candidate.arguments).map_err(&reject)?;

        let declared: Map<String, Value> = arguments
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        if let Some(detail) = self.guard.inspect(element_type, &declared) {
            return Err(reject(RejectionReason::DegenerateContent(detail)));
        }

        let placement = match &candidate.placement {
            None => {
                let preferred = definition.space_hint.preferred;
                Placement::new(0, 0, preferred.width(), preferred.height())
            }
            Some(raw) => parse_placement(raw, definition).map_err(&reject)?,
        };

        let id = match &candidate.id {
            Some(id) => id.clone(),
            None => generate_id(element_type),
        };
        if taken.contains(&id) {
            return Err(reject(RejectionReason::DuplicateId(id)));
        }

        Ok(UiElement {
            id,
            element_type: element_type.to_string(),
            arguments,
            placement,
            visible: candidate.visible.unwrap_or(true),
        })
    }
}

fn log_rejection(rejection: &Rejection) {
    warn!(
        index = rejection.index,
        element_id = ?rejection.element_id,
        element_type = ?rejection.element_type,
        reason = %rejection.reason,
        "Dropped candidate element"
    );
}

/// Check declared arguments and convert them; undeclared ones are stripped.
fn check_arguments(
    definition: &ComponentDefinition,
    raw: &Map<String, Value>,
) -> Result<BTreeMap<String, ArgumentValue>, RejectionReason> {
    let mut arguments = BTreeMap::new();

    for (name, spec) in &definition.arguments {
        let value = raw.get(name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if spec.required {
                return Err(RejectionReason::MissingRequiredArgument(name.clone()));
            }
            continue;
        };

        if !spec.arg_type.matches(value) {
            return Err(RejectionReason::TypeMismatch {
                argument: name.clone(),
                expected: spec.arg_type,
                found: ArgumentType::describe(value),
            });
        }
        if spec.required && is_empty_value(value) {
            return Err(RejectionReason::MissingRequiredArgument(name.clone()));
        }
        if !spec.allows(value) {
            return Err(RejectionReason::DisallowedValue {
                argument: name.clone(),
                value: value.clone(),
            });
        }

        if let Some(converted) = ArgumentValue::from_json(value.clone(), spec.arg_type) {
            arguments.insert(name.clone(), converted);
        }
    }

    for name in raw.keys().filter(|k| !definition.arguments.contains_key(*k)) {
        debug!(
            element_type = %definition.name,
            argument = %name,
            "Stripped undeclared argument"
        );
    }

    Ok(arguments)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn parse_placement(raw: &Value, definition: &ComponentDefinition) -> Result<Placement, RejectionReason> {
    let Value::Object(map) = raw else {
        return Err(RejectionReason::InvalidPlacement(format!(
            "expected an object with x, y, w, h, got {}",
            ArgumentType::describe(raw)
        )));
    };

    let member = |name: &str, default: u32| -> Result<u32, RejectionReason> {
        match map.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    RejectionReason::InvalidPlacement(format!(
                        "'{name}' must be a non-negative integer, got {v}"
                    ))
                }),
        }
    };

    let preferred = definition.space_hint.preferred;
    Ok(Placement {
        x: member("x", 0)?,
        y: member("y", 0)?,
        w: member("w", preferred.width())?,
        h: member("h", preferred.height())?,
    })
}

fn generate_id(element_type: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", element_type, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        validate_schema, ArgumentSpec, RawComponentDefinition, RawSpaceHint, SchemaDocument, Size,
    };
    use serde_json::json;

    fn component(name: &str, arguments: Vec<(&str, ArgumentSpec)>) -> RawComponentDefinition {
        RawComponentDefinition {
            name: name.to_string(),
            description: Some(format!("{name} element")),
            arguments: Some(
                arguments
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
            use_cases: Some(vec!["dashboards".to_string()]),
            space_hint: Some(RawSpaceHint {
                min: Some(Size(1, 1)),
                max: Some(Size(12, 8)),
                preferred: Some(Size(3, 2)),
            }),
        }
    }

    fn validator() -> SchemaValidator {
        let schema = validate_schema(SchemaDocument {
            components: vec![
                component(
                    "MetricCard",
                    vec![
                        ("title", ArgumentSpec::required(ArgumentType::Text)),
                        ("value", ArgumentSpec::required(ArgumentType::Text)),
                    ],
                ),
                component(
                    "Chart",
                    vec![
                        (
                            "kind",
                            ArgumentSpec::required(ArgumentType::Text)
                                .with_allowed_values(vec![json!("bar"), json!("line")]),
                        ),
                        ("series", ArgumentSpec::new(ArgumentType::List)),
                        ("stacked", ArgumentSpec::new(ArgumentType::Boolean)),
                    ],
                ),
            ],
        })
        .unwrap();
        SchemaValidator::new(Arc::new(schema))
    }

    fn candidates(value: Value) -> Vec<CandidateElement> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_argument_enforced() {
        let report = validator().filter(candidates(json!([
            {"type": "MetricCard", "arguments": {"title": "Revenue"}},
            {"type": "MetricCard", "arguments": {"title": "Users", "value": "1,204"}}
        ])));
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(
            report.accepted[0].argument("title"),
            Some(&ArgumentValue::Text("Users".to_string()))
        );
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].index, 0);
        assert_eq!(
            report.rejections[0].reason,
            RejectionReason::MissingRequiredArgument("value".to_string())
        );
    }

    #[test]
    fn test_empty_required_text_rejected() {
        let report = validator().filter(candidates(json!([
            {"type": "MetricCard", "arguments": {"title": "  ", "value": "3"}}
        ])));
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejections[0].reason.kind(), "missing_required_argument");
    }

    #[test]
    fn test_unknown_type_dropped_siblings_kept() {
        let report = validator().filter(candidates(json!([
            {"id": "a", "type": "Chart", "arguments": {"kind": "bar"}},
            {"id": "b", "type": "Carousel", "arguments": {}},
            {"id": "c", "type": "Chart", "arguments": {"kind": "line"}}
        ])));
        let ids: Vec<_> = report.accepted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(
            report.rejections[0].reason,
            RejectionReason::UnknownType("Carousel".to_string())
        );
    }

    #[test]
    fn test_type_mismatch_drops_whole_element() {
        let report = validator().filter(candidates(json!([
            {"id": "a", "type": "Chart", "arguments": {"kind": "bar", "stacked": "yes"}},
            {"id": "b", "type": "Chart", "arguments": {"kind": "bar", "stacked": true}}
        ])));
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].id, "b");
        assert!(matches!(
            &report.rejections[0].reason,
            RejectionReason::TypeMismatch { argument, expected: ArgumentType::Boolean, found: "text" }
                if argument == "stacked"
        ));
    }

    #[test]
    fn test_disallowed_value_rejected() {
        let report = validator().filter(candidates(json!([
            {"type": "Chart", "arguments": {"kind": "pie"}}
        ])));
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejections[0].reason.kind(), "disallowed_value");
    }

    #[test]
    fn test_degenerate_content_rejected() {
        let report = validator().filter(candidates(json!([
            {"type": "MetricCard", "arguments": {"title": "Revenue", "value": "$0"}}
        ])));
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejections[0].reason.kind(), "degenerate_content");
    }

    #[test]
    fn test_defaults_applied() {
        let report = validator().filter(candidates(json!([
            {"type": "Chart", "arguments": {"kind": "bar", "stacked": null, "colour": "red"}}
        ])));
        let element = &report.accepted[0];
        assert!(element.id.starts_with("Chart-"));
        assert_eq!(element.id.len(), "Chart-".len() + 8);
        assert_eq!(element.placement, Placement::new(0, 0, 3, 2));
        assert!(element.visible);
        assert!(element.argument("stacked").is_none());
        assert!(element.argument("colour").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let report = validator().filter(candidates(json!([
            {"id": "x", "type": "Chart", "arguments": {"kind": "bar"}},
            {"id": "x", "type": "Chart", "arguments": {"kind": "line"}}
        ])));
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(
            report.rejections[0].reason,
            RejectionReason::DuplicateId("x".to_string())
        );
    }

    #[test]
    fn test_filter_against_existing_ids() {
        let existing = HashSet::from(["x".to_string()]);
        let report = validator().filter_against(
            vec![CandidateElement::new("Chart")
                .with_id("x")
                .with_argument("kind", json!("bar"))],
            &existing,
        );
        assert!(report.accepted.is_empty());
    }

    #[test]
    fn test_invalid_placement_rejected() {
        let report = validator().filter(candidates(json!([
            {"type": "Chart", "arguments": {"kind": "bar"}, "placement": {"x": -1, "y": 0, "w": 2, "h": 2}},
            {"type": "Chart", "arguments": {"kind": "bar"}, "placement": {"x": 1.5, "y": 0}},
            {"type": "Chart", "arguments": {"kind": "bar"}, "placement": "top-left"},
            {"type": "Chart", "arguments": {"kind": "bar"}, "placement": {"x": 4, "y": 1}}
        ])));
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].placement, Placement::new(4, 1, 3, 2));
        assert!(report
            .rejections
            .iter()
            .all(|r| r.reason.kind() == "invalid_placement"));
    }

    #[test]
    fn test_malformed_and_untyped_candidates() {
        let report = validator().filter(candidates(json!([
            "Chart",
            {"arguments": {"kind": "bar"}},
            {"type": "", "arguments": {}},
            null
        ])));
        assert!(report.accepted.is_empty());
        let kinds: Vec<_> = report.rejections.iter().map(|r| r.reason.kind()).collect();
        assert_eq!(kinds, vec!["malformed", "missing_type", "missing_type", "malformed"]);
    }

    #[test]
    fn test_revalidate_drops_nonconforming_elements() {
        let v = validator();
        let report = v.filter(candidates(json!([
            {"id": "a", "type": "Chart", "arguments": {"kind": "bar"}}
        ])));
        let mut state = UiState {
            elements: report.accepted,
            ..UiState::default()
        };
        state.elements.push(UiElement {
            id: "ghost".to_string(),
            element_type: "Retired".to_string(),
            arguments: BTreeMap::new(),
            placement: Placement::default(),
            visible: true,
        });

        let (clean, rejections) = v.revalidate(&state);
        assert_eq!(clean.elements.len(), 1);
        assert_eq!(clean.elements[0].id, "a");
        assert_eq!(rejections.len(), 1);
    }
}
