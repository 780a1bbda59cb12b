//! Candidate elements: unvalidated element proposals.
//!
//! Candidates come from an untrusted backend, so conversion from raw JSON
//! is total. Anything that cannot be interpreted is recorded in
//! `malformed` and left for the validator to reject.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::ArgumentType;
use super::ui_state::{Placement, UiElement};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct CandidateElement {
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub element_type: Option<String>,

    pub arguments: Map<String, Value>,

    /// Raw placement; checked by the validator.
    pub placement: Option<Value>,

    pub visible: Option<bool>,

    /// Set when the raw shape could not be interpreted.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl CandidateElement {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: Some(element_type.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = serde_json::to_value(placement).ok();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }
}

impl From<Value> for CandidateElement {
    fn from(value: Value) -> Self {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Self {
                    malformed: Some(format!(
                        "expected an object, got {}",
                        ArgumentType::describe(&other)
                    )),
                    ..Default::default()
                };
            }
        };

        let mut malformed = None;

        let id = match object.remove("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let element_type = match object.remove("type").or_else(|| object.remove("component")) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                malformed = Some(format!(
                    "element type must be text, got {}",
                    ArgumentType::describe(&other)
                ));
                None
            }
            None => None,
        };

        let arguments = match object.remove("arguments").or_else(|| object.remove("props")) {
            Some(Value::Object(args)) => args,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                malformed = Some(format!(
                    "arguments must be structured, got {}",
                    ArgumentType::describe(&other)
                ));
                Map::new()
            }
        };

        let placement = object.remove("placement").filter(|p| !p.is_null());

        let visible = match object.remove("visible") {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Null) | None => None,
            Some(other) => {
                malformed = Some(format!(
                    "visible must be boolean, got {}",
                    ArgumentType::describe(&other)
                ));
                None
            }
        };

        Self {
            id,
            element_type,
            arguments,
            placement,
            visible,
            malformed,
        }
    }
}

impl From<&UiElement> for CandidateElement {
    fn from(element: &UiElement) -> Self {
        Self {
            id: Some(element.id.clone()),
            element_type: Some(element.element_type.clone()),
            arguments: element
                .arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
            placement: serde_json::to_value(element.placement).ok(),
            visible: Some(element.visible),
            malformed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_object() {
        let c = CandidateElement::from(json!({
            "id": "rev",
            "type": "MetricCard",
            "arguments": {"title": "Revenue"},
            "placement": {"x": 0, "y": 0, "w": 3, "h": 2},
            "visible": false
        }));
        assert_eq!(c.id.as_deref(), Some("rev"));
        assert_eq!(c.element_type.as_deref(), Some("MetricCard"));
        assert_eq!(c.arguments["title"], json!("Revenue"));
        assert_eq!(c.visible, Some(false));
        assert!(c.malformed.is_none());
    }

    #[test]
    fn test_aliases_and_numeric_id() {
        let c = CandidateElement::from(json!({
            "id": 7,
            "component": "Chart",
            "props": {"kind": "bar"}
        }));
        assert_eq!(c.id.as_deref(), Some("7"));
        assert_eq!(c.element_type.as_deref(), Some("Chart"));
        assert_eq!(c.arguments["kind"], json!("bar"));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let c = CandidateElement::from(json!("MetricCard"));
        assert!(c.element_type.is_none());
        assert!(c.malformed.unwrap().contains("expected an object"));
    }

    #[test]
    fn test_bad_arguments_shape_is_malformed() {
        let c = CandidateElement::from(json!({"type": "Chart", "arguments": [1, 2]}));
        assert!(c.malformed.is_some());
    }

    #[test]
    fn test_deserialize_list_is_total() {
        let list: Vec<CandidateElement> =
            serde_json::from_value(json!([{"type": "A"}, 42, null, {"type": 3}])).unwrap();
        assert_eq!(list.len(), 4);
        assert!(list[0].malformed.is_none());
        assert!(list[1].malformed.is_some());
        assert!(list[2].malformed.is_some());
        assert!(list[3].malformed.is_some());
    }
}
