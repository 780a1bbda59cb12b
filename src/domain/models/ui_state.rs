//! UI-State: the canonical description of what is on screen.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::schema::ArgumentType;

/// A validated argument value.
///
/// Serialized untagged so the persisted and rendered form is plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Boolean(bool),
    Number(Number),
    Text(String),
    List(Vec<Value>),
    Structured(Map<String, Value>),
}

impl ArgumentValue {
    /// Convert a raw value that is already known to match `arg_type`.
    pub fn from_json(value: Value, arg_type: ArgumentType) -> Option<Self> {
        match (arg_type, value) {
            (ArgumentType::Text, Value::String(s)) => Some(Self::Text(s)),
            (ArgumentType::Number, Value::Number(n)) => Some(Self::Number(n)),
            (ArgumentType::Boolean, Value::Bool(b)) => Some(Self::Boolean(b)),
            (ArgumentType::List, Value::Array(items)) => Some(Self::List(items)),
            (ArgumentType::Structured, Value::Object(map)) => Some(Self::Structured(map)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.clone()),
            Self::Structured(map) => Value::Object(map.clone()),
        }
    }

    pub fn kind(&self) -> ArgumentType {
        match self {
            Self::Boolean(_) => ArgumentType::Boolean,
            Self::Number(_) => ArgumentType::Number,
            Self::Text(_) => ArgumentType::Text,
            Self::List(_) => ArgumentType::List,
            Self::Structured(_) => ArgumentType::Structured,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Position and size in grid-track units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Placement {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

impl FromStr for Placement {
    type Err = String;

    /// Parses `x,y,w,h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid placement '{s}': {e}"))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(format!("placement '{s}' must have four members: x,y,w,h")),
        }
    }
}

/// How the renderer arranges elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrangementMode {
    #[default]
    Grid,
    Flow,
    Absolute,
}

impl ArrangementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Flow => "flow",
            Self::Absolute => "absolute",
        }
    }
}

impl fmt::Display for ArrangementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrangementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "flow" => Ok(Self::Flow),
            "absolute" => Ok(Self::Absolute),
            other => Err(format!(
                "invalid arrangement mode '{other}': expected grid, flow or absolute"
            )),
        }
    }
}

/// A validated element on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    pub id: String,

    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default)]
    pub arguments: BTreeMap<String, ArgumentValue>,

    #[serde(default)]
    pub placement: Placement,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl UiElement {
    pub fn argument(&self, name: &str) -> Option<&ArgumentValue> {
        self.arguments.get(name)
    }
}

/// The live UI-State owned by one reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default)]
    pub elements: Vec<UiElement>,

    #[serde(default)]
    pub arrangement_mode: ArrangementMode,

    #[serde(default = "default_spacing")]
    pub spacing: f64,

    #[serde(default = "default_track_count")]
    pub track_count: u32,
}

const fn default_spacing() -> f64 {
    16.0
}

const fn default_track_count() -> u32 {
    12
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            arrangement_mode: ArrangementMode::default(),
            spacing: default_spacing(),
            track_count: default_track_count(),
        }
    }
}

impl UiState {
    pub fn element(&self, id: &str) -> Option<&UiElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    pub fn visible_elements(&self) -> impl Iterator<Item = &UiElement> {
        self.elements.iter().filter(|e| e.visible)
    }

    /// Compact description of the state for backend prompts.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "arrangementMode": self.arrangement_mode,
            "spacing": self.spacing,
            "trackCount": self.track_count,
            "elements": self.elements.iter().map(|e| serde_json::json!({
                "id": e.id,
                "type": e.element_type,
                "placement": e.placement,
                "visible": e.visible,
                "arguments": e.arguments,
            })).collect::<Vec<_>>(),
        })
    }
}
