//! Component schema: the developer-declared catalogue of element types.
//!
//! A schema is read from a [`SchemaDocument`] (every field optional so that
//! missing pieces can be reported precisely) and turned into a validated
//! [`ComponentSchema`] by [`validate_schema`]. The validated schema
//! serializes back into the document shape, so validation is idempotent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::domain::errors::SchemaError;

/// Declared runtime type of an element argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    Text,
    Number,
    Boolean,
    List,
    Structured,
}

impl ArgumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Structured => "structured",
        }
    }

    /// Whether a raw JSON value has this runtime type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::List => value.is_array(),
            Self::Structured => value.is_object(),
        }
    }

    /// Name of the JSON type of `value`, for diagnostics.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "text",
            Value::Array(_) => "list",
            Value::Object(_) => "structured",
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract for a single argument of an element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub arg_type: ArgumentType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl ArgumentSpec {
    pub fn new(arg_type: ArgumentType) -> Self {
        Self {
            arg_type,
            required: false,
            allowed_values: None,
        }
    }

    pub fn required(arg_type: ArgumentType) -> Self {
        Self {
            required: true,
            ..Self::new(arg_type)
        }
    }

    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = Some(values);
        self
    }

    /// True when no allow-list is declared or `value` is on it.
    pub fn allows(&self, value: &Value) -> bool {
        self.allowed_values
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|v| v == value))
    }
}

/// Width and height in grid-track units, serialized as `[w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size(pub u32, pub u32);

impl Size {
    pub fn width(&self) -> u32 {
        self.0
    }

    pub fn height(&self) -> u32 {
        self.1
    }
}

/// Advisory sizing passed through to the backend prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceHint {
    pub min: Size,
    pub max: Size,
    pub preferred: Size,
}

/// A validated element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub name: String,
    pub description: String,
    pub arguments: BTreeMap<String, ArgumentSpec>,
    pub use_cases: Vec<String>,
    pub space_hint: SpaceHint,
}

impl ComponentDefinition {
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.get(name)
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = (&String, &ArgumentSpec)> {
        self.arguments.iter().filter(|(_, spec)| spec.required)
    }
}

/// Space hint as written by the developer, before completeness checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpaceHint {
    #[serde(default)]
    pub min: Option<Size>,
    #[serde(default)]
    pub max: Option<Size>,
    #[serde(default)]
    pub preferred: Option<Size>,
}

/// Element type as written by the developer, before completeness checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponentDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Option<BTreeMap<String, ArgumentSpec>>,
    #[serde(default)]
    pub use_cases: Option<Vec<String>>,
    #[serde(default)]
    pub space_hint: Option<RawSpaceHint>,
}

impl From<&ComponentDefinition> for RawComponentDefinition {
    fn from(def: &ComponentDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: Some(def.description.clone()),
            arguments: Some(def.arguments.clone()),
            use_cases: Some(def.use_cases.clone()),
            space_hint: Some(RawSpaceHint {
                min: Some(def.space_hint.min),
                max: Some(def.space_hint.max),
                preferred: Some(def.space_hint.preferred),
            }),
        }
    }
}

/// Unvalidated schema file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, alias = "elements")]
    pub components: Vec<RawComponentDefinition>,
}

/// The validated, read-only component schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSchema {
    components: Vec<ComponentDefinition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ComponentSchema {
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.components
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            components: self.components.iter().map(RawComponentDefinition::from).collect(),
        }
    }
}

impl TryFrom<SchemaDocument> for ComponentSchema {
    type Error = SchemaError;

    fn try_from(document: SchemaDocument) -> Result<Self, Self::Error> {
        validate_schema(document)
    }
}

/// Validate a schema document. Pure and idempotent.
pub fn validate_schema(document: SchemaDocument) -> Result<ComponentSchema, SchemaError> {
    if document.components.is_empty() {
        return Err(SchemaError::NoElementTypes);
    }

    let mut components = Vec::with_capacity(document.components.len());
    let mut index = HashMap::with_capacity(document.components.len());

    for (position, raw) in document.components.into_iter().enumerate() {
        let definition = validate_definition(position, raw)?;
        if index.insert(definition.name.clone(), position).is_some() {
            return Err(SchemaError::DuplicateElementType(definition.name));
        }
        components.push(definition);
    }

    Ok(ComponentSchema { components, index })
}

fn validate_definition(
    position: usize,
    raw: RawComponentDefinition,
) -> Result<ComponentDefinition, SchemaError> {
    let name = raw.name.trim().to_string();
    if name.is_empty() {
        return Err(SchemaError::MissingName(position));
    }

    let description = match raw.description {
        Some(d) if !d.trim().is_empty() => d,
        _ => return Err(SchemaError::MissingDescription(name)),
    };

    let arguments = match raw.arguments {
        Some(args) if !args.is_empty() => args,
        _ => return Err(SchemaError::MissingArguments(name)),
    };

    let use_cases = match raw.use_cases {
        Some(cases) if cases.iter().any(|c| !c.trim().is_empty()) => cases,
        _ => return Err(SchemaError::MissingUseCases(name)),
    };

    let hint = raw
        .space_hint
        .ok_or_else(|| SchemaError::MissingSpaceHint(name.clone()))?;
    let incomplete = |field| SchemaError::IncompleteSpaceHint {
        component: name.clone(),
        field,
    };
    let space_hint = SpaceHint {
        min: hint.min.ok_or_else(|| incomplete("min"))?,
        max: hint.max.ok_or_else(|| incomplete("max"))?,
        preferred: hint.preferred.ok_or_else(|| incomplete("preferred"))?,
    };

    for (arg_name, spec) in &arguments {
        if let Some(allowed) = &spec.allowed_values {
            if allowed.is_empty() {
                return Err(SchemaError::EmptyAllowedValues {
                    component: name.clone(),
                    argument: arg_name.clone(),
                });
            }
            if !allowed.iter().all(|v| spec.arg_type.matches(v)) {
                return Err(SchemaError::InvalidAllowedValue {
                    component: name.clone(),
                    argument: arg_name.clone(),
                    expected: spec.arg_type.as_str(),
                });
            }
        }
    }

    Ok(ComponentDefinition {
        name,
        description,
        arguments,
        use_cases,
        space_hint,
    })
}
