//! Loading the component schema and the default UI-State from disk.
//!
//! The format is chosen by file extension: `.json` is parsed as JSON,
//! anything else as YAML.

use std::path::Path;
use tracing::{debug, info};

use crate::domain::models::{validate_schema, ComponentSchema, SchemaDocument, UiState};
use crate::domain::SchemaError;

pub struct SchemaLoader;

impl SchemaLoader {
    /// Read and validate a component schema file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<ComponentSchema, SchemaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let schema = Self::from_str_with_format(&contents, is_json(path))?;
        info!(
            path = %path.display(),
            element_types = schema.len(),
            "Loaded component schema"
        );
        Ok(schema)
    }

    /// Parse and validate schema text.
    pub fn from_str_with_format(contents: &str, json: bool) -> Result<ComponentSchema, SchemaError> {
        let document: SchemaDocument = parse(contents, json)?;
        validate_schema(document)
    }

    /// Read a developer-supplied default UI-State.
    ///
    /// Only the shape is checked here. Element validity against the schema
    /// is checked when the reconciler is initialized.
    pub fn load_default_state(path: impl AsRef<Path>) -> Result<UiState, SchemaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let state: UiState = parse(&contents, is_json(path)).map_err(|e| match e {
            SchemaError::Parse(msg) => SchemaError::InvalidDefaultState(msg),
            other => other,
        })?;
        debug!(
            path = %path.display(),
            elements = state.elements.len(),
            "Loaded default UI-State"
        );
        Ok(state)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse<T: serde::de::DeserializeOwned>(contents: &str, json: bool) -> Result<T, SchemaError> {
    if json {
        serde_json::from_str(contents).map_err(|e| SchemaError::Parse(e.to_string()))
    } else {
        serde_yaml::from_str(contents).map_err(|e| SchemaError::Parse(e.to_string()))
    }
}
