//! CLI command implementations.

pub mod element;
pub mod init;
pub mod layout;
pub mod schema;
pub mod submit;

use anyhow::{bail, Context, Result};
use comfy_table::Table;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::cli::output::{list_table, truncate};
use crate::domain::models::{Config, UiElement};
use crate::infrastructure::setup;
use crate::services::{AdaptationReconciler, Rejection};

/// Start a reconciler for one command.
pub(crate) async fn open_reconciler(config: &Config) -> Result<AdaptationReconciler> {
    setup::bootstrap(config)
        .await
        .context("Failed to open UI-State. Run 'adaptui init' first.")
}

/// Parse a `--args` value into an argument map.
pub(crate) fn parse_arguments(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("--args must be a JSON object")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("--args must be a JSON object, got {other}"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub placement: [u32; 4],
    pub visible: bool,
    pub arguments: BTreeMap<String, Value>,
}

impl From<&UiElement> for ElementSummary {
    fn from(element: &UiElement) -> Self {
        let p = element.placement;
        Self {
            id: element.id.clone(),
            element_type: element.element_type.clone(),
            placement: [p.x, p.y, p.w, p.h],
            visible: element.visible,
            arguments: element
                .arguments
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectionSummary {
    pub index: usize,
    pub element_id: Option<String>,
    pub element_type: Option<String>,
    pub kind: &'static str,
    pub message: String,
}

impl From<&Rejection> for RejectionSummary {
    fn from(rejection: &Rejection) -> Self {
        Self {
            index: rejection.index,
            element_id: rejection.element_id.clone(),
            element_type: rejection.element_type.clone(),
            kind: rejection.reason.kind(),
            message: rejection.reason.to_string(),
        }
    }
}

pub(crate) fn elements_table(elements: &[ElementSummary]) -> Table {
    let mut table = list_table(&["id", "type", "placement", "visible", "arguments"]);
    for element in elements {
        let [x, y, w, h] = element.placement;
        let arguments = serde_json::to_string(&element.arguments).unwrap_or_default();
        table.add_row(vec![
            element.id.clone(),
            element.element_type.clone(),
            format!("{x},{y} {w}x{h}"),
            if element.visible { "yes" } else { "no" }.to_string(),
            truncate(&arguments, 60),
        ]);
    }
    table
}

pub(crate) fn rejection_lines(rejections: &[RejectionSummary]) -> Vec<String> {
    rejections
        .iter()
        .map(|r| {
            format!(
                "  - #{} {} ({}): {}",
                r.index,
                r.element_id.as_deref().unwrap_or("-"),
                r.element_type.as_deref().unwrap_or("untyped"),
                r.message
            )
        })
        .collect()
}
