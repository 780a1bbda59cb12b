//! Common test utilities for integration tests
//!
//! Shared fixtures: a dashboard component schema, scripted gateways and
//! temporary SQLite files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use adaptui::adapters::backends::ScriptedBackend;
use adaptui::domain::models::{CandidateElement, ComponentSchema};
use adaptui::infrastructure::SchemaLoader;
use adaptui::services::LayoutGateway;

pub const DASHBOARD_SCHEMA: &str = r#"
components:
  - name: MetricCard
    description: A single key figure with a label
    arguments:
      label: { type: text, required: true }
      value: { type: text, required: true }
      trend: { type: text, allowedValues: [up, down, flat] }
    useCases: [highlight one KPI]
    spaceHint: { min: [2, 2], max: [4, 3], preferred: [3, 2] }

  - name: TextBlock
    description: A paragraph of text
    arguments:
      heading: { type: text }
      content: { type: text, required: true }
    useCases: [explain the screen]
    spaceHint: { min: [3, 1], max: [12, 6], preferred: [6, 2] }

  - name: LineChart
    description: A time series chart
    arguments:
      title: { type: text, required: true }
      points: { type: list, required: true }
      smooth: { type: boolean }
    useCases: [show a trend over time]
    spaceHint: { min: [4, 3], max: [12, 8], preferred: [6, 4] }
"#;

/// The dashboard schema used across integration tests.
pub fn dashboard_schema() -> Arc<ComponentSchema> {
    Arc::new(
        SchemaLoader::from_str_with_format(DASHBOARD_SCHEMA, false)
            .expect("dashboard schema is valid"),
    )
}

/// A temporary SQLite database file path.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("state.db");
    (dir, db_path)
}

/// A gateway over a scripted backend, returning both.
pub fn scripted_gateway() -> (Arc<ScriptedBackend>, Arc<LayoutGateway>) {
    let backend = Arc::new(ScriptedBackend::new());
    let gateway = Arc::new(LayoutGateway::new(backend.clone()));
    (backend, gateway)
}

pub fn metric(id: &str, label: &str, value: &str) -> CandidateElement {
    CandidateElement::new("MetricCard")
        .with_id(id)
        .with_argument("label", serde_json::json!(label))
        .with_argument("value", serde_json::json!(value))
}

/// Route test logs through the test writer.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
