//! SQLite-backed persistence across reconciler restarts.

mod common;

use std::sync::Arc;

use adaptui::adapters::sqlite::{database_url, initialize_database, SqliteStateStore};
use adaptui::domain::models::{ArrangementMode, UiState};
use adaptui::domain::ports::StateStore;
use adaptui::infrastructure::SchemaLoader;
use adaptui::services::AdaptationReconciler;
use common::{dashboard_schema, metric, temp_db_path};

async fn open_store(path: &std::path::Path) -> Arc<SqliteStateStore> {
    let pool = initialize_database(&database_url(&path.display().to_string()))
        .await
        .expect("database opens");
    Arc::new(SqliteStateStore::new(pool))
}

#[tokio::test]
async fn test_state_survives_restart() {
    let (_dir, path) = temp_db_path();

    {
        let store = open_store(&path).await;
        let reconciler = AdaptationReconciler::builder(dashboard_schema(), store)
            .storage("sales", "1.0.0")
            .initialize()
            .await
            .unwrap();
        reconciler.add(metric("kpi-revenue", "Revenue", "$1.2M")).await.unwrap();
        reconciler
            .set_arrangement(ArrangementMode::Flow, Some(8.0), None)
            .await
            .unwrap();
        reconciler.flush().await;
    }

    let store = open_store(&path).await;
    let reconciler = AdaptationReconciler::builder(dashboard_schema(), store)
        .storage("sales", "1.0.0")
        .initialize()
        .await
        .unwrap();
    let state = reconciler.snapshot().await;
    assert!(state.contains("kpi-revenue"));
    assert_eq!(state.arrangement_mode, ArrangementMode::Flow);
    assert_eq!(state.spacing, 8.0);
}

#[tokio::test]
async fn test_version_change_discards_saved_state() {
    let (_dir, path) = temp_db_path();
    let store = open_store(&path).await;

    let v1 = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage("sales", "1.0.0")
        .initialize()
        .await
        .unwrap();
    v1.add(metric("kpi-revenue", "Revenue", "$1.2M")).await.unwrap();
    v1.flush().await;
    assert!(store.exists("sales").await);

    let v2 = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage("sales", "2.0.0")
        .initialize()
        .await
        .unwrap();
    assert_eq!(v2.snapshot().await, UiState::default());
    assert!(!store.exists("sales").await, "stale version is deleted on load");
    assert!(store.load("sales", "1.0.0").await.is_none());
}

#[tokio::test]
async fn test_keys_are_independent() {
    let (_dir, path) = temp_db_path();
    let store = open_store(&path).await;

    let sales = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage("sales", "1.0.0")
        .initialize()
        .await
        .unwrap();
    let support = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage("support", "1.0.0")
        .initialize()
        .await
        .unwrap();

    sales.add(metric("kpi-revenue", "Revenue", "$1.2M")).await.unwrap();
    support.add(metric("kpi-tickets", "Open tickets", "42")).await.unwrap();
    sales.flush().await;
    support.flush().await;

    assert!(support.reset_to_default().await);
    assert!(!store.exists("support").await);
    let restored = store.load("sales", "1.0.0").await.unwrap();
    assert!(restored.contains("kpi-revenue"));
}

#[tokio::test]
async fn test_restored_state_is_revalidated_against_current_schema() {
    let (_dir, path) = temp_db_path();
    let store = open_store(&path).await;

    let full = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage("sales", "1.0.0")
        .initialize()
        .await
        .unwrap();
    full.add(metric("kpi-revenue", "Revenue", "$1.2M")).await.unwrap();
    full.add(
        adaptui::CandidateElement::new("TextBlock")
            .with_id("intro")
            .with_argument("content", serde_json::json!("Revenue grew in every region.")),
    )
    .await
    .unwrap();
    full.flush().await;

    let narrower = SchemaLoader::from_str_with_format(
        r#"
components:
  - name: TextBlock
    description: A paragraph of text
    arguments:
      content: { type: text, required: true }
    useCases: [explain the screen]
    spaceHint: { min: [3, 1], max: [12, 6], preferred: [6, 2] }
"#,
        false,
    )
    .unwrap();

    let restarted = AdaptationReconciler::builder(Arc::new(narrower), store)
        .storage("sales", "1.0.0")
        .initialize()
        .await
        .unwrap();
    let state = restarted.snapshot().await;
    assert_eq!(state.elements.len(), 1);
    assert_eq!(state.elements[0].id, "intro");
}
