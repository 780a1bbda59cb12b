//! End-to-end goal submission through a scripted backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use adaptui::adapters::backends::ScriptedBackend;
use adaptui::adapters::InMemoryStateStore;
use adaptui::domain::models::{ArgumentValue, ArrangementMode, ScreenCapacity, UiState};
use adaptui::domain::ports::{BackendError, StateStore};
use adaptui::domain::GatewayErrorCategory;
use adaptui::services::{AdaptationReconciler, LayoutGateway, RequestPhase, SubmitOutcome};
use common::{dashboard_schema, metric, scripted_gateway};

const KEY: &str = "dashboard";
const VERSION: &str = "1.0.0";

async fn reconciler_with(
    store: Arc<InMemoryStateStore>,
    gateway: Arc<LayoutGateway>,
) -> AdaptationReconciler {
    AdaptationReconciler::builder(dashboard_schema(), store)
        .storage(KEY, VERSION)
        .gateway(gateway)
        .initialize()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_goal_applies_only_valid_elements() {
    common::setup_test_logging();
    let (backend, gateway) = scripted_gateway();
    backend.push_reply(
        r#"Here is a revenue dashboard:
```json
{
  "rationale": "Two KPIs above a trend chart.",
  "arrangementMode": "grid",
  "trackCount": 8,
  "elements": [
    {"id": "kpi-revenue", "type": "MetricCard", "arguments": {"label": "Revenue", "value": "$1.2M", "trend": "up"}},
    {"id": "kpi-churn", "type": "MetricCard", "arguments": {"label": "Churn", "value": "$0"}},
    {"id": "map", "type": "WorldMap", "arguments": {"region": "EU"}},
    {"id": "trend", "type": "LineChart", "arguments": {"title": "Revenue by month", "points": [1, 2, 3]},
     "placement": {"x": 0, "y": 2, "w": 8, "h": 4}}
  ]
}
```"#,
    );

    let store = Arc::new(InMemoryStateStore::new());
    let reconciler = reconciler_with(store.clone(), gateway).await;

    let outcome = reconciler
        .submit_goal("Show revenue performance", ScreenCapacity::new(8, 12))
        .await;
    let SubmitOutcome::Applied { report, rationale } = outcome else {
        panic!("expected an applied layout, got {outcome:?}");
    };
    assert_eq!(rationale.as_deref(), Some("Two KPIs above a trend chart."));
    assert_eq!(report.accepted.len(), 2);
    assert_eq!(report.rejections.len(), 2);
    let rejected: Vec<_> = report
        .rejections
        .iter()
        .map(|r| (r.element_id.clone().unwrap_or_default(), r.reason.kind()))
        .collect();
    assert!(rejected.contains(&("kpi-churn".to_string(), "degenerate_content")));
    assert!(rejected.contains(&("map".to_string(), "unknown_type")));

    let state = reconciler.snapshot().await;
    assert_eq!(state.track_count, 8);
    assert_eq!(state.elements[0].id, "kpi-revenue");
    assert_eq!(
        state.elements[0].argument("trend"),
        Some(&ArgumentValue::Text("up".to_string()))
    );
    // Missing placement falls back to the preferred size at the origin.
    assert_eq!(state.elements[0].placement.w, 3);
    assert_eq!(state.elements[1].placement.h, 4);

    let status = reconciler.status();
    assert!(!status.is_processing);
    assert!(status.last_error.is_none());

    reconciler.flush().await;
    let record = store.record(KEY, VERSION).await.unwrap();
    assert_eq!(record.state, state);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Show revenue performance"));
    assert!(requests[0].prompt.contains("LineChart"));
    assert!(requests[0].prompt.contains("width: 8 tracks"));
}

#[tokio::test]
async fn test_prose_reply_leaves_state_untouched() {
    let (backend, gateway) = scripted_gateway();
    backend.push_reply("Which quarter should the dashboard cover?");

    let reconciler = reconciler_with(Arc::new(InMemoryStateStore::new()), gateway).await;
    reconciler.add(metric("kpi-users", "Users", "1,204")).await.unwrap();
    let before = reconciler.snapshot().await;

    let outcome = reconciler
        .submit_goal("Make me a dashboard", ScreenCapacity::default())
        .await;
    assert_eq!(
        outcome,
        SubmitOutcome::ProseOnly {
            rationale: "Which quarter should the dashboard cover?".to_string()
        }
    );
    assert_eq!(reconciler.snapshot().await, before);
    assert_eq!(
        reconciler.status().last_rationale.as_deref(),
        Some("Which quarter should the dashboard cover?")
    );
}

#[tokio::test]
async fn test_explicit_empty_layout_clears_screen() {
    let (backend, gateway) = scripted_gateway();
    backend.push_reply(r#"{"rationale": "Nothing fits that goal.", "elements": []}"#);

    let reconciler = reconciler_with(Arc::new(InMemoryStateStore::new()), gateway).await;
    reconciler.add(metric("kpi-users", "Users", "1,204")).await.unwrap();

    let outcome = reconciler.submit_goal("Clear everything", ScreenCapacity::default()).await;
    assert!(matches!(outcome, SubmitOutcome::Applied { .. }));
    assert!(reconciler.snapshot().await.elements.is_empty());
}

#[tokio::test]
async fn test_backend_failure_is_categorized() {
    let (backend, gateway) = scripted_gateway();
    backend.push_error(BackendError::Unauthorized("invalid x-api-key".to_string()));
    backend.push_error(BackendError::QuotaExceeded("rate limited".to_string()));

    let reconciler = reconciler_with(Arc::new(InMemoryStateStore::new()), gateway.clone()).await;
    reconciler.add(metric("kpi-users", "Users", "1,204")).await.unwrap();
    let before = reconciler.snapshot().await;

    let outcome = reconciler.submit_goal("Anything", ScreenCapacity::default()).await;
    let SubmitOutcome::Failed(err) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(err.category(), GatewayErrorCategory::Auth);
    assert_eq!(reconciler.status().last_error, Some(err.user_message()));
    assert_eq!(reconciler.snapshot().await, before);
    assert_eq!(gateway.phase(), RequestPhase::Idle);

    let outcome = reconciler.submit_goal("Again", ScreenCapacity::default()).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(ref e) if e.category() == GatewayErrorCategory::Quota
    ));
}

#[tokio::test]
async fn test_concurrent_submission_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new().with_delay(Duration::from_millis(50)));
    backend.push_reply(r#"[{"type": "TextBlock", "arguments": {"content": "Welcome back, Dana."}}]"#);
    let gateway = Arc::new(LayoutGateway::new(backend.clone()));
    let reconciler = reconciler_with(Arc::new(InMemoryStateStore::new()), gateway).await;

    let (first, second) = tokio::join!(
        reconciler.submit_goal("Greet the user", ScreenCapacity::default()),
        reconciler.submit_goal("Greet the user again", ScreenCapacity::default()),
    );
    assert!(matches!(first, SubmitOutcome::Applied { .. }));
    assert_eq!(second, SubmitOutcome::Busy);
    assert_eq!(backend.requests().len(), 1);
    assert!(!reconciler.is_processing());
}

#[tokio::test]
async fn test_gateway_timeout_is_network_failure() {
    let backend = Arc::new(ScriptedBackend::new().with_delay(Duration::from_millis(200)));
    backend.push_reply("[]");
    let gateway = Arc::new(LayoutGateway::with_params(
        backend,
        adaptui::services::GatewayParams {
            timeout: Duration::from_millis(20),
            ..Default::default()
        },
    ));
    let reconciler = reconciler_with(Arc::new(InMemoryStateStore::new()), gateway).await;

    let outcome = reconciler.submit_goal("Slow", ScreenCapacity::default()).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(ref e) if e.category() == GatewayErrorCategory::Network
    ));
    assert!(!reconciler.is_processing());
}

#[tokio::test]
async fn test_no_gateway() {
    let reconciler = AdaptationReconciler::builder(
        dashboard_schema(),
        Arc::new(InMemoryStateStore::new()),
    )
    .initialize()
    .await
    .unwrap();
    assert_eq!(
        reconciler.submit_goal("Anything", ScreenCapacity::default()).await,
        SubmitOutcome::NoGateway
    );
}

#[tokio::test]
async fn test_reset_restores_default_and_clears_storage() {
    let (backend, gateway) = scripted_gateway();
    backend.push_reply(r#"{"arrangementMode": "flow", "elements": [
        {"type": "TextBlock", "arguments": {"content": "Quarter closed 4% above plan."}}
    ]}"#);

    let mut default_state = UiState::default();
    default_state.elements.push(
        adaptui::SchemaValidator::new(dashboard_schema())
            .filter(vec![metric("kpi-default", "Orders", "312")])
            .accepted
            .remove(0),
    );

    let store = Arc::new(InMemoryStateStore::new());
    let reconciler = AdaptationReconciler::builder(dashboard_schema(), store.clone())
        .storage(KEY, VERSION)
        .default_state(default_state.clone())
        .gateway(gateway)
        .initialize()
        .await
        .unwrap();

    reconciler.submit_goal("Summarize the quarter", ScreenCapacity::default()).await;
    reconciler.flush().await;
    assert_eq!(reconciler.snapshot().await.arrangement_mode, ArrangementMode::Flow);
    assert!(store.exists(KEY).await);

    assert!(reconciler.reset_to_default().await);
    assert_eq!(reconciler.snapshot().await, default_state);
    assert!(!store.exists(KEY).await);
}

#[tokio::test]
async fn test_storage_failure_never_blocks_mutation() {
    let store = Arc::new(InMemoryStateStore::new());
    store.set_available(false);
    let (_backend, gateway) = scripted_gateway();
    let reconciler = reconciler_with(store.clone(), gateway).await;

    reconciler.add(metric("kpi-users", "Users", "1,204")).await.unwrap();
    reconciler.flush().await;
    assert!(reconciler.snapshot().await.contains("kpi-users"));
    assert!(!reconciler.persist_now().await);

    store.set_available(true);
    assert!(reconciler.persist_now().await);
    assert!(store.record(KEY, VERSION).await.is_some());
}
