//! Adaptation reconciler: owns the live UI-State and every mutation of it.
//!
//! Candidates always pass through the [`SchemaValidator`] before touching
//! state. Every mutation except reset queues a best-effort save; reset
//! clears storage through the same ordered queue.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{ArrangementError, GatewayError, SchemaError};
use crate::domain::models::{
    ArrangementMode, CandidateElement, ComponentSchema, LayoutHints, ProposalKind,
    ScreenCapacity, UiElement, UiState,
};
use crate::domain::ports::StateStore;
use crate::services::content_guard::DegenerateContentGuard;
use crate::services::layout_gateway::LayoutGateway;
use crate::services::persistence_worker::PersistenceWorker;
use crate::services::schema_validator::{Rejection, SchemaValidator, ValidationReport};

/// Caller-visible busy/result state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilerStatus {
    pub is_processing: bool,
    pub last_rationale: Option<String>,
    pub last_error: Option<String>,
}

/// Result of [`AdaptationReconciler::submit_goal`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A structured proposal was validated and replaced the screen.
    Applied {
        report: ValidationReport,
        rationale: Option<String>,
    },
    /// The backend answered in prose; UI-State is unchanged.
    ProseOnly { rationale: String },
    /// The backend call failed; UI-State is unchanged.
    Failed(GatewayError),
    /// Another submission is still in flight.
    Busy,
    /// No text-generation backend is configured.
    NoGateway,
}

/// Configures and initializes an [`AdaptationReconciler`].
pub struct ReconcilerBuilder {
    schema: Arc<ComponentSchema>,
    store: Arc<dyn StateStore>,
    default_state: UiState,
    key: String,
    version: String,
    gateway: Option<Arc<LayoutGateway>>,
    guard: DegenerateContentGuard,
}

impl ReconcilerBuilder {
    pub fn default_state(mut self, state: UiState) -> Self {
        self.default_state = state;
        self
    }

    pub fn storage(mut self, key: impl Into<String>, version: impl Into<String>) -> Self {
        self.key = key.into();
        self.version = version.into();
        self
    }

    pub fn gateway(mut self, gateway: Arc<LayoutGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn guard(mut self, guard: DegenerateContentGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Validate the default state, restore persisted state and start the
    /// persistence worker.
    ///
    /// Fails only when the default UI-State does not conform to the schema.
    #[instrument(skip(self), fields(key = %self.key, version = %self.version))]
    pub async fn initialize(self) -> Result<AdaptationReconciler, SchemaError> {
        let validator = SchemaValidator::new(self.schema.clone()).with_guard(self.guard);

        check_arrangement(self.default_state.spacing, self.default_state.track_count)
            .map_err(|e| SchemaError::InvalidDefaultState(e.to_string()))?;
        let (default_state, rejections) = validator.revalidate(&self.default_state);
        if let Some(rejection) = rejections.into_iter().next() {
            return Err(SchemaError::InvalidDefaultElement {
                id: rejection.element_id.unwrap_or_default(),
                reason: rejection.reason.to_string(),
            });
        }

        let state = match self.store.load(&self.key, &self.version).await {
            Some(persisted) => {
                let (mut restored, dropped) = validator.revalidate(&persisted);
                if let Err(e) = check_arrangement(restored.spacing, restored.track_count) {
                    warn!(error = %e, "Persisted arrangement out of range; using default arrangement");
                    restored.spacing = default_state.spacing;
                    restored.track_count = default_state.track_count;
                }
                if !dropped.is_empty() {
                    warn!(
                        dropped = dropped.len(),
                        "Dropped persisted elements that no longer match the schema"
                    );
                }
                info!(elements = restored.elements.len(), "Restored persisted UI-State");
                restored
            }
            None => {
                debug!("No persisted UI-State; starting from default");
                default_state.clone()
            }
        };

        let worker = PersistenceWorker::spawn(self.store.clone(), self.key.clone(), self.version.clone());

        Ok(AdaptationReconciler {
            schema: self.schema,
            validator,
            store: self.store,
            worker,
            gateway: self.gateway,
            key: self.key,
            version: self.version,
            default_state,
            state: RwLock::new(state),
            processing: AtomicBool::new(false),
            outcome: Mutex::new(LastOutcome::default()),
        })
    }
}

#[derive(Debug, Default)]
struct LastOutcome {
    rationale: Option<String>,
    error: Option<String>,
}

/// Clears the processing flag when a submission ends, however it ends.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AdaptationReconciler {
    schema: Arc<ComponentSchema>,
    validator: SchemaValidator,
    store: Arc<dyn StateStore>,
    worker: PersistenceWorker,
    gateway: Option<Arc<LayoutGateway>>,
    key: String,
    version: String,
    default_state: UiState,
    state: RwLock<UiState>,
    processing: AtomicBool,
    outcome: Mutex<LastOutcome>,
}

impl AdaptationReconciler {
    pub fn builder(schema: Arc<ComponentSchema>, store: Arc<dyn StateStore>) -> ReconcilerBuilder {
        ReconcilerBuilder {
            schema,
            store,
            default_state: UiState::default(),
            key: "adaptui_layout".to_string(),
            version: "1.0.0".to_string(),
            gateway: None,
            guard: DegenerateContentGuard::default(),
        }
    }

    pub fn schema(&self) -> &Arc<ComponentSchema> {
        &self.schema
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage_version(&self) -> &str {
        &self.version
    }

    pub fn default_state(&self) -> &UiState {
        &self.default_state
    }

    /// Read-only copy of the live UI-State.
    pub async fn snapshot(&self) -> UiState {
        self.state.read().await.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ReconcilerStatus {
        let outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        ReconcilerStatus {
            is_processing: self.is_processing(),
            last_rationale: outcome.rationale.clone(),
            last_error: outcome.error.clone(),
        }
    }

    /// Validate `candidates` and replace every element with the survivors.
    pub async fn replace_all(
        &self,
        candidates: Vec<CandidateElement>,
        hints: LayoutHints,
    ) -> ValidationReport {
        let report = self.validator.filter(candidates);

        let mut state = self.state.write().await;
        state.elements = report.accepted.clone();
        apply_hints(&mut state, &hints);
        info!(
            elements = state.elements.len(),
            rejected = report.rejections.len(),
            "Replaced UI-State"
        );
        self.worker.save(state.clone());

        report
    }

    /// Validate and append one element.
    pub async fn add(&self, candidate: CandidateElement) -> Result<UiElement, Rejection> {
        let mut state = self.state.write().await;
        let existing: HashSet<String> = state.elements.iter().map(|e| e.id.clone()).collect();
        let element = self.validator.check(candidate, &existing)?;

        debug!(element_id = %element.id, "Added element");
        state.elements.push(element.clone());
        self.worker.save(state.clone());
        Ok(element)
    }

    /// Remove an element. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        let before = state.elements.len();
        state.elements.retain(|e| e.id != id);
        let removed = state.elements.len() != before;

        if removed {
            debug!(element_id = %id, "Removed element");
            self.worker.save(state.clone());
        } else {
            debug!(element_id = %id, "Remove ignored; no such element");
        }
        removed
    }

    /// Merge `partial` into an element's arguments, then re-validate every
    /// element. A `null` value removes the argument.
    ///
    /// Returns `None` when `id` is not on screen.
    pub async fn update(&self, id: &str, partial: Map<String, Value>) -> Option<ValidationReport> {
        let mut state = self.state.write().await;
        if !state.contains(id) {
            debug!(element_id = %id, "Update ignored; no such element");
            return None;
        }

        let candidates = state
            .elements
            .iter()
            .map(|element| {
                let mut candidate = CandidateElement::from(element);
                if element.id == id {
                    for (name, value) in &partial {
                        if value.is_null() {
                            candidate.arguments.remove(name);
                        } else {
                            candidate.arguments.insert(name.clone(), value.clone());
                        }
                    }
                }
                candidate
            })
            .collect();

        let report = self.validator.filter(candidates);
        state.elements = report.accepted.clone();
        debug!(
            element_id = %id,
            dropped = report.rejections.len(),
            "Updated element"
        );
        self.worker.save(state.clone());

        Some(report)
    }

    /// Change arrangement metadata.
    pub async fn set_arrangement(
        &self,
        mode: ArrangementMode,
        spacing: Option<f64>,
        track_count: Option<u32>,
    ) -> Result<(), ArrangementError> {
        let mut state = self.state.write().await;
        check_arrangement(
            spacing.unwrap_or(state.spacing),
            track_count.unwrap_or(state.track_count),
        )?;

        state.arrangement_mode = mode;
        if let Some(spacing) = spacing {
            state.spacing = spacing;
        }
        if let Some(track_count) = track_count {
            state.track_count = track_count;
        }
        self.worker.save(state.clone());
        Ok(())
    }

    /// Restore the default UI-State and clear persisted state.
    ///
    /// Returns whether storage was cleared.
    pub async fn reset_to_default(&self) -> bool {
        let mut state = self.state.write().await;
        *state = self.default_state.clone();
        let cleared = self.worker.clear().await;
        info!(cleared, "Reset UI-State to default");
        cleared
    }

    /// Wait for every queued save to be processed.
    pub async fn flush(&self) {
        self.worker.flush().await;
    }

    /// Durable save of the current state.
    pub async fn persist_now(&self) -> bool {
        self.worker.flush().await;
        let state = self.state.read().await.clone();
        self.store.save(&self.key, &self.version, &state).await
    }

    /// Gateway call, validation and whole-screen replace.
    ///
    /// Returns [`SubmitOutcome::Busy`] while another submission is running.
    #[instrument(skip(self, goal), fields(goal_len = goal.len()))]
    pub async fn submit_goal(&self, goal: &str, capacity: ScreenCapacity) -> SubmitOutcome {
        let Some(gateway) = self.gateway.clone() else {
            return SubmitOutcome::NoGateway;
        };

        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Layout request already in flight; rejecting submission");
            return SubmitOutcome::Busy;
        }
        let _processing = ProcessingGuard(&self.processing);
        self.record(|outcome| outcome.error = None);

        let current = self.snapshot().await;
        let proposal = match gateway
            .request_layout(goal, &current, &self.schema, capacity)
            .await
        {
            Ok(proposal) => proposal,
            Err(err) => {
                self.record(|outcome| outcome.error = Some(err.user_message()));
                return SubmitOutcome::Failed(err);
            }
        };

        match proposal.kind {
            ProposalKind::ProseOnly => {
                let rationale = proposal.rationale.unwrap_or_default();
                info!("Backend answered without a layout; UI-State unchanged");
                self.record(|outcome| outcome.rationale = Some(rationale.clone()));
                SubmitOutcome::ProseOnly { rationale }
            }
            ProposalKind::Structured => {
                let report = self.replace_all(proposal.candidates, proposal.hints).await;
                let rationale = proposal.rationale;
                self.record(|outcome| outcome.rationale = rationale.clone());
                SubmitOutcome::Applied { report, rationale }
            }
        }
    }

    fn record(&self, update: impl FnOnce(&mut LastOutcome)) {
        let mut outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut outcome);
    }
}

fn check_arrangement(spacing: f64, track_count: u32) -> Result<(), ArrangementError> {
    if !spacing.is_finite() || spacing < 0.0 {
        return Err(ArrangementError::InvalidSpacing(spacing));
    }
    if track_count < 1 {
        return Err(ArrangementError::InvalidTrackCount(track_count));
    }
    Ok(())
}

fn apply_hints(state: &mut UiState, hints: &LayoutHints) {
    if let Some(mode) = hints.arrangement_mode {
        state.arrangement_mode = mode;
    }
    match hints.spacing {
        Some(spacing) if check_arrangement(spacing, 1).is_ok() => state.spacing = spacing,
        Some(spacing) => warn!(spacing, "Ignoring invalid spacing hint"),
        None => {}
    }
    match hints.track_count {
        Some(0) => warn!("Ignoring zero track count hint"),
        Some(track_count) => state.track_count = track_count,
        None => {}
    }
}
