//! Text-generation gateway.
//!
//! One request/response cycle with a configured [`TextGenerationBackend`]:
//! build the prompt, send it once (no retries), extract the structured
//! payload and hand back a [`LayoutProposal`]. Transport failures come back
//! as a categorized [`GatewayError`]; a reply with no structured payload is
//! a successful prose-only proposal.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::errors::{GatewayError, GatewayErrorCategory};
use crate::domain::models::{
    ArrangementMode, CandidateElement, ComponentSchema, LayoutHints, LayoutProposal,
    ProposalKind, ScreenCapacity, UiState,
};
use crate::domain::ports::{GenerationRequest, TextGenerationBackend};
use crate::services::json_extraction::extract_structured_block;

/// Lifecycle of a single layout request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestPhase {
    #[default]
    Idle,
    Sending,
    ParsedWithCandidates,
    ParsedEmpty,
    Failed(GatewayErrorCategory),
}

/// Request parameters fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayParams {
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GatewayParams {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

const SYSTEM_PROMPT: &str = r#"You design application screens from a fixed catalogue of UI element types.
Only use element types listed in the component schema, and only the arguments they declare.
Provide every required argument with real, meaningful content; never use filler such as "placeholder", "lorem ipsum" or zero values.
Respond with one JSON object of this shape:
{
  "rationale": "one or two sentences explaining the layout",
  "arrangementMode": "grid|flow|absolute",
  "spacing": 16,
  "trackCount": 12,
  "elements": [
    {"id": "unique-id", "type": "ElementType", "arguments": {}, "placement": {"x": 0, "y": 0, "w": 3, "h": 2}, "visible": true}
  ]
}
The layout replaces the whole screen. If you need clarification, answer in plain prose without JSON."#;

pub struct LayoutGateway {
    backend: Arc<dyn TextGenerationBackend>,
    params: GatewayParams,
    phase: watch::Sender<RequestPhase>,
}

impl LayoutGateway {
    pub fn new(backend: Arc<dyn TextGenerationBackend>) -> Self {
        Self::with_params(backend, GatewayParams::default())
    }

    pub fn with_params(backend: Arc<dyn TextGenerationBackend>, params: GatewayParams) -> Self {
        let (phase, _) = watch::channel(RequestPhase::Idle);
        Self {
            backend,
            params,
            phase,
        }
    }

    pub fn backend_id(&self) -> &str {
        self.backend.backend_id()
    }

    pub fn params(&self) -> &GatewayParams {
        &self.params
    }

    /// Current request phase.
    pub fn phase(&self) -> RequestPhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<RequestPhase> {
        self.phase.subscribe()
    }

    /// Ask the backend for a layout.
    ///
    /// Bounded by the configured timeout; expiry is a network failure.
    pub async fn request_layout(
        &self,
        goal: &str,
        state: &UiState,
        schema: &ComponentSchema,
        capacity: ScreenCapacity,
    ) -> Result<LayoutProposal, GatewayError> {
        let request = self.build_request(goal, state, schema, capacity);
        self.phase.send_replace(RequestPhase::Sending);
        info!(
            backend = %self.backend_id(),
            goal_len = goal.len(),
            "Requesting layout from text-generation backend"
        );

        let outcome = match tokio::time::timeout(self.params.timeout, self.backend.generate(request)).await
        {
            Ok(Ok(reply)) => Ok(Self::parse_reply(&reply)),
            Ok(Err(err)) => Err(GatewayError::new(err.category(), err.to_string())),
            Err(_) => Err(GatewayError::network(format!(
                "no reply within {}s",
                self.params.timeout.as_secs_f64()
            ))),
        };

        let terminal = match &outcome {
            Ok(proposal) if proposal.has_candidates() => RequestPhase::ParsedWithCandidates,
            Ok(_) => RequestPhase::ParsedEmpty,
            Err(err) => {
                warn!(
                    backend = %self.backend_id(),
                    category = %err.category(),
                    error = %err.message,
                    "Layout request failed"
                );
                RequestPhase::Failed(err.category())
            }
        };
        self.phase.send_replace(terminal);
        debug!(phase = ?terminal, "Layout request finished");
        self.phase.send_replace(RequestPhase::Idle);

        outcome
    }

    /// Assemble the backend request for a goal.
    pub fn build_request(
        &self,
        goal: &str,
        state: &UiState,
        schema: &ComponentSchema,
        capacity: ScreenCapacity,
    ) -> GenerationRequest {
        let schema_text = serde_json::to_string_pretty(&schema.to_document())
            .unwrap_or_else(|_| "{}".to_string());
        let state_text =
            serde_json::to_string_pretty(&state.summary()).unwrap_or_else(|_| "{}".to_string());

        let prompt = format!(
            r#"## Goal
{goal}

## Component Schema
{schema_text}

## Current UI-State
{state_text}

## Screen Capacity
width: {width} tracks, height: {height} tracks (same units as trackCount and placement)

Design the screen for the goal above. Output ONLY the JSON object."#,
            goal = goal.trim(),
            width = capacity.width,
            height = capacity.height,
        );

        GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        }
    }

    /// Turn a raw reply into a proposal. Never fails.
    pub fn parse_reply(reply: &str) -> LayoutProposal {
        match extract_structured_block(reply) {
            Some(Value::Array(items)) => LayoutProposal {
                kind: ProposalKind::Structured,
                candidates: items.into_iter().map(CandidateElement::from).collect(),
                hints: LayoutHints::default(),
                rationale: None,
            },
            Some(Value::Object(object)) => parse_object(object, reply),
            _ => {
                debug!(reply_len = reply.len(), "Reply carried no structured payload");
                LayoutProposal::prose_only(reply.trim())
            }
        }
    }
}

fn parse_object(mut object: Map<String, Value>, reply: &str) -> LayoutProposal {
    // {"layout": {...}} wraps the real payload
    if let Some(Value::Object(inner)) = object.remove("layout") {
        let rationale = take_rationale(&mut object);
        let mut proposal = parse_object(inner, reply);
        if proposal.rationale.is_none() {
            proposal.rationale = rationale;
        }
        return proposal;
    }

    let elements = object.remove("elements").or_else(|| object.remove("components"));
    let candidates = match elements {
        Some(Value::Array(items)) => items.into_iter().map(CandidateElement::from).collect(),
        Some(Value::Null) => Vec::new(),
        Some(single @ Value::Object(_)) => vec![CandidateElement::from(single)],
        Some(_) => {
            debug!("Structured reply has a non-list elements field; treating as prose");
            return LayoutProposal::prose_only(reply.trim());
        }
        None if object.contains_key("type") || object.contains_key("component") => {
            // a single bare element
            return LayoutProposal {
                kind: ProposalKind::Structured,
                candidates: vec![CandidateElement::from(Value::Object(object))],
                hints: LayoutHints::default(),
                rationale: None,
            };
        }
        None => {
            debug!("Structured reply has no elements; treating as prose");
            return LayoutProposal::prose_only(reply.trim());
        }
    };

    let rationale = take_rationale(&mut object);
    LayoutProposal {
        kind: ProposalKind::Structured,
        candidates,
        hints: take_hints(&mut object),
        rationale,
    }
}

fn take_rationale(object: &mut Map<String, Value>) -> Option<String> {
    ["rationale", "explanation", "message"]
        .into_iter()
        .find_map(|key| match object.remove(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
}

fn take_hints(object: &mut Map<String, Value>) -> LayoutHints {
    let arrangement_mode = object
        .remove("arrangementMode")
        .and_then(|v| v.as_str().and_then(|s| s.parse::<ArrangementMode>().ok()));
    let spacing = object.remove("spacing").and_then(|v| v.as_f64());
    let track_count = object
        .remove("trackCount")
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok());

    LayoutHints {
        arrangement_mode,
        spacing,
        track_count,
    }
}
