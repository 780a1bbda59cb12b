//! Layout proposals returned by the text-generation gateway.

use serde::{Deserialize, Serialize};

use super::candidate::CandidateElement;
use super::ui_state::ArrangementMode;

/// Screen capacity in grid-track units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCapacity {
    pub width: u32,
    pub height: u32,
}

impl ScreenCapacity {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ScreenCapacity {
    fn default() -> Self {
        Self {
            width: 12,
            height: 24,
        }
    }
}

/// Optional arrangement metadata accompanying a proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrangement_mode: Option<ArrangementMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
}

impl LayoutHints {
    pub fn is_empty(&self) -> bool {
        self.arrangement_mode.is_none() && self.spacing.is_none() && self.track_count.is_none()
    }
}

/// Whether the backend reply carried a structured payload at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    /// A structured block was found; `candidates` may still be empty.
    Structured,
    /// Prose only. Must not touch UI-State.
    ProseOnly,
}

/// Candidate layout for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutProposal {
    pub kind: ProposalKind,
    pub candidates: Vec<CandidateElement>,
    pub hints: LayoutHints,
    pub rationale: Option<String>,
}

impl LayoutProposal {
    pub fn prose_only(reply: impl Into<String>) -> Self {
        Self {
            kind: ProposalKind::ProseOnly,
            candidates: Vec::new(),
            hints: LayoutHints::default(),
            rationale: Some(reply.into()),
        }
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}
