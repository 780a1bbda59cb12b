//! Whole-screen commands: `show`, `arrange` and `reset`.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{elements_table, open_reconciler, ElementSummary};
use crate::cli::output::{output, render_list, CommandOutput};
use crate::domain::models::{ArrangementMode, Config, UiState};

#[derive(Args, Debug)]
pub struct ArrangeArgs {
    /// Arrangement mode: grid, flow or absolute
    #[arg(long)]
    pub mode: Option<ArrangementMode>,

    /// Gap between elements (non-negative)
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Number of grid tracks (at least 1)
    #[arg(long = "tracks")]
    pub track_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub arrangement_mode: ArrangementMode,
    pub spacing: f64,
    pub track_count: u32,
    pub elements: Vec<ElementSummary>,
}

impl LayoutOutput {
    fn new(state: &UiState, message: Option<String>) -> Self {
        Self {
            message,
            arrangement_mode: state.arrangement_mode,
            spacing: state.spacing,
            track_count: state.track_count,
            elements: state.elements.iter().map(ElementSummary::from).collect(),
        }
    }
}

impl CommandOutput for LayoutOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(message) = &self.message {
            lines.push(message.clone());
        }
        lines.push(format!(
            "Arrangement: {} (spacing {}, {} tracks)",
            self.arrangement_mode, self.spacing, self.track_count
        ));
        lines.push(render_list(
            "element",
            &elements_table(&self.elements),
            self.elements.len(),
        ));
        lines.join("\n")
    }
}

pub async fn show(config: &Config, json_mode: bool) -> Result<()> {
    let reconciler = open_reconciler(config).await?;
    output(&LayoutOutput::new(&reconciler.snapshot().await, None), json_mode);
    Ok(())
}

pub async fn arrange(args: ArrangeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let reconciler = open_reconciler(config).await?;
    let mode = match args.mode {
        Some(mode) => mode,
        None => reconciler.snapshot().await.arrangement_mode,
    };
    reconciler
        .set_arrangement(mode, args.spacing, args.track_count)
        .await?;
    reconciler.flush().await;

    let state = reconciler.snapshot().await;
    output(
        &LayoutOutput::new(&state, Some("Arrangement updated".to_string())),
        json_mode,
    );
    Ok(())
}

pub async fn reset(config: &Config, json_mode: bool) -> Result<()> {
    let reconciler = open_reconciler(config).await?;
    let cleared = reconciler.reset_to_default().await;

    let message = if cleared {
        "Restored the default UI-State"
    } else {
        "Restored the default UI-State; persisted state could not be cleared"
    };
    let state = reconciler.snapshot().await;
    output(&LayoutOutput::new(&state, Some(message.to_string())), json_mode);
    Ok(())
}
