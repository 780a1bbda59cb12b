//! Implementation of the `adaptui submit` command.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use serde::Serialize;

use super::{elements_table, open_reconciler, rejection_lines, ElementSummary, RejectionSummary};
use crate::cli::output::progress::ProgressBarExt;
use crate::cli::output::{create_spinner, output, render_list, CommandOutput};
use crate::domain::models::{Config, ScreenCapacity};
use crate::services::SubmitOutcome;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// What the screen should show, in plain language
    pub goal: String,

    /// Screen width in grid tracks (default: capacity.width)
    #[arg(long)]
    pub width: Option<u32>,

    /// Screen height in grid tracks (default: capacity.height)
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitKind {
    Applied,
    ProseOnly,
}

#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub outcome: SubmitKind,
    pub rationale: Option<String>,
    pub elements: Vec<ElementSummary>,
    pub rejections: Vec<RejectionSummary>,
}

impl CommandOutput for SubmitOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(rationale) = &self.rationale {
            lines.push(rationale.clone());
            lines.push(String::new());
        }
        match self.outcome {
            SubmitKind::Applied => {
                lines.push(render_list(
                    "element",
                    &elements_table(&self.elements),
                    self.elements.len(),
                ));
            }
            SubmitKind::ProseOnly => {
                lines.push("No layout proposed; the screen is unchanged.".to_string());
            }
        }
        if !self.rejections.is_empty() {
            lines.push(format!("\nDropped {} proposed element(s):", self.rejections.len()));
            lines.extend(rejection_lines(&self.rejections));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: SubmitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let goal = args.goal.trim();
    if goal.is_empty() {
        bail!("Goal cannot be empty");
    }

    let capacity = ScreenCapacity::new(
        args.width.unwrap_or(config.capacity.width),
        args.height.unwrap_or(config.capacity.height),
    );
    if capacity.width == 0 || capacity.height == 0 {
        bail!("Screen capacity must be at least 1x1");
    }

    let reconciler = open_reconciler(config).await?;
    let spinner = create_spinner(
        format!("Designing layout with {}...", config.backend.provider),
        !json_mode,
    );
    let outcome = reconciler.submit_goal(goal, capacity).await;
    reconciler.flush().await;

    let out = match outcome {
        SubmitOutcome::Applied { report, rationale } => {
            spinner.finish_success(format!("Applied {} element(s)", report.accepted.len()));
            SubmitOutput {
                outcome: SubmitKind::Applied,
                rationale,
                elements: report.accepted.iter().map(ElementSummary::from).collect(),
                rejections: report.rejections.iter().map(RejectionSummary::from).collect(),
            }
        }
        SubmitOutcome::ProseOnly { rationale } => {
            spinner.finish_warning("Backend replied without a layout");
            SubmitOutput {
                outcome: SubmitKind::ProseOnly,
                rationale: Some(rationale),
                elements: vec![],
                rejections: vec![],
            }
        }
        SubmitOutcome::Failed(err) => {
            spinner.finish_error("Layout request failed");
            return Err(anyhow!(err.user_message()).context(err));
        }
        SubmitOutcome::Busy => {
            spinner.finish_error("Busy");
            bail!("Another layout request is already in progress");
        }
        SubmitOutcome::NoGateway => {
            spinner.finish_error("No backend");
            bail!(
                "No text-generation backend is available. Set backend.provider and an API key \
                 (ANTHROPIC_API_KEY, OPENAI_API_KEY or GOOGLE_API_KEY)."
            );
        }
    };

    output(&out, json_mode);
    Ok(())
}
