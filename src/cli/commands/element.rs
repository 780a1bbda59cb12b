//! Element commands: `add`, `update` and `remove`.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use super::{open_reconciler, parse_arguments, rejection_lines, ElementSummary, RejectionSummary};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{CandidateElement, Config, Placement};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Element type from the component schema
    #[arg(long = "type")]
    pub element_type: String,

    /// Element id (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Arguments as a JSON object
    #[arg(long)]
    pub args: Option<String>,

    /// Placement as x,y,w,h in grid tracks (preferred size at 0,0 when omitted)
    #[arg(long)]
    pub placement: Option<Placement>,

    /// Add the element hidden
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Element id
    pub id: String,

    /// Arguments to merge, as a JSON object; null removes an argument
    #[arg(long)]
    pub args: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Element id
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ElementActionOutput {
    pub success: bool,
    pub message: String,
    pub element: Option<ElementSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<RejectionSummary>,
}

impl CommandOutput for ElementActionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.dropped.is_empty() {
            lines.push(format!(
                "\n{} element(s) no longer valid and removed:",
                self.dropped.len()
            ));
            lines.extend(rejection_lines(&self.dropped));
        }
        lines.join("\n")
    }
}

pub async fn add(args: AddArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut candidate = CandidateElement::new(args.element_type).with_visible(!args.hidden);
    if let Some(id) = args.id {
        candidate = candidate.with_id(id);
    }
    if let Some(raw) = &args.args {
        candidate = candidate.with_arguments(parse_arguments(raw)?);
    }
    if let Some(placement) = args.placement {
        candidate = candidate.with_placement(placement);
    }

    let reconciler = open_reconciler(config).await?;
    let added = reconciler.add(candidate).await;
    reconciler.flush().await;

    let element = added.map_err(|rejection| anyhow!("{rejection}"))?;
    let out = ElementActionOutput {
        success: true,
        message: format!("Added {} ({})", element.id, element.element_type),
        element: Some(ElementSummary::from(&element)),
        dropped: vec![],
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn update(args: UpdateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let partial = parse_arguments(&args.args)?;

    let reconciler = open_reconciler(config).await?;
    let report = reconciler.update(&args.id, partial).await;
    reconciler.flush().await;

    let report = report.ok_or_else(|| anyhow!("No element with id '{}'", args.id))?;
    let element = report.accepted.iter().find(|e| e.id == args.id);
    let out = ElementActionOutput {
        success: element.is_some(),
        message: match element {
            Some(_) => format!("Updated {}", args.id),
            None => format!("{} failed validation after the update and was removed", args.id),
        },
        element: element.map(ElementSummary::from),
        dropped: report.rejections.iter().map(RejectionSummary::from).collect(),
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn remove(args: RemoveArgs, config: &Config, json_mode: bool) -> Result<()> {
    let reconciler = open_reconciler(config).await?;
    let removed = reconciler.remove(&args.id).await;
    reconciler.flush().await;

    let out = ElementActionOutput {
        success: removed,
        message: if removed {
            format!("Removed {}", args.id)
        } else {
            format!("No element with id '{}'; nothing removed", args.id)
        },
        element: None,
        dropped: vec![],
    };
    output(&out, json_mode);
    Ok(())
}
