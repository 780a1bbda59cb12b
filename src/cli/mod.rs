//! Command-line interface.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

use commands::element::{AddArgs, RemoveArgs, UpdateArgs};
use commands::init::InitArgs;
use commands::layout::ArrangeArgs;
use commands::submit::SubmitArgs;

#[derive(Parser, Debug)]
#[command(name = "adaptui")]
#[command(about = "adaptui - natural-language driven UI layout reconciliation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (default: .adaptui/config.yaml plus .adaptui/local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .adaptui/ with a config file and a starter component schema
    Init(InitArgs),

    /// Ask the text-generation backend for a new layout
    Submit(SubmitArgs),

    /// Show the current UI-State
    Show,

    /// Validate and add one element
    Add(AddArgs),

    /// Merge arguments into an element
    Update(UpdateArgs),

    /// Remove an element
    Remove(RemoveArgs),

    /// Change arrangement mode, spacing or track count
    Arrange(ArrangeArgs),

    /// Restore the default UI-State and clear persisted state
    Reset,

    /// List the element types of the component schema
    Schema,
}

/// Load configuration, install logging and run one command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::try_from(&config.logging)?)?;

    let json = cli.json;
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, json),
        Commands::Submit(args) => commands::submit::execute(args, &config, json).await,
        Commands::Show => commands::layout::show(&config, json).await,
        Commands::Add(args) => commands::element::add(args, &config, json).await,
        Commands::Update(args) => commands::element::update(args, &config, json).await,
        Commands::Remove(args) => commands::element::remove(args, &config, json).await,
        Commands::Arrange(args) => commands::layout::arrange(args, &config, json).await,
        Commands::Reset => commands::layout::reset(&config, json).await,
        Commands::Schema => commands::schema::execute(&config, json),
    }
}

/// Print an error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["adaptui", "show", "--json", "--config", "ui.yaml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("ui.yaml")));
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "adaptui",
            "add",
            "--type",
            "MetricCard",
            "--args",
            r#"{"label":"Revenue","value":"$1.2M"}"#,
            "--placement",
            "0,0,3,2",
        ])
        .unwrap();
        let Commands::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.element_type, "MetricCard");
        assert_eq!(args.placement.map(|p| p.w), Some(3));
    }

    #[test]
    fn test_parse_arrange_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["adaptui", "arrange", "--mode", "spiral"]).is_err());
    }
}
