//! Implementation of the `adaptui init` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{initialize_project, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite existing config and schema files
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub files_written: Vec<PathBuf>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.files_written.is_empty() {
            lines.push("\nWrote:".to_string());
            for file in &self.files_written {
                lines.push(format!("  - {}", file.display()));
            }
        }
        lines.join("\n")
    }
}

pub fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let paths = SetupPaths::under(&target_path);

    if paths.is_initialized() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to overwrite.".to_string(),
            initialized_path: target_path,
            files_written: vec![],
        };
        output(&out, json_mode);
        return Ok(());
    }

    let files_written = initialize_project(&paths, args.force)?;
    let out = InitOutput {
        success: true,
        message: format!("Initialized adaptui in {}", paths.config_dir.display()),
        initialized_path: target_path,
        files_written,
    };
    output(&out, json_mode);
    Ok(())
}
