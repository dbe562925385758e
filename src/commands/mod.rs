//! CLI command definitions and dispatch.

pub mod config;
pub mod convert;
pub mod formats;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crate::settings::Settings;

/// batchconv: convert folders of FBX, OBJ, STL and glTF assets with Blender
#[derive(Debug, Parser)]
#[command(name = "batchconv", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "batchconv.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert every supported asset in a folder
    Convert(convert::ConvertArgs),
    /// List supported source and target formats
    Formats,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, settings: Settings) -> anyhow::Result<ExitCode> {
        match &self.command {
            Commands::Convert(args) => convert::execute(args, settings, self.format).await,
            Commands::Formats => {
                formats::execute(self.format);
                Ok(ExitCode::SUCCESS)
            }
            Commands::Config(args) => {
                config::execute(args, &settings, &self.config, self.format).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
