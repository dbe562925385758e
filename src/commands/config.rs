//! Configuration management CLI commands.

use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crate::settings::Settings;

/// Commented default configuration file.
const DEFAULT_CONFIG: &str = include_str!("../../config/batchconv.toml");

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "batchconv.toml")]
        output: String,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    settings: &Settings,
    config_path: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => show(settings, config_path, format),
        ConfigCommand::Generate { output: out_path, force } => {
            generate(Path::new(out_path), *force).await?;
            output::print_success(&format!("Default config written to '{}'", out_path));
            Ok(())
        }
    }
}

fn show(settings: &Settings, config_path: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => output::print_json(settings),
        OutputFormat::Table => {
            let source = if Settings::file_exists(config_path) {
                config_path.to_string()
            } else {
                format!("{} (not found, using defaults)", config_path)
            };
            let conversion = &settings.conversion;
            let blender = &settings.blender;

            output::print_heading("Configuration");
            output::print_kv("File", &source);
            output::print_heading("Conversion");
            output::print_kv("Source folder", &conversion.source_folder.display().to_string());
            output::print_kv("Target folder", &conversion.target_folder.display().to_string());
            output::print_kv("Target format", &conversion.target_format);
            output::print_kv("Merge objects", &conversion.merge_objects.to_string());
            output::print_kv("Overwrite files", &conversion.overwrite_files.to_string());
            output::print_kv("Compression", &conversion.use_compression.to_string());
            output::print_kv(
                "Separate textures",
                &conversion.export_separate_textures.to_string(),
            );
            output::print_kv("Include subfolders", &conversion.include_subfolders.to_string());
            output::print_kv(
                "Export to subfolders",
                &conversion.export_to_subfolders.to_string(),
            );
            output::print_heading("Blender");
            output::print_kv("Executable", &blender.blender_summary());
            output::print_kv("Timeout", &format!("{}s", blender.timeout_seconds));
            output::print_kv("Operator set", &format!("{:?}", blender.operator_set));
            output::print_kv(
                "Script directory",
                &blender.effective_script_dir().display().to_string(),
            );
            output::print_heading("Logging");
            output::print_kv("Level", &settings.logging.level);
            output::print_kv("Format", &settings.logging.format);
        }
    }
    Ok(())
}

async fn generate(out_path: &Path, force: bool) -> anyhow::Result<()> {
    if out_path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to replace it)",
            out_path.display()
        );
    }

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    tokio::fs::write(out_path, DEFAULT_CONFIG)
        .await
        .with_context(|| format!("Failed to write '{}'", out_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_writes_loadable_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("batchconv.toml");

        generate(&path, false).await.expect("generate");
        let settings = Settings::load(&path.to_string_lossy()).expect("load generated");
        assert_eq!(settings.conversion.target_format, "FBX");
    }

    #[tokio::test]
    async fn test_generate_refuses_to_overwrite() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("batchconv.toml");
        std::fs::write(&path, "# mine\n").expect("write");

        assert!(generate(&path, false).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine\n");

        generate(&path, true).await.expect("forced generate");
        assert!(std::fs::read_to_string(&path).expect("read").contains("[conversion]"));
    }
}
