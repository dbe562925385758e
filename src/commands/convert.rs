//! `convert`: run a batch conversion.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use batchconv_core::{ConversionEngine, ConversionOutcome, OutcomeStatus, RunReport};
use clap::Args;
use plugin_blender::BlenderAssetIo;
use serde::Serialize;
use tabled::Tabled;
use tokio::runtime::Handle;
use tracing::info;

use crate::output::{self, OutputFormat};
use crate::settings::Settings;

/// Arguments for the convert command.
///
/// Every flag overrides the matching value from the configuration file.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Folder to scan for source assets
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Folder that receives converted assets
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Target format: fbx, obj, gltf or glb
    #[arg(long)]
    pub to: Option<String>,

    /// Replace targets that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Keep mesh objects separate instead of joining them
    #[arg(long)]
    pub no_merge: bool,

    /// Draco-compress geometry (glTF/GLB)
    #[arg(long)]
    pub compress: bool,

    /// Write textures next to the .gltf instead of embedding them
    #[arg(long)]
    pub separate_textures: bool,

    /// Descend into subfolders of the source folder
    #[arg(short, long)]
    pub recursive: bool,

    /// Write each converted asset into its own folder
    #[arg(long)]
    pub per_file_folders: bool,

    /// Blender executable or installation directory
    #[arg(long)]
    pub blender: Option<PathBuf>,

    /// Include unsupported files in the table
    #[arg(long)]
    pub show_skipped: bool,
}

impl ConvertArgs {
    /// Overlay the flags onto `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        let conversion = &mut settings.conversion;
        if let Some(source) = &self.source {
            conversion.source_folder = source.clone();
        }
        if let Some(target) = &self.target {
            conversion.target_folder = target.clone();
        }
        if let Some(format) = &self.to {
            conversion.target_format = format.clone();
        }
        if self.overwrite {
            conversion.overwrite_files = true;
        }
        if self.no_merge {
            conversion.merge_objects = false;
        }
        if self.compress {
            conversion.use_compression = true;
        }
        if self.separate_textures {
            conversion.export_separate_textures = true;
        }
        if self.recursive {
            conversion.include_subfolders = true;
        }
        if self.per_file_folders {
            conversion.export_to_subfolders = true;
        }
        if let Some(blender) = &self.blender {
            settings.blender.executable = blender.clone();
        }
    }
}

/// Table row for one outcome.
#[derive(Debug, Serialize, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&ConversionOutcome> for OutcomeRow {
    fn from(outcome: &ConversionOutcome) -> Self {
        Self {
            status: outcome.status.to_string(),
            source: outcome.source_path.display().to_string(),
            target: outcome
                .target_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            error: outcome
                .error
                .as_ref()
                .map(|e| format!("{}: {}", e.stage, e.message))
                .unwrap_or_default(),
        }
    }
}

/// Execute the convert command.
pub async fn execute(
    args: &ConvertArgs,
    mut settings: Settings,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    args.apply(&mut settings);

    let request = settings.conversion.into_request()?;
    let io = BlenderAssetIo::new(settings.blender, Handle::current())
        .context("Failed to initialise the Blender backend")?;
    info!(blender = %io.config().blender_summary(), "Blender backend ready");

    let report = tokio::task::spawn_blocking(move || {
        let mut engine = ConversionEngine::new(io);
        engine.run_report(&request)
    })
    .await
    .context("Conversion task did not complete")??;

    print_report(&report, format, args.show_skipped);

    if report.summary.has_failures() {
        output::print_warning(&format!(
            "{} of {} files failed",
            report.summary.failed,
            report.summary.eligible()
        ));
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &RunReport, format: OutputFormat, show_skipped: bool) {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = report
                .outcomes
                .iter()
                .filter(|o| show_skipped || o.status != OutcomeStatus::SkippedUnsupported)
                .map(OutcomeRow::from)
                .collect();
            output::print_list(&rows, format);

            let summary = &report.summary;
            output::print_heading("Summary");
            output::print_kv("Converted", &summary.converted.to_string());
            output::print_kv("Already existed", &summary.skipped_existing.to_string());
            output::print_kv("Failed", &summary.failed.to_string());
            output::print_kv("Unsupported", &summary.skipped_unsupported.to_string());
            output::print_kv("Elapsed", &format!("{} ms", summary.elapsed_ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchconv_core::{FailureStage, OutcomeError};

    fn no_flags() -> ConvertArgs {
        ConvertArgs {
            source: None,
            target: None,
            to: None,
            overwrite: false,
            no_merge: false,
            compress: false,
            separate_textures: false,
            recursive: false,
            per_file_folders: false,
            blender: None,
            show_skipped: false,
        }
    }

    #[test]
    fn test_apply_without_flags_keeps_settings() {
        let mut settings = Settings::default();
        settings.conversion.include_subfolders = true;
        no_flags().apply(&mut settings);

        assert!(settings.conversion.include_subfolders);
        assert!(settings.conversion.merge_objects);
        assert_eq!(settings.conversion.target_format, "FBX");
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        let args = ConvertArgs {
            source: Some(PathBuf::from("/in")),
            target: Some(PathBuf::from("/out")),
            to: Some("gltf".to_string()),
            overwrite: true,
            no_merge: true,
            separate_textures: true,
            per_file_folders: true,
            blender: Some(PathBuf::from("/opt/blender/blender")),
            ..no_flags()
        };
        args.apply(&mut settings);

        let request = settings.conversion.clone().into_request().expect("request");
        assert_eq!(request.source_root, PathBuf::from("/in"));
        assert_eq!(request.target_root, PathBuf::from("/out"));
        assert_eq!(request.target_format, batchconv_core::TargetFormat::Gltf);
        assert!(request.overwrite_files);
        assert!(!request.merge_objects);
        assert!(request.export_separate_textures);
        assert!(request.export_to_subfolders);
        assert!(!request.include_subfolders);
        assert_eq!(
            settings.blender.executable,
            PathBuf::from("/opt/blender/blender")
        );
    }

    #[test]
    fn test_unknown_format_is_rejected_before_backend_setup() {
        let mut settings = Settings::default();
        let args = ConvertArgs {
            source: Some(PathBuf::from("/in")),
            target: Some(PathBuf::from("/out")),
            to: Some("usdz".to_string()),
            ..no_flags()
        };
        args.apply(&mut settings);

        let err = settings.conversion.into_request().expect_err("unknown format");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_outcome_rows() {
        let skipped = ConversionOutcome::skipped_unsupported(PathBuf::from("/in/notes.txt"));
        let row = OutcomeRow::from(&skipped);
        assert_eq!(row.target, "-");
        assert!(row.error.is_empty());

        let io_err = std::io::Error::other("exporter crashed");
        let failed = ConversionOutcome::failed(
            PathBuf::from("/in/a.obj"),
            PathBuf::from("/out/a.fbx"),
            OutcomeError::new(FailureStage::Export, &io_err),
        );
        let row = OutcomeRow::from(&failed);
        assert_eq!(row.target, "/out/a.fbx");
        assert!(row.error.contains("exporter crashed"));
    }
}
