//! Conversion engine: walks the source folder and drives one
//! reset → import → export cycle per eligible file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::asset_io::{AssetIo, AssetIoError, ExportOptions};
use crate::config::ConversionRequest;
use crate::error::ConvertError;
use crate::formats::registry::{ExportSpec, FormatRegistry, ImportCapability};
use crate::models::{ConversionOutcome, DiscoveredFile, FailureStage, OutcomeError};
use crate::paths::PathResolver;
use crate::summary::RunSummary;

/// Outcomes of a run together with their tally.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// One outcome per discovered file, in traversal order.
    pub outcomes: Vec<ConversionOutcome>,
    /// Aggregate counts.
    pub summary: RunSummary,
}

/// Sequential batch converter.
///
/// Owns the [`AssetIo`] backend and with it the single working scene, so
/// files are always converted one at a time.
#[derive(Debug)]
pub struct ConversionEngine<A> {
    /// Backend holding the working scene.
    io: A,
    /// Format routing tables.
    registry: FormatRegistry,
}

impl<A: AssetIo> ConversionEngine<A> {
    /// Create an engine around `io`.
    pub fn new(io: A) -> Self {
        Self {
            io,
            registry: FormatRegistry::new(),
        }
    }

    /// Borrow the backend.
    pub fn asset_io(&self) -> &A {
        &self.io
    }

    /// Consume the engine and return the backend.
    pub fn into_asset_io(self) -> A {
        self.io
    }

    /// Convert every eligible file under the request's source folder.
    ///
    /// Returns one outcome per discovered file. Only configuration errors
    /// and an unreadable source folder abort the run.
    pub fn run(
        &mut self,
        request: &ConversionRequest,
    ) -> Result<Vec<ConversionOutcome>, ConvertError> {
        self.run_report(request).map(|report| report.outcomes)
    }

    /// Like [`run`](Self::run), also returning the run summary.
    #[instrument(
        skip(self, request),
        fields(
            source = %request.source_root.display(),
            target = %request.target_root.display(),
            format = %request.target_format,
        )
    )]
    pub fn run_report(&mut self, request: &ConversionRequest) -> Result<RunReport, ConvertError> {
        let started = Instant::now();

        if !request.source_root.is_dir() {
            return Err(ConvertError::SourceRootMissing {
                path: request.source_root.clone(),
            });
        }

        let spec = self
            .registry
            .export_spec_for(request.target_format, request.export_separate_textures);
        let options = ExportOptions::for_request(request, &spec);

        let files = collect_source_files(&request.source_root, request.include_subfolders)?;
        info!(count = files.len(), "Scanned source folder");

        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            let outcome = self.process_file(&path, request, &spec, &options);
            outcomes.push(outcome);
        }

        let summary = RunSummary::from_outcomes(&outcomes, started.elapsed());
        info!(
            converted = summary.converted,
            skipped_existing = summary.skipped_existing,
            skipped_unsupported = summary.skipped_unsupported,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_ms,
            "Conversion run completed"
        );

        Ok(RunReport { outcomes, summary })
    }

    /// Produce the outcome for a single source file.
    fn process_file(
        &mut self,
        path: &Path,
        request: &ConversionRequest,
        spec: &ExportSpec,
        options: &ExportOptions,
    ) -> ConversionOutcome {
        let file = DiscoveredFile::from_path(path);

        let Some(import) = self.registry.import_capability_for(&file.source_extension) else {
            debug!(path = %path.display(), "Unsupported extension, skipping");
            return ConversionOutcome::skipped_unsupported(file.absolute_path);
        };

        let target = PathResolver::resolve(
            &request.target_root,
            &file.base_name,
            spec.extension,
            request.export_to_subfolders,
        );

        if let Err(e) = PathResolver::ensure_directory(&target.directory) {
            warn!(path = %path.display(), error = %e, "Cannot prepare destination");
            return ConversionOutcome::failed(
                file.absolute_path,
                target.path,
                OutcomeError::new(FailureStage::Filesystem, &e),
            );
        }

        if !request.overwrite_files {
            match target.path.try_exists() {
                Ok(true) => {
                    debug!(target = %target.path.display(), "Target exists, skipping");
                    return ConversionOutcome::skipped_existing(file.absolute_path, target.path);
                }
                Ok(false) => {}
                Err(source) => {
                    let e = ConvertError::ExistenceCheck {
                        path: target.path.clone(),
                        source,
                    };
                    warn!(error = %e, "Cannot check target");
                    return ConversionOutcome::failed(
                        file.absolute_path,
                        target.path,
                        OutcomeError::new(FailureStage::Filesystem, &e),
                    );
                }
            }
        }

        match self.convert_one(&file.absolute_path, import, &target.path, spec, options) {
            Ok(()) => {
                info!(
                    source = %file.absolute_path.display(),
                    target = %target.path.display(),
                    "Converted"
                );
                ConversionOutcome::converted(file.absolute_path, target.path)
            }
            Err(error) => {
                warn!(
                    source = %file.absolute_path.display(),
                    stage = %error.stage,
                    error = %error.message,
                    "Conversion failed"
                );
                ConversionOutcome::failed(file.absolute_path, target.path, error)
            }
        }
    }

    /// One isolated reset → import → export cycle.
    fn convert_one(
        &mut self,
        source: &Path,
        import: ImportCapability,
        target: &Path,
        spec: &ExportSpec,
        options: &ExportOptions,
    ) -> Result<(), OutcomeError> {
        debug!(
            source = %source.display(),
            importer = %import,
            exporter = %spec.capability,
            "Converting"
        );

        self.io
            .reset_scene()
            .map_err(|e| outcome_error(FailureStage::Reset, &e))?;
        self.io
            .import_asset(source, import)
            .map_err(|e| outcome_error(FailureStage::Import, &e))?;
        self.io
            .export_asset(target, spec.capability, options)
            .map_err(|e| outcome_error(FailureStage::Export, &e))?;

        Ok(())
    }
}

/// Attribute `error` to the stage it reports, falling back to the stage of
/// the call that returned it.
fn outcome_error(call_stage: FailureStage, error: &AssetIoError) -> OutcomeError {
    OutcomeError::new(error.reported_stage().unwrap_or(call_stage), error)
}

/// Collect the files to consider, depth-first.
///
/// Entries of each directory are visited in file name order, files before
/// subdirectories. Symlinked directories are not followed. Subdirectories
/// that cannot be read are logged and skipped; an unreadable root is an error.
fn collect_source_files(
    root: &Path,
    include_subfolders: bool,
) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();
    let mut dirs_to_visit = vec![root.to_path_buf()];

    while let Some(current_dir) = dirs_to_visit.pop() {
        let entries = match std::fs::read_dir(&current_dir) {
            Ok(entries) => entries,
            Err(source) if current_dir == root => {
                return Err(ConvertError::ReadDir {
                    path: current_dir,
                    source,
                });
            }
            Err(e) => {
                warn!(
                    dir = %current_dir.display(),
                    error = %e,
                    "Failed to read directory, skipping"
                );
                continue;
            }
        };

        let mut entries: Vec<_> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(dir = %current_dir.display(), error = %e, "Unreadable entry, skipping");
                    None
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let is_real_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_real_dir {
                if include_subfolders {
                    subdirs.push(path);
                }
            } else if path.is_file() {
                files.push(path);
            }
        }

        dirs_to_visit.extend(subdirs.into_iter().rev());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, b"x").expect("write");
    }

    #[test]
    fn test_collect_top_level_only() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("a.obj"));
        touch(&temp.path().join("nested/b.fbx"));

        let files = collect_source_files(temp.path(), false).expect("scan");
        assert_eq!(files, vec![temp.path().join("a.obj")]);
    }

    #[test]
    fn test_collect_recursive_depth_first_sorted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("z.obj"));
        touch(&root.join("a.obj"));
        touch(&root.join("b_dir/c.stl"));
        touch(&root.join("b_dir/deep/d.glb"));
        touch(&root.join("c_dir/e.fbx"));

        let files = collect_source_files(root, true).expect("scan");
        assert_eq!(
            files,
            vec![
                root.join("a.obj"),
                root.join("z.obj"),
                root.join("b_dir/c.stl"),
                root.join("b_dir/deep/d.glb"),
                root.join("c_dir/e.fbx"),
            ]
        );
    }

    #[test]
    fn test_collect_missing_root_is_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = collect_source_files(&temp.path().join("missing"), true).expect_err("missing");
        assert!(matches!(err, ConvertError::ReadDir { .. }));
    }
}
