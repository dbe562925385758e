//! `AssetIo` implementation backed by a headless Blender process.
//!
//! The working scene is a session of queued imports. `reset_scene` clears
//! the session, `import_asset` queues a source file, and `export_asset`
//! renders and runs a script that rebuilds the scene from an empty home file
//! before exporting it. One Blender process runs per exported file.
//!
//! Blender writes into a staging directory next to the target. Only a
//! validated export is moved over the target, so a source that is also the
//! target is still intact when it is imported, and a failed export leaves any
//! previous output untouched.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use batchconv_core::{AssetIo, AssetIoError, ExportCapability, ExportOptions, ImportCapability};
use tokio::runtime::Handle;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::BlenderConfig;
use crate::error::BlenderError;
use crate::executor::BlenderExecutor;
use crate::scripting::{ImportStep, ScriptingEngine};

/// Headless Blender asset I/O backend.
#[derive(Debug)]
pub struct BlenderAssetIo {
    /// Backend configuration.
    config: BlenderConfig,
    /// Process runner.
    executor: BlenderExecutor,
    /// Where generated scripts are written.
    script_dir: PathBuf,
    /// Imports queued since the last scene reset.
    session: Vec<ImportStep>,
}

impl BlenderAssetIo {
    /// Validate `config`, resolve the Blender executable and create the backend.
    ///
    /// `handle` is the runtime used to drive Blender processes.
    pub fn new(mut config: BlenderConfig, handle: Handle) -> Result<Self, BlenderError> {
        config.validate()?;
        let executable = config.resolve_executable()?;
        let script_dir = config.effective_script_dir();
        std::fs::create_dir_all(&script_dir)?;

        let executor = BlenderExecutor::new(
            executable,
            config.timeout_seconds,
            config.factory_startup,
            handle,
        );

        Ok(Self {
            config,
            executor,
            script_dir,
            session: Vec::new(),
        })
    }

    /// Backend configuration, including the discovered installation.
    pub fn config(&self) -> &BlenderConfig {
        &self.config
    }

    /// Imports queued in the current session.
    pub fn pending_imports(&self) -> &[ImportStep] {
        &self.session
    }

    /// Export the session to `path` through a staging directory.
    fn run_export(
        &self,
        path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
    ) -> Result<(), BlenderError> {
        let file_name = path.file_name().ok_or_else(|| BlenderError::OutputNotCreated {
            path: path.to_path_buf(),
        })?;
        let target_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let staging = target_dir.join(format!(".batchconv-{}", Uuid::now_v7().simple()));
        std::fs::create_dir_all(&staging)?;

        let staged = staging.join(file_name);
        let result = self
            .export_staged(&staged, path, capability, options)
            .and_then(|()| promote_staged(&staging, target_dir, file_name));

        if let Err(e) = std::fs::remove_dir_all(&staging) {
            warn!(
                staging = %staging.display(),
                error = %e,
                "Failed to remove staging directory"
            );
        }

        result
    }

    /// Render, run and clean up the script writing `staged`.
    fn export_staged(
        &self,
        staged: &Path,
        target: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
    ) -> Result<(), BlenderError> {
        let script = ScriptingEngine::render(
            &self.session,
            staged,
            capability,
            options,
            self.config.operator_set,
        )?;

        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script_path = ScriptingEngine::write_script(&script, &self.script_dir, &stem)?;

        let result = self.executor.run_script(&script_path);

        if !self.config.keep_scripts {
            if let Err(e) = std::fs::remove_file(&script_path) {
                warn!(script = %script_path.display(), error = %e, "Failed to remove script");
            }
        }

        let output = result?;
        debug!(
            path = %target.display(),
            duration_ms = output.duration_ms,
            stdout = %output.stdout,
            stderr = %output.stderr,
            "Blender export finished"
        );

        self.validate_output(staged, target)
    }

    /// Check that Blender actually wrote `staged`. Errors name `target`.
    fn validate_output(&self, staged: &Path, target: &Path) -> Result<(), BlenderError> {
        let metadata = match std::fs::metadata(staged) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlenderError::OutputNotCreated {
                    path: target.to_path_buf(),
                });
            }
            Err(e) => return Err(BlenderError::Io(e)),
        };

        if metadata.len() < self.config.min_output_bytes {
            return Err(BlenderError::OutputEmpty {
                path: target.to_path_buf(),
                size: metadata.len(),
            });
        }

        Ok(())
    }

    /// Path an error is reported against: the queued source for import
    /// failures, the target otherwise.
    fn error_subject(&self, error: &BlenderError, target: &Path) -> PathBuf {
        match error {
            BlenderError::ImportFailed { .. } => self
                .session
                .last()
                .map(|step| step.path.clone())
                .unwrap_or_else(|| target.to_path_buf()),
            _ => target.to_path_buf(),
        }
    }
}

/// Move everything Blender wrote into `staging` over `dest_dir`.
///
/// Companion files (`.bin`, textures) go first and `main_file` last, so the
/// target only changes once the whole export is in place.
fn promote_staged(
    staging: &Path,
    dest_dir: &Path,
    main_file: &OsStr,
) -> Result<(), BlenderError> {
    move_entries(staging, dest_dir, Some(main_file))?;
    std::fs::rename(staging.join(main_file), dest_dir.join(main_file))?;
    Ok(())
}

fn move_entries(from: &Path, to: &Path, skip: Option<&OsStr>) -> Result<(), BlenderError> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        if skip == Some(name.as_os_str()) {
            continue;
        }
        let dest = to.join(&name);
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&dest)?;
            move_entries(&entry.path(), &dest, None)?;
        } else {
            std::fs::rename(entry.path(), &dest)?;
        }
    }
    Ok(())
}

impl AssetIo for BlenderAssetIo {
    fn reset_scene(&mut self) -> Result<(), AssetIoError> {
        self.session.clear();
        Ok(())
    }

    fn import_asset(
        &mut self,
        path: &Path,
        capability: ImportCapability,
    ) -> Result<(), AssetIoError> {
        if !path.is_file() {
            return Err(BlenderError::SourceMissing {
                path: path.to_path_buf(),
            }
            .into_asset_io(path));
        }

        self.session.push(ImportStep {
            path: path.to_path_buf(),
            capability,
        });
        Ok(())
    }

    fn export_asset(
        &mut self,
        path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
    ) -> Result<(), AssetIoError> {
        self.run_export(path, capability, options).map_err(|e| {
            let subject = self.error_subject(&e, path);
            e.into_asset_io(&subject)
        })
    }
}
