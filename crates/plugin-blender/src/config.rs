//! Configuration for the Blender backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::discovery::{BlenderDiscovery, BlenderInstallation, DiscoveryMethod};
use crate::error::BlenderError;

/// Generation of Blender's Python operator names to target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorSet {
    /// Blender 4.2 and later (`wm.obj_import`, `wm.stl_import`, `wm.obj_export`).
    #[default]
    Modern,
    /// Blender 3.x (`import_scene.obj`, `import_mesh.stl`, `export_scene.obj`).
    Legacy,
}

/// Configuration for the headless Blender backend.
///
/// If `executable` is empty, the backend auto-discovers Blender from the
/// platform's usual install locations and then `PATH`.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct BlenderConfig {
    /// Path to the Blender executable, or a directory containing it.
    ///
    /// Empty means auto-discover.
    pub executable: PathBuf,

    /// Timeout in seconds for one Blender invocation (one file).
    #[validate(range(min = 10, max = 7200))]
    pub timeout_seconds: u64,

    /// Minimum output file size (bytes) for an export to count as written.
    pub min_output_bytes: u64,

    /// Start Blender with `--factory-startup`, ignoring user preferences and add-ons.
    pub factory_startup: bool,

    /// Operator names to emit in generated scripts.
    pub operator_set: OperatorSet,

    /// Directory for generated Python scripts.
    pub script_dir: Option<PathBuf>,

    /// Keep generated scripts after each run (for debugging).
    pub keep_scripts: bool,

    /// Cached discovery result (not serialized, populated at runtime).
    #[serde(skip)]
    pub discovered_installation: Option<BlenderInstallation>,
}

impl Default for BlenderConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::new(),
            timeout_seconds: 600,
            min_output_bytes: 1,
            factory_startup: true,
            operator_set: OperatorSet::default(),
            script_dir: None,
            keep_scripts: false,
            discovered_installation: None,
        }
    }
}

impl BlenderConfig {
    /// Resolve the effective script directory.
    pub fn effective_script_dir(&self) -> PathBuf {
        self.script_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("batchconv"))
    }

    /// Resolve the Blender executable.
    ///
    /// An explicitly configured path is validated and used. Otherwise, or if
    /// the configured path is invalid, auto-discovery runs. The result is
    /// cached in `discovered_installation`.
    pub fn resolve_executable(&mut self) -> Result<PathBuf, BlenderError> {
        if !self.executable.as_os_str().is_empty() {
            info!(
                path = %self.executable.display(),
                "Using explicitly configured Blender path"
            );

            match BlenderDiscovery::from_explicit_path(&self.executable) {
                Ok(installation) => {
                    let path = installation.executable.clone();
                    self.discovered_installation = Some(installation);
                    return Ok(path);
                }
                Err(e) => {
                    warn!(
                        configured_path = %self.executable.display(),
                        error = %e,
                        "Configured Blender path is invalid, attempting auto-discovery"
                    );
                }
            }
        }

        info!("Blender path not configured, attempting auto-discovery...");

        let installation = BlenderDiscovery::discover()?;
        info!(
            path = %installation.executable.display(),
            method = ?installation.discovery_method,
            "Auto-discovered Blender installation"
        );

        let path = installation.executable.clone();
        self.executable = path.clone();
        self.discovered_installation = Some(installation);
        Ok(path)
    }

    /// Human-readable summary of where Blender comes from.
    pub fn blender_summary(&self) -> String {
        match &self.discovered_installation {
            Some(inst) => {
                let method = match inst.discovery_method {
                    DiscoveryMethod::CommonPath => "common path",
                    DiscoveryMethod::SystemPath => "system PATH",
                    DiscoveryMethod::ExplicitConfig => "explicit config",
                };
                format!("{} (found via {})", inst.executable.display(), method)
            }
            None => {
                if self.executable.as_os_str().is_empty() {
                    "Not configured, auto-discovery not yet attempted".to_string()
                } else {
                    format!("Configured: {} (not validated)", self.executable.display())
                }
            }
        }
    }
}
