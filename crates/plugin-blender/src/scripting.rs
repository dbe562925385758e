//! Python script generation for Blender batch mode.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use batchconv_core::{ExportCapability, ExportOptions, GltfExportMode, ImportCapability};
use uuid::Uuid;

use crate::config::OperatorSet;
use crate::error::BlenderError;

/// Exit code of a script whose export step raised.
pub const EXPORT_FAILED_EXIT_CODE: i32 = 1;
/// Exit code of a script whose import step raised.
pub const IMPORT_FAILED_EXIT_CODE: i32 = 2;
/// Exit code of a script that could not load the empty home file.
pub const RESET_FAILED_EXIT_CODE: i32 = 3;

/// A source file queued for import into the working scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStep {
    /// Source file.
    pub path: PathBuf,
    /// Importer to use.
    pub capability: ImportCapability,
}

/// Quote a string as a Python string literal.
fn python_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn python_path(path: &Path) -> String {
    python_str(&path.to_string_lossy())
}

fn python_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Generates Blender Python scripts.
pub struct ScriptingEngine;

impl ScriptingEngine {
    /// Generate unique filename: `[Stem]__[UUIDv7].[Extension]`.
    pub fn generate_unique_filename(stem: &str, extension: &str) -> String {
        let stem: String = stem
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
            .take(100)
            .collect();
        let stem = if stem.is_empty() { "script".to_string() } else { stem };
        format!(
            "{}__{}.{}",
            stem,
            Uuid::now_v7().simple(),
            extension.trim_start_matches('.')
        )
    }

    /// Render the script for one conversion: empty scene, imports, export.
    ///
    /// Each step runs in its own `try` block and exits with its own code, so
    /// the caller can tell which step failed.
    pub fn render(
        imports: &[ImportStep],
        output_path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
        operators: OperatorSet,
    ) -> Result<String, BlenderError> {
        if imports.is_empty() {
            return Err(BlenderError::NoPendingImport {
                path: output_path.to_path_buf(),
            });
        }

        let reset = vec!["bpy.ops.wm.read_homefile(use_empty=True)".to_string()];
        let import: Vec<String> = imports
            .iter()
            .map(|step| Self::import_command(step, operators))
            .collect();
        let mut export = Vec::new();
        if options.merge_objects {
            export.extend(Self::merge_block());
        }
        export.push(Self::export_command(output_path, capability, options, operators));

        let mut script = String::from("import sys\nimport traceback\n\nimport bpy\n");
        Self::push_guarded(&mut script, &reset, RESET_FAILED_EXIT_CODE);
        Self::push_guarded(&mut script, &import, IMPORT_FAILED_EXIT_CODE);
        Self::push_guarded(&mut script, &export, EXPORT_FAILED_EXIT_CODE);
        Ok(script)
    }

    /// Append `lines` wrapped in a `try` block that exits with `exit_code`.
    fn push_guarded(script: &mut String, lines: &[String], exit_code: i32) {
        script.push_str("\ntry:\n");
        for line in lines {
            script.push_str("    ");
            script.push_str(line);
            script.push('\n');
        }
        let _ = write!(
            script,
            "except Exception:\n    traceback.print_exc()\n    sys.exit({exit_code})\n"
        );
    }

    /// Write `content` to a uniquely named `.py` file in `script_dir`.
    pub fn write_script(
        content: &str,
        script_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, BlenderError> {
        std::fs::create_dir_all(script_dir)?;
        let script_path = script_dir.join(Self::generate_unique_filename(stem, "py"));
        std::fs::write(&script_path, content)?;
        Ok(script_path)
    }

    /// Importer call for one source file.
    fn import_command(step: &ImportStep, operators: OperatorSet) -> String {
        let p = python_path(&step.path);
        match (step.capability, operators) {
            (ImportCapability::Gltf, _) => format!("bpy.ops.import_scene.gltf(filepath={p})"),
            (ImportCapability::Fbx, _) => format!("bpy.ops.import_scene.fbx(filepath={p})"),
            (ImportCapability::Obj, OperatorSet::Modern) => {
                format!("bpy.ops.wm.obj_import(filepath={p})")
            }
            (ImportCapability::Obj, OperatorSet::Legacy) => {
                format!("bpy.ops.import_scene.obj(filepath={p})")
            }
            (ImportCapability::Stl, OperatorSet::Modern) => {
                format!("bpy.ops.wm.stl_import(filepath={p})")
            }
            (ImportCapability::Stl, OperatorSet::Legacy) => {
                format!("bpy.ops.import_mesh.stl(filepath={p})")
            }
        }
    }

    /// Join all mesh objects of the scene into one.
    fn merge_block() -> [String; 4] {
        [
            "meshes = [o for o in bpy.context.scene.objects if o.type == 'MESH']".to_string(),
            "if len(meshes) > 1:".to_string(),
            "    with bpy.context.temp_override(active_object=meshes[0], selected_editable_objects=meshes):".to_string(),
            "        bpy.ops.object.join()".to_string(),
        ]
    }

    /// Exporter call writing the whole scene to `output_path`.
    fn export_command(
        output_path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
        operators: OperatorSet,
    ) -> String {
        let p = python_path(output_path);
        let use_selection = python_bool(!matches!(
            options.selection_scope,
            batchconv_core::SelectionScope::WholeScene
        ));

        match capability {
            ExportCapability::Fbx => {
                format!("bpy.ops.export_scene.fbx(filepath={p}, use_selection={use_selection})")
            }
            ExportCapability::Obj => match operators {
                OperatorSet::Modern => format!(
                    "bpy.ops.wm.obj_export(filepath={p}, export_selected_objects={use_selection})"
                ),
                OperatorSet::Legacy => format!(
                    "bpy.ops.export_scene.obj(filepath={p}, use_selection={use_selection})"
                ),
            },
            ExportCapability::Gltf => {
                let format = match options.gltf_mode.unwrap_or(GltfExportMode::Glb) {
                    GltfExportMode::Glb => "GLB",
                    GltfExportMode::Separate => "GLTF_SEPARATE",
                    GltfExportMode::Embedded => "GLTF_EMBEDDED",
                };
                format!(
                    "bpy.ops.export_scene.gltf(filepath={p}, export_format='{format}', use_selection={use_selection}, export_draco_mesh_compression_enable={})",
                    python_bool(options.compress)
                )
            }
        }
    }
}
