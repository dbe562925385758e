//! End-to-end tests of the `batchconv` binary with a stand-in Blender.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Writes the export target named in the generated script.
const WRITING_BLENDER: &str = r#"#!/bin/sh
script="$6"
out=$(sed -n 's/.*export[a-z_.]*(filepath="\([^"]*\)".*/\1/p' "$script")
printf 'mesh-bytes' > "$out"
"#;

/// Exits successfully without writing anything.
const SILENT_BLENDER: &str = "#!/bin/sh\nexit 0\n";

struct Workspace {
    _temp: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().to_path_buf();
        std::fs::create_dir_all(root.join("in")).expect("mkdir");
        Self { _temp: temp, root }
    }

    fn source(&self, name: &str) {
        std::fs::write(self.root.join("in").join(name), "data").expect("write source");
    }

    fn blender(&self, body: &str) -> PathBuf {
        let exe = self.root.join("blender");
        std::fs::write(&exe, body).expect("write blender");
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        exe
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_batchconv"))
            .current_dir(&self.root)
            .env("BATCHCONV__BLENDER__SCRIPT_DIR", self.root.join("scripts"))
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("run batchconv")
    }

    fn path(&self, rel: &str) -> String {
        self.root.join(rel).to_string_lossy().into_owned()
    }
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

fn convert_args<'a>(ws: &'a Workspace, blender: &'a Path, to: &'a str) -> Vec<String> {
    vec![
        "-f".into(),
        "json".into(),
        "convert".into(),
        "--source".into(),
        ws.path("in"),
        "--target".into(),
        ws.path("out"),
        "--to".into(),
        to.into(),
        "--blender".into(),
        blender.to_string_lossy().into_owned(),
    ]
}

#[test]
fn test_convert_success_exits_zero() {
    let ws = Workspace::new();
    ws.source("chair.obj");
    ws.source("readme.txt");
    let blender = ws.blender(WRITING_BLENDER);

    let args = convert_args(&ws, &blender, "glb");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = ws.run(&args);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["converted"], 1);
    assert_eq!(report["summary"]["skipped_unsupported"], 1);
    assert!(ws.root.join("out").join("chair.glb").is_file());
}

#[test]
fn test_second_run_skips_existing() {
    let ws = Workspace::new();
    ws.source("chair.obj");
    let blender = ws.blender(WRITING_BLENDER);

    let args = convert_args(&ws, &blender, "fbx");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    assert_eq!(ws.run(&args).status.code(), Some(0));

    let output = ws.run(&args);
    assert_eq!(output.status.code(), Some(0));
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["converted"], 0);
    assert_eq!(report["summary"]["skipped_existing"], 1);
}

#[test]
fn test_failed_export_exits_two() {
    let ws = Workspace::new();
    ws.source("chair.obj");
    let blender = ws.blender(SILENT_BLENDER);

    let args = convert_args(&ws, &blender, "obj");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = ws.run(&args);

    assert_eq!(output.status.code(), Some(2));
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["outcomes"][0]["status"], "failed");
    assert_eq!(report["outcomes"][0]["error"]["stage"], "export");
}

#[test]
fn test_unknown_target_format_exits_one() {
    let ws = Workspace::new();
    ws.source("chair.obj");
    let blender = ws.blender(WRITING_BLENDER);

    let args = convert_args(&ws, &blender, "usdz");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = ws.run(&args);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usdz"));
    assert!(!ws.root.join("out").exists());
}

#[test]
fn test_formats_json() {
    let ws = Workspace::new();
    let output = ws.run(&["-f", "json", "formats"]);

    assert_eq!(output.status.code(), Some(0));
    let listing = stdout_json(&output);
    assert_eq!(listing["sources"].as_array().map(Vec::len), Some(5));
    assert_eq!(listing["targets"].as_array().map(Vec::len), Some(4));
}
