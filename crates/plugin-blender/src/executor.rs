//! Headless Blender process execution.
//!
//! Runs Blender as a child process with timeout management and output
//! capturing. The asset I/O trait is blocking, so calls enter the tokio
//! runtime through a stored [`Handle`]; they must be made from a thread that
//! is not itself driving async tasks (e.g. inside `spawn_blocking`).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use crate::error::BlenderError;
use crate::scripting::{IMPORT_FAILED_EXIT_CODE, RESET_FAILED_EXIT_CODE};

/// Captured result of a successful Blender run.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Standard output from the process.
    pub stdout: String,
    /// Standard error from the process.
    pub stderr: String,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

/// Runs generated scripts with a Blender executable.
#[derive(Debug, Clone)]
pub struct BlenderExecutor {
    /// Blender executable.
    executable: PathBuf,
    /// Per-invocation timeout.
    timeout: Duration,
    /// Pass `--factory-startup`.
    factory_startup: bool,
    /// Runtime used to drive the child process.
    handle: Handle,
}

impl BlenderExecutor {
    /// Create an executor.
    pub fn new(
        executable: PathBuf,
        timeout_seconds: u64,
        factory_startup: bool,
        handle: Handle,
    ) -> Self {
        Self {
            executable,
            timeout: Duration::from_secs(timeout_seconds),
            factory_startup,
            handle,
        }
    }

    /// Command-line arguments for running `script_path`.
    pub fn build_args(&self, script_path: &Path) -> Vec<String> {
        let mut args = vec!["--background".to_string()];
        if self.factory_startup {
            args.push("--factory-startup".to_string());
        }
        args.push("--python-exit-code".to_string());
        args.push("1".to_string());
        args.push("--python".to_string());
        args.push(script_path.to_string_lossy().into_owned());
        args
    }

    /// Run `script_path`, blocking until Blender exits or the timeout fires.
    pub fn run_script(&self, script_path: &Path) -> Result<ExecutionOutput, BlenderError> {
        self.handle.block_on(self.run_script_async(script_path))
    }

    /// Async form of [`run_script`](Self::run_script).
    pub async fn run_script_async(
        &self,
        script_path: &Path,
    ) -> Result<ExecutionOutput, BlenderError> {
        let start = Instant::now();
        let args = self.build_args(script_path);

        debug!(
            executable = %self.executable.display(),
            args = ?args,
            "Spawning Blender"
        );

        let mut cmd = Command::new(&self.executable);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(
                    executable = %self.executable.display(),
                    error = %e,
                    "Failed to launch Blender"
                );
                return Err(BlenderError::Io(e));
            }
            Err(_) => {
                error!(
                    timeout_seconds = self.timeout.as_secs(),
                    script = %script_path.display(),
                    "Blender timed out"
                );
                return Err(BlenderError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let Some(code) = output.status.code() else {
                return Err(BlenderError::Killed);
            };
            match code {
                IMPORT_FAILED_EXIT_CODE => {
                    return Err(BlenderError::ImportFailed {
                        stderr: tail(&stderr, 2000),
                    });
                }
                RESET_FAILED_EXIT_CODE => {
                    return Err(BlenderError::SceneResetFailed {
                        stderr: tail(&stderr, 2000),
                    });
                }
                _ => {}
            }
            error!(
                code,
                stderr = %stderr.chars().take(500).collect::<String>(),
                "Blender exited with failure"
            );
            return Err(BlenderError::ProcessFailed {
                code,
                stderr: stderr.chars().take(2000).collect(),
                stdout: stdout.chars().take(2000).collect(),
            });
        }

        info!(duration_ms, script = %script_path.display(), "Blender run completed");

        Ok(ExecutionOutput {
            stdout,
            stderr,
            duration_ms,
        })
    }
}

/// Last `max_chars` characters of `text`, where Python puts the exception.
fn tail(text: &str, max_chars: usize) -> String {
    let skip = text.chars().count().saturating_sub(max_chars);
    text.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(executable: &Path, timeout_seconds: u64) -> BlenderExecutor {
        BlenderExecutor::new(
            executable.to_path_buf(),
            timeout_seconds,
            true,
            Handle::current(),
        )
    }

    #[tokio::test]
    async fn test_build_args() {
        let exec = executor(Path::new("/usr/bin/blender"), 60);
        let args = exec.build_args(Path::new("/tmp/run.py"));
        assert_eq!(
            args,
            vec![
                "--background",
                "--factory-startup",
                "--python-exit-code",
                "1",
                "--python",
                "/tmp/run.py"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_executable_is_io_error() {
        let exec = executor(Path::new("/nonexistent/blender"), 60);
        let result = exec.run_script_async(Path::new("/tmp/run.py")).await;
        assert!(matches!(result, Err(BlenderError::Io(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_process_failed() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let fake = temp.path().join("blender");
        std::fs::write(&fake, "#!/bin/sh\necho 'Error: out of memory' >&2\nexit 7\n")
            .expect("write");
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let exec = executor(&fake, 60);
        let result = exec.run_script_async(Path::new("/tmp/run.py")).await;
        match result {
            Err(BlenderError::ProcessFailed { code, stderr, .. }) => {
                assert_eq!(code, 7);
                assert!(stderr.contains("out of memory"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_import_exit_code_is_import_failed() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let fake = temp.path().join("blender");
        std::fs::write(
            &fake,
            "#!/bin/sh\necho 'RuntimeError: invalid FBX header' >&2\nexit 2\n",
        )
        .expect("write");
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let exec = executor(&fake, 60);
        let result = exec.run_script_async(Path::new("/tmp/run.py")).await;
        match result {
            Err(BlenderError::ImportFailed { stderr }) => {
                assert!(stderr.contains("invalid FBX header"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_tail_keeps_the_end() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
    }
}
