//! Live executor using `std::process::Command`.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Live executor that spawns the program directly.
pub struct LiveShellExecutor;

impl ShellExecutor for LiveShellExecutor {
    fn run(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        debug!(dir = %dir.display(), program, ?args, "running");
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| format!("failed to run {program}: {e}"))?;
        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
