//! Port for running the `go` and `git` tools against a module checkout.

use std::path::Path;

/// The output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// The exit code of the process.
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl ShellOutput {
    /// Whether the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output, as shown when a tool fails.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

/// Runs programs with explicit arguments (no shell interpolation).
pub trait ShellExecutor: Send + Sync {
    /// Runs `program args...` in `dir` and returns its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned.
    fn run(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>>;
}
