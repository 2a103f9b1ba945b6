use crate::error::ExecutableRunnerError;
use crate::run_shell_command;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Trait for executable runner operations.
///
/// This trait abstracts command execution to allow for different implementations,
/// including mocks for testing purposes.
#[async_trait::async_trait]
pub trait ExecutableRunnerOps: Send + Sync {
    /// Runs a shell command line and waits for it to finish.
    ///
    /// # Arguments
    /// * `command_line` - The command as typed into a shell
    /// * `working_dir` - Directory to run in, current directory when `None`
    ///
    /// # Returns
    /// * `Ok(())` on successful execution
    /// * `Err(ExecutableRunnerError)` if the command could not start or exited non-zero
    async fn run_shell_command(
        &self,
        command_line: &str,
        working_dir: Option<&Path>,
    ) -> Result<(), ExecutableRunnerError>;
}

/// Default implementation that spawns a real shell.
pub struct DefaultExecutableRunnerOps;

impl DefaultExecutableRunnerOps {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultExecutableRunnerOps {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ExecutableRunnerOps for DefaultExecutableRunnerOps {
    async fn run_shell_command(
        &self,
        command_line: &str,
        working_dir: Option<&Path>,
    ) -> Result<(), ExecutableRunnerError> {
        run_shell_command(command_line, working_dir).await
    }
}

/// Represents a recorded call to an executable runner operation.
///
/// Used by `MockExecutableRunnerOps` to track and verify calls in tests.
#[derive(Debug, Clone)]
pub struct ExecutableRunCall {
    pub command_line: String,
    pub working_dir: Option<PathBuf>,
}

/// Mock implementation for testing executable runner operations.
///
/// This mock tracks all calls and can simulate failures, allowing testing
/// without spawning processes.
///
/// # Examples
///
/// ```
/// use executable_runner::ops::{ExecutableRunnerOps, MockExecutableRunnerOps};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let mock = MockExecutableRunnerOps::new();
///     let result = mock.run_shell_command("npm run build", None).await;
///     assert!(result.is_ok());
///
///     assert_eq!(mock.total_calls(), 1);
///     assert_eq!(mock.run_calls()[0].command_line, "npm run build");
/// }
/// ```
#[derive(Clone, Default)]
pub struct MockExecutableRunnerOps {
    should_fail: bool,
    error_message: Option<String>,
    run_calls: Arc<Mutex<Vec<ExecutableRunCall>>>,
}

impl MockExecutableRunnerOps {
    /// Creates a new mock that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock whose commands all exit non-zero.
    ///
    /// # Arguments
    /// * `error_msg` - Reported as the exit status of the failed command
    pub fn with_failure(error_msg: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(error_msg.into()),
            ..Default::default()
        }
    }

    /// Returns all calls made to the `run_shell_command` method.
    pub fn run_calls(&self) -> Vec<ExecutableRunCall> {
        self.run_calls.lock().unwrap().clone()
    }

    /// Returns the total number of calls made.
    pub fn total_calls(&self) -> usize {
        self.run_calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ExecutableRunnerOps for MockExecutableRunnerOps {
    async fn run_shell_command(
        &self,
        command_line: &str,
        working_dir: Option<&Path>,
    ) -> Result<(), ExecutableRunnerError> {
        self.run_calls.lock().unwrap().push(ExecutableRunCall {
            command_line: command_line.to_string(),
            working_dir: working_dir.map(Path::to_path_buf),
        });

        if self.should_fail {
            return Err(ExecutableRunnerError::CommandFailed {
                command: command_line.to_string(),
                status: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Mock command failed".to_string()),
            });
        }

        Ok(())
    }
}
