use std::path::Path;

use tokio::process::Command;

use error::ExecutableRunnerError;

pub mod error;
pub mod ops;

/// Runs the given command line through the platform shell and waits for it to exit.
///
/// # arguments
/// * `command_line`: the command as it would be typed into a shell, for example `npm run build`.
/// * `working_dir`: directory to run the command in. The current directory is used when `None`.
///
/// # returns
/// * `Result<(), ExecutableRunnerError>`: Ok when the command exits successfully.
///
/// # errors
/// * `ExecutableRunnerError::EmptyCommand`: If the command line is blank.
/// * `ExecutableRunnerError::IoError`: If the shell could not be started.
/// * `ExecutableRunnerError::CommandFailed`: If the command exits with a non-zero status.
pub async fn run_shell_command(
    command_line: &str,
    working_dir: Option<&Path>,
) -> Result<(), ExecutableRunnerError> {
    if command_line.trim().is_empty() {
        return Err(ExecutableRunnerError::EmptyCommand);
    }

    let mut command = shell_command(command_line);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    tracing::debug!("Command to execute: {:?}", command);

    let status = command.status().await.map_err(|e| {
        ExecutableRunnerError::IoError(format!("Failed to start `{}`: {}", command_line, e))
    })?;

    if !status.success() {
        return Err(ExecutableRunnerError::CommandFailed {
            command: command_line.to_string(),
            status: status.to_string(),
        });
    }

    Ok(())
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_run_successful_command() {
        let result = run_shell_command("echo hello", None).await;
        assert!(result.is_ok(), "Command failed: {:?}", result);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let result = run_shell_command("exit 3", None).await;
        match result {
            Err(ExecutableRunnerError::CommandFailed { command, .. }) => {
                assert_eq!(command, "exit 3");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let temp_dir = tempdir().unwrap();

        run_shell_command("echo built > output.txt", Some(temp_dir.path()))
            .await
            .unwrap();

        let output = std::fs::read_to_string(temp_dir.path().join("output.txt")).unwrap();
        assert_eq!(output.trim(), "built");
    }

    #[tokio::test]
    async fn test_blank_command_is_rejected() {
        let result = run_shell_command("   ", None).await;
        assert_eq!(result, Err(ExecutableRunnerError::EmptyCommand));
    }
}
