use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutableRunnerError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Command `{command}` failed with status: {status}")]
    CommandFailed { command: String, status: String },
    #[error("Empty command")]
    EmptyCommand,
}
