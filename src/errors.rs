use std::error::Error;

use crate::fsystem::errors::FileSystemError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandErrorType {
    Usage,
    NotFound,
    NotADirectory,
    Mode,
    InvalidTarget,
}

/// A failed command. The message is what the player sees, verbatim.
#[derive(Debug)]
pub struct CommandError {
    pub error_type: CommandErrorType,
    pub message: String,
}

impl CommandError {
    pub(crate) fn new(error_type: CommandErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
        }
    }

    pub(crate) fn usage(message: &str) -> Self {
        Self::new(CommandErrorType::Usage, message.to_string())
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<FileSystemError> for CommandError {
    fn from(error: FileSystemError) -> Self {
        tracing::error!("File system error while running command: {}", error);
        Self {
            error_type: CommandErrorType::InvalidTarget,
            message: error.message,
        }
    }
}

impl Error for CommandError {}

pub type Result<T> = std::result::Result<T, CommandError>;
