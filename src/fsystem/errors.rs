use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FSErrorType {
    NotFound,
    AlreadyExists,
    InvalidPath,
    NotADirectory,
}

#[derive(Debug)]
pub struct FileSystemError {
    pub error_type: FSErrorType,
    pub message: String,
}

impl FileSystemError {
    pub(crate) fn new(error_type: FSErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
        }
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

impl Error for FileSystemError {}

pub type Result<T> = std::result::Result<T, FileSystemError>;
