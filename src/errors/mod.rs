use crate::api::errors::BackendError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

/// Top-level error for the command-line shell.
#[derive(Debug)]
pub enum AppError {
    IoError(std::io::Error),
    BackendError(BackendError),
    TomlError(toml::de::Error),
    TomlSerializeError(toml::ser::Error),
    MissingPrompt,
    RollbackError(String),
    InvalidInput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IoError(e) => write!(f, "IO error: {}", e),
            AppError::BackendError(e) => write!(f, "Chat backend error: {}", e),
            AppError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            AppError::TomlSerializeError(e) => write!(f, "TOML serialization error: {}", e),
            AppError::MissingPrompt => write!(f, "A query is required"),
            AppError::RollbackError(e) => write!(f, "Rollback error: {}", e),
            AppError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlError(err)
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::TomlSerializeError(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::BackendError(err)
    }
}

/// A per-file failure while applying a proposed change.
///
/// These never abort a batch; the applier records them against the entry and
/// moves on to the next file.
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("could not create directory {} for {}: {source}", .dir.display(), .path.display())]
    CreateDir {
        path: PathBuf,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not back up {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no pending change named {0}")]
    UnknownFile(String),
}

impl FileSystemError {
    /// Target path of the failed operation, if there was one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileSystemError::CreateDir { path, .. }
            | FileSystemError::Backup { path, .. }
            | FileSystemError::Write { path, .. } => Some(path),
            FileSystemError::UnknownFile(_) => None,
        }
    }
}
