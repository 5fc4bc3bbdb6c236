//! Filesystem helpers for reading registry files and writing artifacts.

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, thiserror::Error, serde::Serialize)]
pub enum FileSystemError {
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Permission denied: '{path}': {message}")]
    PermissionDenied { path: PathBuf, message: String },

    #[error("{operation} failed for '{path}': {message}")]
    IoError {
        operation: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl FileSystemError {
    pub fn from_io_error(
        operation: &'static str,
        path: impl Into<PathBuf>,
        error: std::io::Error,
    ) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path,
                message: error.to_string(),
            },
            _ => Self::IoError {
                operation,
                path,
                message: error.to_string(),
            },
        }
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;

/// Creates `path` and any missing parents. An existing directory is reused as is.
pub fn ensure_dir(path: &Path) -> FileSystemResult<()> {
    if path.exists() && !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::create_dir_all(path)
        .map_err(|e| FileSystemError::from_io_error("create_dir_all", path, e))
}

pub fn read_to_string(path: &Path) -> FileSystemResult<String> {
    std::fs::read_to_string(path).map_err(|e| FileSystemError::from_io_error("read", path, e))
}

/// Writes `value` as pretty JSON with a trailing newline, overwriting any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> crate::TinyModelResult<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| FileSystemError::from_io_error("write", path, e))?;
    Ok(())
}
