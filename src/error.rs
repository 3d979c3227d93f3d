use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenamerError>;

/// Errors raised while turning metadata into a new filename on disk.
#[derive(Error, Debug)]
pub enum RenamerError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("No identifier or metadata found for {0:?}")]
    MetadataUnavailable(PathBuf),

    #[error("Could not rename {path:?}: {message}")]
    Rename { path: PathBuf, message: String },

    #[error("{0:?} is not a pdf file or a directory")]
    InvalidTarget(PathBuf),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenamerError {
    pub fn rename(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        RenamerError::Rename {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
