//! Error types for the docx-template library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docx-template operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while filling a template.
#[derive(Error, Debug)]
pub enum Error {
    /// The template file does not exist.
    #[error("File {} not found", .0.display())]
    FileNotFound(PathBuf),

    /// The template could not be copied into the temporary directory.
    #[error("Cannot copy file {} to temporary directory: {source}", .path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The working copy is not a readable ZIP archive.
    #[error("Unable to unpack file {}: {reason}", .path.display())]
    UnpackFailed { path: PathBuf, reason: String },

    /// A temporary directory override does not exist.
    #[error("Directory {} not found", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The finished document could not be moved to its destination.
    #[error("Unable to save file {}: {source}", .path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An unknown section name was requested.
    #[error("Unknown document part: {0}")]
    InvalidPart(String),

    /// Variables could not be read as a flat map of strings.
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidVariables(err.to_string())
    }
}
