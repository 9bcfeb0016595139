//! Error types shared by the toolkit's library modules.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;

/// Failures surfaced to callers. Best-effort misses (no TOC styles found, no
/// TOC field to fill) are not errors and never show up here.
#[derive(Error, Debug)]
pub enum ToolkitError {
    /// The target file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A required part inside a package is missing.
    #[error("{0} not found in the package")]
    MissingContent(String),

    /// Caller-supplied structured data could not be parsed or validated.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The container could not be unpacked or repacked.
    #[error("Packaging failure: {0}")]
    Packaging(String),

    /// PDF parsing or serialization error.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP error while fetching a remote resource.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for ToolkitError {
    fn from(err: zip::result::ZipError) -> Self {
        ToolkitError::Packaging(err.to_string())
    }
}
