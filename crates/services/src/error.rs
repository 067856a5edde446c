//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use exam_core::TrackerError;
use exam_core::model::CatalogError;
use storage::repository::StorageError;

/// Errors emitted while loading the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to fetch questions: {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors emitted by exam sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while writing an export file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("failed to encode export: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
