//! Pipeline-level errors and per-clip failure records.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use sclip_analysis::AnalysisError;
use sclip_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal pipeline errors.
///
/// Anything surfacing here aborts the run before output is written.
/// Per-clip problems are collected as [`ClipFailure`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No clip files found in {0}")]
    NoClips(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,
}

/// One clip's failure, reported alongside the batch's successes.
#[derive(Debug, Clone, Serialize)]
pub struct ClipFailure {
    /// Clip file name or segment id
    pub clip: String,
    /// Human-readable cause
    pub error: String,
}

impl ClipFailure {
    pub fn new(clip: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            clip: clip.into(),
            error: error.to_string(),
        }
    }
}
