//! Error types for analysis operations.

use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during boundary snapping and reframing.
///
/// Degraded inputs (missing words in range, detector failures) are
/// handled with documented fallbacks and never produce an error here;
/// these variants are the per-clip constraint violations and the
/// pipeline-fatal conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Transcript contains no words")]
    EmptyTranscript,

    #[error("Transcript words are not time-ordered at index {0}")]
    UnorderedWords(usize),

    #[error("Invalid rough segment: {0}")]
    InvalidSegment(String),

    #[error(
        "Segment {id:?}: duration {duration:.2}s below minimum {min:.2}s even at video end"
    )]
    DurationUnattainable {
        id: Option<String>,
        duration: f64,
        min: f64,
    },

    #[error("Crop cannot fit: source {width}x{height} with crop {crop_w}x{crop_h}")]
    CropUnsatisfiable {
        width: u32,
        height: u32,
        crop_w: u32,
        crop_h: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
