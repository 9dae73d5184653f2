//! Rough and snapped segment boundaries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for segment ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("Segment start ({start}s) must be before end ({end}s)")]
    StartNotBeforeEnd { start: f64, end: f64 },

    #[error("Segment times must be non-negative")]
    Negative,
}

/// An externally chosen candidate time range, second-level precision.
///
/// Produced by the upstream selection step; this crate makes no
/// assumption about how the range was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughSegment {
    /// Caller-assigned identifier, carried through to output
    #[serde(default)]
    pub id: Option<String>,
    /// Proposed start in seconds
    pub start: f64,
    /// Proposed end in seconds
    pub end: f64,
}

impl RoughSegment {
    /// Create a rough segment without an id.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            id: None,
            start,
            end,
        }
    }

    /// Create a rough segment with an id.
    pub fn with_id(id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: Some(id.into()),
            start,
            end,
        }
    }

    /// Validate the proposed range.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.start < 0.0 || self.end < 0.0 {
            return Err(SegmentError::Negative);
        }
        if self.start >= self.end {
            return Err(SegmentError::StartNotBeforeEnd {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Proposed duration in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A corrected, renderable segment.
///
/// Invariants upheld by the snapper: the start lies on a word boundary
/// (unless the transcript had no words in range), duration is within
/// the configured min/max, and both bounds are clamped to the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnappedSegment {
    /// Identifier carried over from the rough segment
    #[serde(default)]
    pub id: Option<String>,
    /// Corrected start in seconds
    pub start: f64,
    /// Corrected end in seconds
    pub end: f64,
    /// Corrected duration in seconds
    pub duration: f64,
    /// Signed start adjustment versus the rough input, ms
    pub start_delta_ms: i64,
    /// Signed end adjustment versus the rough input, ms
    pub end_delta_ms: i64,
}

impl SnappedSegment {
    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Reconstruct the rough segment this would round-trip to.
    ///
    /// Feeding a snapped segment back through the snapper must return
    /// it unchanged; this helper makes that property easy to test.
    pub fn as_rough(&self) -> RoughSegment {
        RoughSegment {
            id: self.id.clone(),
            start: self.start,
            end: self.end,
        }
    }
}
