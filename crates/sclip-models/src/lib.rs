//! Shared data models for the ShortClip pipeline.
//!
//! Everything here is plain data: transcript words, silence intervals,
//! segment boundaries, crop geometry. The algorithms that produce and
//! consume these types live in `sclip-analysis`.

pub mod content;
pub mod reframe;
pub mod segment;
pub mod silence;
pub mod track;
pub mod word;

pub use content::ContentType;
pub use reframe::{Crop, CropKeyframe, ReframeResult, ReframeStrategy, Resolution};
pub use segment::{RoughSegment, SegmentError, SnappedSegment};
pub use silence::{merge_intervals, SilenceInterval};
pub use track::{is_strictly_ordered, TrackSample};
pub use word::{PunctuationKind, SentenceBoundary, Word};
