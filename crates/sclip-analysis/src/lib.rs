//! Boundary snapping and content-aware reframe algorithms.
//!
//! The two analysis passes of the ShortClip pipeline:
//! - `BoundarySnapper` corrects rough segment boundaries against the
//!   word timeline and detected silences.
//! - content classification, subject tracking and `ReframeEngine` turn
//!   sampled frame detections into a static or animated crop plan.
//!
//! Everything here is pure computation over already-extracted data;
//! decoding and detection live in `sclip-media`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod reframe;
pub mod smoothing;
pub mod snapper;
pub mod tracker;
pub mod transcript;

pub use classifier::{classify_content, FaceStats};
pub use config::{DominantTieBreak, ReframeConfig, SnapConfig};
pub use error::{AnalysisError, AnalysisResult};
pub use reframe::{ReframeEngine, OUTPUT_RESOLUTION};
pub use snapper::BoundarySnapper;
pub use tracker::{cursor_track, dominant_face_track};
pub use transcript::TranscriptIndex;
