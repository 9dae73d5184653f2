//! FFmpeg/FFprobe adapters for the ShortClip pipeline.
//!
//! This crate provides:
//! - Video probing via FFprobe JSON output
//! - Type-safe FFmpeg command building with cancellation
//! - Silence detection via FFmpeg `silencedetect`
//! - Frame sampling and extraction
//! - The face-detector provider seam
//! - Frame-differencing blob candidates for cursor tracking

pub mod command;
pub mod detect;
pub mod error;
pub mod frames;
pub mod motion;
pub mod probe;
pub mod silence;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use detect::{CommandFaceDetector, FaceDetection, FaceDetector};
pub use error::{MediaError, MediaResult};
pub use frames::{
    extract_frame, interval_timestamps, load_gray_frame, uniform_timestamps, FrameSampler,
};
pub use motion::{diff_candidates, MotionBlob, MotionConfig};
pub use probe::{probe_video, VideoInfo};
pub use silence::{detect_silences, SilenceProbeConfig};
