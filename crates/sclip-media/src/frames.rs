//! Frame sampling and extraction.
//!
//! Frames are extracted with fast-seek FFmpeg invocations into a
//! temporary directory and decoded with the `image` crate. Extraction
//! is the only blocking I/O in the analysis path, so callers run it
//! through a bounded worker pool.

use image::GrayImage;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Timestamps for `n` frames sampled uniformly across `duration` seconds.
///
/// Each sample sits at the center of its bucket, so a 10s clip sampled
/// 5 times yields 1.0, 3.0, 5.0, 7.0, 9.0.
pub fn uniform_timestamps(duration: f64, n: usize) -> Vec<f64> {
    if duration <= 0.0 || n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| duration * (i as f64 + 0.5) / n as f64)
        .collect()
}

/// Timestamps at a fixed interval from 0 to `duration`.
pub fn interval_timestamps(duration: f64, interval: f64) -> Vec<f64> {
    if duration <= 0.0 || interval <= 0.0 {
        return Vec::new();
    }
    let mut timestamps = Vec::new();
    let mut t = 0.0;
    while t < duration {
        timestamps.push(t);
        t += interval;
    }
    timestamps
}

/// Extract a single frame at `timestamp` seconds into `out_path` as JPEG.
pub async fn extract_frame(
    video: impl AsRef<Path>,
    timestamp: f64,
    out_path: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video.as_ref(), out_path.as_ref())
        .seek(timestamp)
        .single_frame()
        .frame_quality(2);

    runner.run(&cmd).await?;

    if !out_path.as_ref().exists() {
        return Err(MediaError::FrameDecodeFailed(format!(
            "No frame produced at t={:.2}s",
            timestamp
        )));
    }

    Ok(())
}

/// Load an extracted frame as grayscale.
pub fn load_gray_frame(path: impl AsRef<Path>) -> MediaResult<GrayImage> {
    let img = image::open(path.as_ref())
        .map_err(|e| MediaError::FrameDecodeFailed(e.to_string()))?;
    Ok(img.to_luma8())
}

/// Extracts frames for a clip into a private temporary directory.
///
/// The directory (and all extracted frames) is removed when the sampler
/// is dropped, so decoded frames are never pinned past analysis.
pub struct FrameSampler {
    video: PathBuf,
    tmpdir: TempDir,
    runner: FfmpegRunner,
}

impl FrameSampler {
    /// Create a sampler for a video file.
    pub fn new(video: impl AsRef<Path>, runner: FfmpegRunner) -> MediaResult<Self> {
        let video = video.as_ref().to_path_buf();
        if !video.exists() {
            return Err(MediaError::FileNotFound(video));
        }
        let tmpdir = TempDir::with_prefix("sclip_frames_")?;
        Ok(Self {
            video,
            tmpdir,
            runner,
        })
    }

    /// Extract one frame at `timestamp`; returns the JPEG path.
    pub async fn frame_at(&self, timestamp: f64) -> MediaResult<PathBuf> {
        let out_path = self.tmpdir.path().join(format!("f_{:08.2}.jpg", timestamp));
        extract_frame(&self.video, timestamp, &out_path, &self.runner).await?;
        Ok(out_path)
    }

    /// Extract frames at the given timestamps, skipping ones FFmpeg
    /// could not produce (e.g. past end of stream).
    pub async fn frames_at(&self, timestamps: &[f64]) -> MediaResult<Vec<(f64, PathBuf)>> {
        let mut frames = Vec::with_capacity(timestamps.len());
        for &ts in timestamps {
            match self.frame_at(ts).await {
                Ok(path) => frames.push((ts, path)),
                Err(MediaError::Cancelled) => return Err(MediaError::Cancelled),
                Err(e) => {
                    debug!(t = ts, error = %e, "Skipping unextractable frame");
                }
            }
        }
        Ok(frames)
    }
}
