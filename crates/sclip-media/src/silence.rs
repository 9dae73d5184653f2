//! Silence detection via FFmpeg `silencedetect`.
//!
//! Thin adapter over FFmpeg's audio filter: the filter prints
//! `silence_start` / `silence_end` pairs on stderr, which are parsed
//! into normalized, non-overlapping intervals.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use sclip_models::{merge_intervals, SilenceInterval};

/// Configuration for the silence probe.
#[derive(Debug, Clone)]
pub struct SilenceProbeConfig {
    /// Noise floor in dBFS; audio below this counts as silence.
    ///
    /// - -30dB: aggressive, quiet speech may count as silence
    /// - -35dB: default, works for typical screen/voice recordings
    /// - -45dB: conservative, only near-total silence
    pub noise_threshold_db: i32,

    /// Minimum quiet span to report, in seconds.
    pub min_duration_sec: f64,

    /// Adjacent intervals closer than this are merged, in milliseconds.
    pub merge_epsilon_ms: u64,
}

impl Default for SilenceProbeConfig {
    fn default() -> Self {
        Self {
            noise_threshold_db: -35,
            min_duration_sec: 0.3,
            merge_epsilon_ms: 50,
        }
    }
}

impl SilenceProbeConfig {
    /// Builder-style setter for the noise floor.
    pub fn with_noise_threshold_db(mut self, db: i32) -> Self {
        self.noise_threshold_db = db;
        self
    }

    /// Builder-style setter for the minimum duration.
    pub fn with_min_duration_sec(mut self, sec: f64) -> Self {
        self.min_duration_sec = sec.max(0.0);
        self
    }
}

/// Find silence intervals in a video or audio file.
///
/// Returns a sorted, non-overlapping interval list with near-duplicate
/// intervals merged.
pub async fn detect_silences(
    input: impl AsRef<Path>,
    config: &SilenceProbeConfig,
) -> MediaResult<Vec<SilenceInterval>> {
    let input = input.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let filter = format!(
        "silencedetect=noise={}dB:d={}",
        config.noise_threshold_db, config.min_duration_sec
    );

    debug!(
        path = %input.display(),
        filter = %filter,
        "Running silencedetect"
    );

    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(input)
        .args(["-af", &filter, "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    // silencedetect writes to stderr even on success; a hard failure
    // still surfaces through the exit status.
    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "silencedetect run failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let intervals = parse_silencedetect_output(&stderr);
    let merged = merge_intervals(intervals, config.merge_epsilon_ms);

    debug!(count = merged.len(), "Silence detection complete");

    Ok(merged)
}

/// Parse `silence_start` / `silence_end` pairs from FFmpeg stderr.
fn parse_silencedetect_output(stderr: &str) -> Vec<SilenceInterval> {
    let mut intervals = Vec::new();
    let mut current_start: Option<f64> = None;

    for line in stderr.lines() {
        if let Some(rest) = line.split("silence_start:").nth(1) {
            current_start = rest.split_whitespace().next().and_then(|v| v.parse().ok());
        } else if let Some(rest) = line.split("silence_end:").nth(1) {
            let mut parts = rest.split_whitespace();
            let end: Option<f64> = parts.next().and_then(|v| v.parse().ok());

            if let (Some(start), Some(end)) = (current_start.take(), end) {
                if end > start && start >= 0.0 {
                    intervals.push(SilenceInterval::new(
                        (start * 1000.0).round() as u64,
                        (end * 1000.0).round() as u64,
                    ));
                }
            }
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STDERR: &str = "\
[silencedetect @ 0x5596] silence_start: 12.345\n\
frame= 1000 fps=250\n\
[silencedetect @ 0x5596] silence_end: 13.045 | silence_duration: 0.7\n\
[silencedetect @ 0x5596] silence_start: 60.0\n\
[silencedetect @ 0x5596] silence_end: 61.5 | silence_duration: 1.5\n";

    #[test]
    fn test_parse_pairs() {
        let intervals = parse_silencedetect_output(SAMPLE_STDERR);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start_ms, 12345);
        assert_eq!(intervals[0].end_ms, 13045);
        assert_eq!(intervals[1].start_ms, 60000);
        assert_eq!(intervals[1].end_ms, 61500);
    }

    #[test]
    fn test_parse_unmatched_start_ignored() {
        let intervals = parse_silencedetect_output("silence_start: 5.0\n");
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_parse_garbage_tolerated() {
        let intervals =
            parse_silencedetect_output("silence_start: abc\nsilence_end: 3.0\nnoise\n");
        assert!(intervals.is_empty());
    }
}
