//! Face detection provider seam.
//!
//! Detection itself runs out of process: the provider shells out to a
//! configured detector command (a MediaPipe/ONNX wrapper script) that
//! prints one JSON array of detections for a frame image. Keeping the
//! model out of process keeps this crate free of ML runtime
//! dependencies and lets the detector be swapped without a rebuild.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// One detected face in a frame, coordinates normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FaceDetection {
    /// Left edge of the bounding box
    pub x: f64,
    /// Top edge of the bounding box
    pub y: f64,
    /// Bounding box width
    pub w: f64,
    /// Bounding box height
    pub h: f64,
    /// Detector score in `[0, 1]`
    pub score: f64,
}

impl FaceDetection {
    /// Horizontal center of the bounding box.
    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Vertical center of the bounding box.
    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Fraction of frame area covered by the box.
    pub fn area_fraction(&self) -> f64 {
        (self.w * self.h).max(0.0)
    }
}

/// Face detection provider.
///
/// One call per extracted frame image; an empty vector is a valid
/// result (no faces), errors are reserved for detector failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a single frame image.
    async fn detect(&self, frame: &Path) -> MediaResult<Vec<FaceDetection>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Detector that runs an external command per frame.
///
/// The command is invoked as `<program> <frame_path>` and must print a
/// JSON array of `{x, y, w, h, score}` objects with normalized
/// coordinates on stdout.
pub struct CommandFaceDetector {
    program: PathBuf,
    /// Minimum score to keep a detection
    min_score: f64,
    /// Per-frame timeout
    timeout: Duration,
}

impl CommandFaceDetector {
    /// Create a detector for the given program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            min_score: 0.5,
            timeout: Duration::from_secs(20),
        }
    }

    /// Builder-style setter for the minimum detection score.
    pub fn with_min_score(mut self, score: f64) -> Self {
        self.min_score = score.clamp(0.0, 1.0);
        self
    }

    /// Builder-style setter for the per-frame timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl FaceDetector for CommandFaceDetector {
    async fn detect(&self, frame: &Path) -> MediaResult<Vec<FaceDetection>> {
        if !frame.exists() {
            return Err(MediaError::FileNotFound(frame.to_path_buf()));
        }

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .arg(frame)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| MediaError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| {
            MediaError::detection_failed(format!(
                "Failed to run detector {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::detection_failed(format!(
                "Detector exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let detections: Vec<FaceDetection> = match serde_json::from_str(stdout.trim()) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "Unparseable detector output, treating as no faces");
                return Ok(Vec::new());
            }
        };

        let kept: Vec<FaceDetection> = detections
            .into_iter()
            .filter(|d| d.score >= self.min_score && d.w > 0.0 && d.h > 0.0)
            .collect();

        debug!(
            frame = %frame.display(),
            detections = kept.len(),
            "Face detection complete"
        );

        Ok(kept)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
