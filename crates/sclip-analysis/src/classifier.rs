//! Content type classification from sampled-frame face detections.
//!
//! The classifier is a best-guess heuristic over face count, size and
//! position; the caller may always override the label, so low
//! confidence is reported rather than treated as failure.

use serde::Serialize;
use tracing::debug;

use sclip_media::FaceDetection;
use sclip_models::ContentType;

/// Aggregated face statistics over the sampled frames.
#[derive(Debug, Clone, Serialize)]
pub struct FaceStats {
    /// Mean number of faces per sampled frame
    pub avg_count: f64,
    /// Mean face area as a percentage of frame area
    pub avg_size_pct: f64,
    /// How centered faces are horizontally: 1.0 = perfectly centered
    pub center_bias: f64,
    /// Frames with at least one detection
    pub frames_with_faces: usize,
    /// Total frames sampled
    pub total_frames: usize,
}

impl FaceStats {
    /// Compute statistics from per-frame detection lists.
    pub fn from_frames(frames: &[Vec<FaceDetection>]) -> Self {
        let total_frames = frames.len();
        let mut frames_with_faces = 0;
        let mut count_sum = 0usize;
        let mut sizes = Vec::new();
        let mut centers_x = Vec::new();

        for detections in frames {
            count_sum += detections.len();
            if !detections.is_empty() {
                frames_with_faces += 1;
            }
            for det in detections {
                sizes.push(det.area_fraction() * 100.0);
                centers_x.push(det.cx());
            }
        }

        let avg_count = if total_frames > 0 {
            count_sum as f64 / total_frames as f64
        } else {
            0.0
        };
        let avg_size_pct = mean(&sizes);
        let center_bias = if centers_x.is_empty() {
            0.0
        } else {
            let mean_offset =
                centers_x.iter().map(|x| (x - 0.5).abs()).sum::<f64>() / centers_x.len() as f64;
            1.0 - mean_offset * 2.0
        };

        Self {
            avg_count,
            avg_size_pct,
            center_bias,
            frames_with_faces,
            total_frames,
        }
    }

    /// Fraction of sampled frames containing a face.
    pub fn face_ratio(&self) -> f64 {
        self.frames_with_faces as f64 / self.total_frames.max(1) as f64
    }
}

/// Classify a clip's content type from face statistics.
///
/// Rules, in order:
/// - screen: few/no faces, or very small faces on few frames
/// - podcast: two or more faces present consistently
/// - talking-head: a single sizable face
/// - otherwise screen at low confidence
pub fn classify_content(stats: &FaceStats) -> (ContentType, f64) {
    let face_ratio = stats.face_ratio();

    let (content_type, confidence) =
        if stats.avg_count < 0.5 || (stats.avg_size_pct < 5.0 && face_ratio < 0.5) {
            let confidence = ((1.0 - stats.avg_count) * 0.5 + (1.0 - face_ratio) * 0.5).min(1.0);
            (ContentType::Screen, confidence)
        } else if stats.avg_count >= 1.8 && face_ratio > 0.7 {
            let confidence = ((stats.avg_count - 1.0) * 0.3 + face_ratio * 0.3 + 0.4).min(1.0);
            (ContentType::Podcast, confidence)
        } else if stats.avg_count >= 0.5 && stats.avg_size_pct >= 5.0 {
            let confidence = (stats.center_bias * 0.4
                + (stats.avg_size_pct / 20.0).min(1.0) * 0.3
                + face_ratio * 0.3)
                .min(1.0);
            (ContentType::TalkingHead, confidence)
        } else {
            (ContentType::Screen, 0.5)
        };

    debug!(
        content_type = %content_type,
        confidence,
        avg_count = stats.avg_count,
        avg_size_pct = stats.avg_size_pct,
        "Content classified"
    );

    (content_type, confidence.max(0.0))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
