//! Raw subject-position samples.

use serde::{Deserialize, Serialize};

/// One frame's detected subject position.
///
/// Coordinates are normalized to `[0, 1]` in source frame space so the
/// same series works at any analysis resolution. Series may be gappy:
/// frames with no usable detection are simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    /// Clip-local timestamp in seconds, strictly increasing per clip
    pub t_sec: f64,
    /// Normalized horizontal position of the subject center
    pub x: f64,
    /// Normalized vertical position of the subject center
    pub y: f64,
    /// Detector confidence in `[0, 1]`
    pub confidence: f64,
}

impl TrackSample {
    /// Create a sample, clamping coordinates and confidence into range.
    pub fn new(t_sec: f64, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            t_sec,
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Check that sample timestamps are strictly increasing.
pub fn is_strictly_ordered(samples: &[TrackSample]) -> bool {
    samples.windows(2).all(|w| w[0].t_sec < w[1].t_sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let s = TrackSample::new(1.0, 1.5, -0.2, 3.0);
        assert_eq!(s.x, 1.0);
        assert_eq!(s.y, 0.0);
        assert_eq!(s.confidence, 1.0);
    }

    #[test]
    fn test_ordering_check() {
        let ordered = vec![
            TrackSample::new(0.0, 0.5, 0.5, 1.0),
            TrackSample::new(0.5, 0.5, 0.5, 1.0),
            TrackSample::new(1.0, 0.5, 0.5, 1.0),
        ];
        assert!(is_strictly_ordered(&ordered));

        let unordered = vec![
            TrackSample::new(0.5, 0.5, 0.5, 1.0),
            TrackSample::new(0.5, 0.5, 0.5, 1.0),
        ];
        assert!(!is_strictly_ordered(&unordered));
    }
}
