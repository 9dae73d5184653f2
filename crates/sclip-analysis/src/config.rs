//! Configuration for the analysis passes.
//!
//! Every threshold the algorithms consult is enumerated here with a
//! default; the literal values are empirically tuned starting points,
//! not derived constants, so all of them are settable.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Configuration for boundary snapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// A sentence boundary within this distance of the chosen word
    /// boundary wins the start snap (milliseconds).
    pub sentence_tolerance_ms: u64,

    /// How far past the rough end to look for a sentence boundary
    /// before falling back to a plain word boundary (milliseconds).
    pub sentence_extend_ms: u64,

    /// Fixed padding after the corrected end, protecting the audio
    /// decay of the final word (milliseconds).
    pub trailing_pad_ms: u64,

    /// Whether to refine boundaries toward detected silences.
    pub use_silence: bool,

    /// Search window around a boundary for a usable silence interval
    /// (milliseconds, applied on both sides).
    pub silence_window_ms: u64,

    /// Hard minimum clip duration (seconds). The end is extended,
    /// never the start.
    pub min_duration_sec: f64,

    /// Hard maximum clip duration (seconds). The end is trimmed back
    /// to a word boundary.
    pub max_duration_sec: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            sentence_tolerance_ms: 150,
            sentence_extend_ms: 3000,
            trailing_pad_ms: 300,
            use_silence: true,
            silence_window_ms: 500,
            min_duration_sec: 5.0,
            max_duration_sec: 60.0,
        }
    }
}

impl SnapConfig {
    /// Builder-style setter for silence refinement.
    pub fn with_silence(mut self, enabled: bool) -> Self {
        self.use_silence = enabled;
        self
    }

    /// Builder-style setter for the silence search window.
    pub fn with_silence_window_ms(mut self, ms: u64) -> Self {
        self.silence_window_ms = ms;
        self
    }

    /// Builder-style setter for the duration bounds.
    pub fn with_duration_bounds(mut self, min_sec: f64, max_sec: f64) -> Self {
        self.min_duration_sec = min_sec;
        self.max_duration_sec = max_sec;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.min_duration_sec <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "min_duration_sec must be positive".to_string(),
            ));
        }
        if self.min_duration_sec >= self.max_duration_sec {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_duration_sec ({}) must be below max_duration_sec ({})",
                self.min_duration_sec, self.max_duration_sec
            )));
        }
        Ok(())
    }
}

/// Which signal decides the dominant speaker when multiple faces
/// appear across a clip.
///
/// Both signals are always computed; this picks the primary metric
/// and the other breaks remaining ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantTieBreak {
    /// Highest cumulative on-screen time wins (default)
    ScreenTime,
    /// Largest average bounding-box area wins
    Area,
}

/// Configuration for subject tracking and reframing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeConfig {
    /// Fraction of source width visible for screen content
    /// (0.55 = 55% of the screen in frame).
    pub screen_zoom_fraction: f64,

    /// Standard deviation of the raw subject-x series (pixels) below
    /// which the crop is static rather than animated.
    pub jitter_threshold_px: f64,

    /// Time constant of the exponential moving average applied to the
    /// subject-x series (seconds). Motion over ~1s is followed,
    /// frame-to-frame noise is suppressed.
    pub ema_time_constant_sec: f64,

    /// Maximum deviation from linear interpolation allowed before a
    /// keyframe is kept (pixels).
    pub keyframe_epsilon_px: f64,

    /// Frames sampled per clip for face tracking.
    pub face_samples: usize,

    /// Frames sampled per clip for content classification.
    pub classify_samples: usize,

    /// Seconds between cursor-tracking samples.
    pub cursor_interval_sec: f64,

    /// Faces closer than this (normalized x distance) across frames
    /// are treated as the same person.
    pub face_match_distance: f64,

    /// Dominant-speaker selection metric.
    pub dominant_tie_break: DominantTieBreak,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            screen_zoom_fraction: 0.55,
            jitter_threshold_px: 12.0,
            ema_time_constant_sec: 0.35,
            keyframe_epsilon_px: 8.0,
            face_samples: 5,
            classify_samples: 10,
            cursor_interval_sec: 0.5,
            face_match_distance: 0.1,
            dominant_tie_break: DominantTieBreak::ScreenTime,
        }
    }
}

impl ReframeConfig {
    /// Builder-style setter for the screen zoom fraction.
    pub fn with_screen_zoom(mut self, fraction: f64) -> Self {
        self.screen_zoom_fraction = fraction;
        self
    }

    /// Builder-style setter for the jitter threshold.
    pub fn with_jitter_threshold_px(mut self, px: f64) -> Self {
        self.jitter_threshold_px = px;
        self
    }

    /// Builder-style setter for the EMA time constant.
    pub fn with_ema_time_constant(mut self, sec: f64) -> Self {
        self.ema_time_constant_sec = sec;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(0.0..=1.0).contains(&self.screen_zoom_fraction) || self.screen_zoom_fraction == 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "screen_zoom_fraction must be in (0, 1], got {}",
                self.screen_zoom_fraction
            )));
        }
        if self.ema_time_constant_sec <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "ema_time_constant_sec must be positive".to_string(),
            ));
        }
        if self.keyframe_epsilon_px <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "keyframe_epsilon_px must be positive".to_string(),
            ));
        }
        if self.face_samples == 0 || self.classify_samples == 0 {
            return Err(AnalysisError::InvalidConfig(
                "sample counts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        SnapConfig::default().validate().unwrap();
        ReframeConfig::default().validate().unwrap();
    }

    #[test]
    fn test_snap_duration_bounds_checked() {
        let config = SnapConfig::default().with_duration_bounds(60.0, 5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zoom_fraction_checked() {
        assert!(ReframeConfig::default().with_screen_zoom(0.0).validate().is_err());
        assert!(ReframeConfig::default().with_screen_zoom(1.5).validate().is_err());
        assert!(ReframeConfig::default().with_screen_zoom(0.55).validate().is_ok());
    }
}
