//! Crop planning for 9:16 delivery.
//!
//! Takes a clip's content type and subject trajectory and produces
//! either a static crop or a keyframed horizontal pan. The renderer
//! downstream only ever sees rectangles and keyframes; all tracking
//! noise is absorbed here.

use tracing::debug;

use sclip_models::{
    ContentType, Crop, CropKeyframe, ReframeResult, ReframeStrategy, Resolution, TrackSample,
};

use crate::config::ReframeConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::smoothing::{ema_irregular, mean, std_deviation};

/// Fixed delivery resolution for vertical output.
pub const OUTPUT_RESOLUTION: Resolution = Resolution {
    width: 1080,
    height: 1920,
};

/// Plans crop trajectories from subject tracks.
pub struct ReframeEngine {
    config: ReframeConfig,
}

impl ReframeEngine {
    /// Create an engine, validating the configuration up front.
    pub fn new(config: ReframeConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Plan the crop for one clip.
    ///
    /// `samples` is the subject trajectory from the matching tracker
    /// (dominant face or cursor); an empty series falls back to a
    /// centered static crop.
    pub fn plan(
        &self,
        content_type: ContentType,
        source: Resolution,
        samples: &[TrackSample],
    ) -> AnalysisResult<ReframeResult> {
        let (crop_w, crop_h) = self.crop_size(content_type, source)?;
        let crop_y = (source.height - crop_h) / 2;
        let max_x = source.width - crop_w;
        let centered_x = max_x / 2;

        let tracked_strategy = if content_type.is_face_driven() {
            ReframeStrategy::FaceTrack
        } else {
            ReframeStrategy::CursorTrack
        };

        if samples.is_empty() {
            let strategy = if content_type.is_face_driven() {
                ReframeStrategy::FaceTrack
            } else {
                ReframeStrategy::Framed
            };
            debug!(%content_type, "No subject samples, centered fallback crop");
            return Ok(ReframeResult {
                strategy,
                source_resolution: source,
                crop: Crop::new(centered_x, crop_y, crop_w, crop_h),
                crop_keyframes: Vec::new(),
                output_resolution: OUTPUT_RESOLUTION,
            });
        }

        // Subject center to clamped crop-left, in source pixels
        let crop_xs: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| {
                let center_px = s.x * source.width as f64;
                let x = (center_px - crop_w as f64 / 2.0).clamp(0.0, max_x as f64);
                (s.t_sec, x)
            })
            .collect();

        let raw_xs: Vec<f64> = crop_xs.iter().map(|&(_, x)| x).collect();
        let spread = std_deviation(&raw_xs);

        if spread < self.config.jitter_threshold_px {
            let static_x = mean(&raw_xs).round().min(max_x as f64) as u32;
            debug!(
                spread_px = spread,
                crop_x = static_x,
                "Subject steady, static crop"
            );
            return Ok(ReframeResult {
                strategy: tracked_strategy,
                source_resolution: source,
                crop: Crop::new(static_x, crop_y, crop_w, crop_h),
                crop_keyframes: Vec::new(),
                output_resolution: OUTPUT_RESOLUTION,
            });
        }

        let smoothed = ema_irregular(&crop_xs, self.config.ema_time_constant_sec);
        let keyframes = reduce_keyframes(&smoothed, self.config.keyframe_epsilon_px);

        // A pan that rounds to a single position is a static crop
        let all_same = keyframes.iter().all(|k| k.x == keyframes[0].x);
        if keyframes.len() < 2 || all_same {
            let static_x = keyframes.first().map_or(centered_x, |k| k.x);
            return Ok(ReframeResult {
                strategy: tracked_strategy,
                source_resolution: source,
                crop: Crop::new(static_x, crop_y, crop_w, crop_h),
                crop_keyframes: Vec::new(),
                output_resolution: OUTPUT_RESOLUTION,
            });
        }

        debug!(
            keyframes = keyframes.len(),
            spread_px = spread,
            "Animated pan planned"
        );

        let first_x = keyframes[0].x;
        Ok(ReframeResult {
            strategy: tracked_strategy,
            source_resolution: source,
            crop: Crop::new(first_x, crop_y, crop_w, crop_h),
            crop_keyframes: keyframes,
            output_resolution: OUTPUT_RESOLUTION,
        })
    }

    /// Crop dimensions for the content type.
    ///
    /// Face-driven content uses the full source height at exact 9:16.
    /// Screen content keeps the full source height and zooms to a
    /// fraction of the source width so text stays legible; the renderer
    /// maps that rectangle onto the 9:16 canvas.
    fn crop_size(&self, content_type: ContentType, source: Resolution) -> AnalysisResult<(u32, u32)> {
        let (crop_w, crop_h) = if content_type.is_face_driven() {
            let crop_h = source.height;
            let crop_w = (source.height as f64 * 9.0 / 16.0).round() as u32;
            (crop_w, crop_h)
        } else {
            let crop_w = (source.width as f64 * self.config.screen_zoom_fraction).round() as u32;
            (crop_w, source.height)
        };

        if crop_w == 0 || crop_h == 0 || crop_w > source.width || crop_h > source.height {
            return Err(AnalysisError::CropUnsatisfiable {
                width: source.width,
                height: source.height,
                crop_w,
                crop_h,
            });
        }

        Ok((crop_w, crop_h))
    }
}

/// Greedy keyframe reduction.
///
/// Keeps a point only when dropping it would let the linearly
/// interpolated path drift more than `epsilon_px` from the smoothed
/// series. The first and last samples are always kept, so purely
/// linear motion reduces to exactly two keyframes.
fn reduce_keyframes(series: &[(f64, f64)], epsilon_px: f64) -> Vec<CropKeyframe> {
    if series.len() <= 2 {
        return series
            .iter()
            .map(|&(t, x)| CropKeyframe {
                t,
                x: x.round() as u32,
            })
            .collect();
    }

    let mut kept = vec![series[0]];
    let mut anchor = series[0];
    let mut prev = series[1];

    for &point in &series[2..] {
        let span = prev.0 - anchor.0;
        let predicted = if span <= f64::EPSILON {
            prev.1
        } else {
            anchor.1 + (prev.1 - anchor.1) / span * (point.0 - anchor.0)
        };

        if (point.1 - predicted).abs() > epsilon_px {
            kept.push(prev);
            anchor = prev;
        }
        prev = point;
    }
    kept.push(prev);

    kept.into_iter()
        .map(|(t, x)| CropKeyframe {
            t,
            x: x.round() as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ReframeEngine {
        ReframeEngine::new(ReframeConfig::default()).unwrap()
    }

    fn hd() -> Resolution {
        Resolution::new(1920, 1080)
    }

    fn sample(t: f64, x: f64) -> TrackSample {
        TrackSample::new(t, x, 0.4, 0.9)
    }

    #[test]
    fn test_face_crop_full_height() {
        let result = engine()
            .plan(ContentType::TalkingHead, hd(), &[sample(0.0, 0.5)])
            .unwrap();
        assert_eq!(result.crop.h, 1080);
        assert_eq!(result.crop.w, 608);
        assert_eq!(result.crop.y, 0);
        assert!(result.crop.fits_within(1920, 1080));
    }

    #[test]
    fn test_screen_crop_zoomed() {
        // 55% of the source width at full height: 1056x1080 on HD
        let result = engine()
            .plan(ContentType::Screen, hd(), &[])
            .unwrap();
        assert_eq!(result.crop.w, 1056);
        assert_eq!(result.crop.h, 1080);
        assert_eq!(result.crop.y, 0);
        assert_eq!(result.strategy, ReframeStrategy::Framed);
        // Centered: (1920 - 1056) / 2
        assert_eq!(result.crop.x, 432);
    }

    #[test]
    fn test_screen_crop_custom_zoom() {
        let engine =
            ReframeEngine::new(ReframeConfig::default().with_screen_zoom(0.7)).unwrap();
        let result = engine.plan(ContentType::Screen, hd(), &[]).unwrap();
        assert_eq!(result.crop.w, 1344);
        assert_eq!(result.crop.h, 1080);
    }

    #[test]
    fn test_screen_crop_tall_source() {
        let result = engine()
            .plan(ContentType::Screen, Resolution::new(1080, 2400), &[])
            .unwrap();
        assert_eq!(result.crop.w, 594);
        assert_eq!(result.crop.h, 2400);
        assert!(result.crop.fits_within(1080, 2400));
    }

    #[test]
    fn test_empty_samples_centered_fallback() {
        let result = engine()
            .plan(ContentType::TalkingHead, hd(), &[])
            .unwrap();
        assert_eq!(result.strategy, ReframeStrategy::FaceTrack);
        assert!(!result.is_animated());
        // Centered: (1920 - 608) / 2
        assert_eq!(result.crop.x, 656);
    }

    #[test]
    fn test_jittery_but_steady_subject_is_static() {
        // Subject wobbles a few pixels around center; spread is under
        // the jitter threshold so no pan is produced.
        let samples: Vec<TrackSample> = (0..10)
            .map(|i| sample(i as f64 * 0.5, 0.5 + (i % 2) as f64 * 0.005))
            .collect();
        let result = engine()
            .plan(ContentType::TalkingHead, hd(), &samples)
            .unwrap();
        assert!(!result.is_animated());
        assert_eq!(result.strategy, ReframeStrategy::FaceTrack);
    }

    #[test]
    fn test_linear_cursor_motion_few_keyframes() {
        // Cursor sweeps steadily left to right over ~6s; the pan must
        // compress to a handful of keyframes that reproduce the motion
        // within the configured pixel threshold.
        let samples: Vec<TrackSample> = (0..12)
            .map(|i| sample(i as f64 * 0.5, 0.2 + i as f64 * 0.05))
            .collect();
        let result = engine()
            .plan(ContentType::Screen, hd(), &samples)
            .unwrap();
        assert_eq!(result.strategy, ReframeStrategy::CursorTrack);
        assert!(result.is_animated());
        assert!(result.crop_keyframes.len() <= 6);
        let first = result.crop_keyframes[0];
        let last = result.crop_keyframes[result.crop_keyframes.len() - 1];
        assert!(last.x > first.x);
        assert!(last.t > first.t);

        // Interpolated path stays close to the smoothed series
        let crop_xs: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| {
                let x = (s.x * 1920.0 - result.crop.w as f64 / 2.0)
                    .clamp(0.0, (1920 - result.crop.w) as f64);
                (s.t_sec, x)
            })
            .collect();
        let smoothed = ema_irregular(&crop_xs, ReframeConfig::default().ema_time_constant_sec);
        for (t, x) in smoothed {
            let err = (result.crop_x_at(t) as f64 - x).abs();
            assert!(err < 8.0, "interpolation error {err} at t={t}");
        }
    }

    #[test]
    fn test_direction_change_keeps_middle_keyframe() {
        // Out and back: the turning point must survive reduction
        let mut samples = Vec::new();
        for i in 0..8 {
            samples.push(sample(i as f64 * 0.5, 0.2 + i as f64 * 0.06));
        }
        for i in 8..16 {
            samples.push(sample(i as f64 * 0.5, 0.2 + (15 - i) as f64 * 0.06));
        }
        let result = engine()
            .plan(ContentType::Screen, hd(), &samples)
            .unwrap();
        assert!(result.is_animated());
        assert!(result.crop_keyframes.len() >= 3);
    }

    #[test]
    fn test_keyframes_clamped_to_frame() {
        // Subject at the far right edge; crop x must not exceed the
        // source width minus the crop width.
        let samples: Vec<TrackSample> = (0..10)
            .map(|i| sample(i as f64 * 0.5, 0.5 + i as f64 * 0.055))
            .collect();
        let result = engine()
            .plan(ContentType::TalkingHead, hd(), &samples)
            .unwrap();
        let max_x = 1920 - result.crop.w;
        for kf in &result.crop_keyframes {
            assert!(kf.x <= max_x);
        }
    }

    #[test]
    fn test_tiny_source_rejected() {
        let err = engine()
            .plan(ContentType::TalkingHead, Resolution::new(100, 1080), &[])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CropUnsatisfiable { .. }));
    }

    #[test]
    fn test_keyframe_times_strictly_increasing() {
        let samples: Vec<TrackSample> = (0..20)
            .map(|i| {
                let wave = 0.5 + 0.2 * ((i as f64) * 0.7).sin();
                sample(i as f64 * 0.5, wave)
            })
            .collect();
        let result = engine()
            .plan(ContentType::Screen, hd(), &samples)
            .unwrap();
        for pair in result.crop_keyframes.windows(2) {
            assert!(pair[0].t < pair[1].t);
        }
    }
}
