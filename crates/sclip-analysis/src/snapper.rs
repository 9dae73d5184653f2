//! Boundary snapping: rough segment in, renderable segment out.
//!
//! Corrections are applied in a fixed order per segment:
//! 1. Start to a word boundary, preferring a nearby sentence boundary
//! 2. End to a sentence boundary within the extension window, else the
//!    next word boundary
//! 3. Trailing padding after the corrected end
//! 4. Optional refinement toward detected silences, discarded whenever
//!    it would land inside a word
//! 5. Min/max duration enforcement (end moves, start never does)
//! 6. Clamping to the video range
//!
//! Sentence-boundary correction outranks plain word snapping; silence
//! refinement is the lowest-priority adjustment.

use tracing::debug;

use sclip_models::{RoughSegment, SilenceInterval, SnappedSegment};

use crate::config::SnapConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::transcript::TranscriptIndex;

/// Snaps rough segment boundaries to the word timeline and silences.
pub struct BoundarySnapper<'a> {
    index: &'a TranscriptIndex,
    silences: &'a [SilenceInterval],
    config: SnapConfig,
    video_duration_ms: u64,
}

impl<'a> BoundarySnapper<'a> {
    /// Create a snapper for one source video.
    pub fn new(
        index: &'a TranscriptIndex,
        silences: &'a [SilenceInterval],
        config: SnapConfig,
        video_duration_sec: f64,
    ) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            index,
            silences,
            config,
            video_duration_ms: to_ms(video_duration_sec),
        })
    }

    /// Snap one rough segment.
    ///
    /// Returns a constraint violation when the minimum duration cannot
    /// be reached even at the video end; everything else degrades to a
    /// documented fallback.
    pub fn snap(&self, rough: &RoughSegment) -> AnalysisResult<SnappedSegment> {
        rough
            .validate()
            .map_err(|e| AnalysisError::InvalidSegment(e.to_string()))?;

        let rough_start = to_ms(rough.start);
        let rough_end = to_ms(rough.end);

        // Already-valid segments pass through untouched so re-snapping
        // is a no-op.
        if self.already_snapped(rough_start, rough_end) {
            return Ok(self.build(rough, rough_start, rough_end, rough_start, rough_end));
        }

        let has_words = self.index.has_words_in_range(rough_start, rough_end);

        let (mut start, mut end) = if has_words {
            (
                self.snap_start(rough_start),
                self.snap_end(rough_end).saturating_add(self.config.trailing_pad_ms),
            )
        } else {
            // Silent footage: no word data to correct against, only
            // duration and clamp rules apply.
            debug!(
                id = ?rough.id,
                start = rough.start,
                end = rough.end,
                "No words overlap rough range, skipping boundary correction"
            );
            (rough_start, rough_end)
        };

        if self.config.use_silence {
            start = self.refine_start_to_silence(start, end);
            end = self.refine_end_to_silence(start, end);
        }

        (start, end) = self.enforce_duration(start, end, has_words)?;

        // Clamp to the video range.
        start = start.min(self.video_duration_ms);
        end = end.min(self.video_duration_ms);

        let min_ms = to_ms(self.config.min_duration_sec);
        if end.saturating_sub(start) < min_ms {
            return Err(AnalysisError::DurationUnattainable {
                id: rough.id.clone(),
                duration: (end.saturating_sub(start)) as f64 / 1000.0,
                min: self.config.min_duration_sec,
            });
        }

        Ok(self.build(rough, rough_start, rough_end, start, end))
    }

    /// Step 1: start to a word boundary, sentence boundary preferred.
    fn snap_start(&self, rough_start: u64) -> u64 {
        let word_boundary = self
            .index
            .word_start_at_or_before(rough_start)
            .unwrap_or(rough_start);

        self.index
            .sentence_boundary_near(word_boundary, self.config.sentence_tolerance_ms)
            .unwrap_or(word_boundary)
    }

    /// Step 2: end to a sentence boundary within the extension window,
    /// else the next word boundary.
    fn snap_end(&self, rough_end: u64) -> u64 {
        self.index
            .next_sentence_boundary_after(rough_end, self.config.sentence_extend_ms)
            .or_else(|| self.index.word_end_at_or_after(rough_end))
            // Rough end past the last word: close on the final word.
            .or_else(|| self.index.word_end_at_or_before(rough_end))
            .unwrap_or(rough_end)
    }

    /// Step 4a: move the start into a silence just before it, keeping
    /// the word-boundary guarantee.
    fn refine_start_to_silence(&self, start: u64, end: u64) -> u64 {
        match self.nearest_silence_midpoint(start) {
            Some(mid)
                if mid <= start && mid < end && !self.index.is_word_interior(mid) =>
            {
                mid
            }
            _ => start,
        }
    }

    /// Step 4b: move the end into a silence at or just after it.
    fn refine_end_to_silence(&self, start: u64, end: u64) -> u64 {
        match self.nearest_silence_midpoint(end) {
            Some(mid)
                if mid.saturating_add(self.config.silence_window_ms) >= end
                    && mid > start
                    && !self.index.is_word_interior(mid) =>
            {
                mid
            }
            _ => end,
        }
    }

    fn nearest_silence_midpoint(&self, target: u64) -> Option<u64> {
        self.silences
            .iter()
            .map(|s| s.midpoint_ms())
            .map(|mid| (mid.abs_diff(target), mid))
            .filter(|(dist, _)| *dist <= self.config.silence_window_ms)
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, mid)| mid)
    }

    /// Step 5: min/max duration, moving the end only.
    fn enforce_duration(
        &self,
        start: u64,
        mut end: u64,
        has_words: bool,
    ) -> AnalysisResult<(u64, u64)> {
        let min_ms = to_ms(self.config.min_duration_sec);
        let max_ms = to_ms(self.config.max_duration_sec);

        if end.saturating_sub(start) < min_ms {
            let target = start.saturating_add(min_ms);
            end = if has_words {
                self.index.word_end_at_or_after(target).unwrap_or(target)
            } else {
                target
            };
            end = end.min(self.video_duration_ms);
        }

        if end.saturating_sub(start) > max_ms {
            let cap = start.saturating_add(max_ms);
            end = if has_words {
                // Prefer a word end at or before the cap; if none works,
                // a word start keeps the cut off word interiors when the
                // cap lands mid-word.
                self.index
                    .word_end_at_or_before(cap)
                    .filter(|e| e.saturating_sub(start) >= min_ms)
                    .or_else(|| {
                        self.index
                            .word_start_at_or_before(cap)
                            .filter(|s| s.saturating_sub(start) >= min_ms)
                    })
                    .unwrap_or(cap)
            } else {
                cap
            };
        }

        Ok((start, end))
    }

    /// Whether `(start, end)` already satisfies every output invariant.
    fn already_snapped(&self, start: u64, end: u64) -> bool {
        if end <= start || end > self.video_duration_ms {
            return false;
        }

        let duration = end - start;
        let min_ms = to_ms(self.config.min_duration_sec);
        let max_ms = to_ms(self.config.max_duration_sec);
        if duration < min_ms || duration > max_ms {
            return false;
        }

        if self.index.has_words_in_range(start, end) {
            let start_ok = self.index.is_word_boundary(start)
                || self.is_silence_midpoint(start)
                || start == 0;
            let unpadded = end.saturating_sub(self.config.trailing_pad_ms);
            let end_ok = self.index.is_word_boundary(end)
                || self.index.is_word_boundary(unpadded)
                || self.is_silence_midpoint(end)
                || end == self.video_duration_ms;
            start_ok && end_ok
        } else {
            // Degraded mode has no boundary requirements.
            true
        }
    }

    fn is_silence_midpoint(&self, t_ms: u64) -> bool {
        self.silences.iter().any(|s| s.midpoint_ms() == t_ms)
    }

    fn build(
        &self,
        rough: &RoughSegment,
        rough_start: u64,
        rough_end: u64,
        start: u64,
        end: u64,
    ) -> SnappedSegment {
        let snapped = SnappedSegment {
            id: rough.id.clone(),
            start: start as f64 / 1000.0,
            end: end as f64 / 1000.0,
            duration: end.saturating_sub(start) as f64 / 1000.0,
            start_delta_ms: start as i64 - rough_start as i64,
            end_delta_ms: end as i64 - rough_end as i64,
        };

        debug!(
            id = ?snapped.id,
            start = snapped.start,
            end = snapped.end,
            start_delta_ms = snapped.start_delta_ms,
            end_delta_ms = snapped.end_delta_ms,
            "Segment snapped"
        );

        snapped
    }
}

fn to_ms(sec: f64) -> u64 {
    (sec.max(0.0) * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclip_models::Word;

    const VIDEO_DURATION: f64 = 600.0;

    /// Two sentences around t=262s plus filler words out to ~310s.
    fn scenario_words() -> Vec<Word> {
        let mut words = vec![
            Word::new("setup", 260_500, 261_300),
            Word::new("done.", 261_400, 261_900),
            Word::new("Now", 261_950, 262_150),
            Word::new("watch", 262_200, 262_600),
            Word::new("this", 262_650, 263_000),
        ];
        // Filler words every 500ms from 264s to 310s, no punctuation
        let mut t = 264_000;
        while t < 310_000 {
            words.push(Word::new("word", t, t + 420));
            t += 500;
        }
        words
    }

    fn snapper<'a>(
        index: &'a TranscriptIndex,
        silences: &'a [SilenceInterval],
        config: SnapConfig,
    ) -> BoundarySnapper<'a> {
        BoundarySnapper::new(index, silences, config, VIDEO_DURATION).unwrap()
    }

    #[test]
    fn test_scenario_a_sentence_start_preferred() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        let snapped = snapper
            .snap(&RoughSegment::new(262.0, 301.0))
            .unwrap();

        // Word boundary at or before 262.0 is 261.95; the sentence
        // boundary at 261.9 is within tolerance and wins.
        assert!((snapped.start - 261.9).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_b_word_end_plus_padding() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        let snapped = snapper
            .snap(&RoughSegment::new(262.0, 301.0))
            .unwrap();

        // No sentence boundary after 301.0; nearest word end at or
        // after is 301.42, plus 300ms padding.
        assert!((snapped.end - 301.72).abs() < 1e-9);
        assert_eq!(snapped.end_delta_ms, 720);
    }

    #[test]
    fn test_scenario_c_minimum_duration_extension() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        // 3.2s rough duration starting mid-stream
        let snapped = snapper
            .snap(&RoughSegment::new(264.1, 267.3))
            .unwrap();

        assert!(snapped.duration() >= 5.0);
        // Extension lands on a word end
        let end_ms = (snapped.end * 1000.0).round() as u64;
        assert!(index.is_word_boundary(end_ms));
        // Start was never moved right
        assert!(snapped.start <= 264.1);
    }

    #[test]
    fn test_start_on_word_boundary_invariant() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        for rough in [
            RoughSegment::new(262.0, 301.0),
            RoughSegment::new(265.3, 280.0),
            RoughSegment::new(261.0, 270.0),
        ] {
            let snapped = snapper.snap(&rough).unwrap();
            let start_ms = (snapped.start * 1000.0).round() as u64;
            assert!(
                index.is_word_boundary(start_ms),
                "start {} not on a word boundary",
                snapped.start
            );
            assert!(snapped.duration() >= 5.0 && snapped.duration() <= 60.0);
            assert!(snapped.start >= 0.0 && snapped.end <= VIDEO_DURATION);
        }
    }

    #[test]
    fn test_idempotence() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let silences = vec![SilenceInterval::new(263_200, 263_800)];
        let snapper = snapper(&index, &silences, SnapConfig::default());

        let first = snapper.snap(&RoughSegment::new(262.0, 301.0)).unwrap();
        let second = snapper.snap(&first.as_rough()).unwrap();

        assert!((second.start - first.start).abs() < 1e-9);
        assert!((second.end - first.end).abs() < 1e-9);
        assert_eq!(second.start_delta_ms, 0);
        assert_eq!(second.end_delta_ms, 0);
    }

    #[test]
    fn test_maximum_duration_trim() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        let snapped = snapper
            .snap(&RoughSegment::new(240.0, 590.0))
            .unwrap();

        assert!(snapped.duration() <= 60.0);
        // Trim landed on a word end, not inside a word
        let end_ms = (snapped.end * 1000.0).round() as u64;
        assert!(!index.is_word_interior(end_ms));
    }

    #[test]
    fn test_maximum_trim_avoids_word_straddling_cap() {
        // "steady" straddles the 60s cap; no word end fits between the
        // minimum duration and the cap, so the trim backs up to the
        // word's start instead of cutting mid-word.
        let words = vec![
            Word::new("go", 0, 1_000),
            Word::new("steady", 59_500, 61_000),
        ];
        let index = TranscriptIndex::new(words).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        let snapped = snapper.snap(&RoughSegment::new(0.0, 70.0)).unwrap();
        assert!((snapped.end - 59.5).abs() < 1e-9);
        let end_ms = (snapped.end * 1000.0).round() as u64;
        assert!(!index.is_word_interior(end_ms));

        // The result is stable under re-snapping
        let again = snapper.snap(&snapped.as_rough()).unwrap();
        assert_eq!(again.start_delta_ms, 0);
        assert_eq!(again.end_delta_ms, 0);
    }

    #[test]
    fn test_degraded_mode_no_words_in_range() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        // Range far from any word: only duration/clamp rules apply
        let snapped = snapper.snap(&RoughSegment::new(400.0, 403.0)).unwrap();
        assert!((snapped.start - 400.0).abs() < 1e-9);
        assert!((snapped.duration() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_unattainable_at_video_end() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default().with_silence(false));

        let result = snapper.snap(&RoughSegment::new(598.0, 599.0));
        assert!(matches!(
            result,
            Err(AnalysisError::DurationUnattainable { .. })
        ));
    }

    #[test]
    fn test_silence_refinement_rejected_inside_word() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        // Midpoint at 262,400 is inside "watch" (262,200..262,600)
        let silences = vec![SilenceInterval::new(262_300, 262_500)];
        let snapper = snapper(&index, &silences, SnapConfig::default());

        let snapped = snapper.snap(&RoughSegment::new(262.3, 270.0)).unwrap();
        let start_ms = (snapped.start * 1000.0).round() as u64;
        assert!(!index.is_word_interior(start_ms));
    }

    #[test]
    fn test_silence_refinement_moves_start_into_gap() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        // Silence in the gap before "Now" (261,900..261,950)
        let silences = vec![SilenceInterval::new(261_900, 261_944)];
        let config = SnapConfig {
            sentence_tolerance_ms: 0, // isolate the silence rule
            ..SnapConfig::default()
        };
        let snapper = snapper(&index, &silences, config);

        let snapped = snapper.snap(&RoughSegment::new(262.0, 301.0)).unwrap();
        // Midpoint 261,922 is before the word start 261,950 and not
        // word-interior, so it is accepted.
        assert!((snapped.start - 261.922).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rough_segment_rejected() {
        let index = TranscriptIndex::new(scenario_words()).unwrap();
        let snapper = snapper(&index, &[], SnapConfig::default());

        assert!(matches!(
            snapper.snap(&RoughSegment::new(30.0, 20.0)),
            Err(AnalysisError::InvalidSegment(_))
        ));
    }
}
