//! Queryable word/sentence timeline.

use sclip_models::{SentenceBoundary, Word};

use crate::error::{AnalysisError, AnalysisResult};

/// Ordered, immutable index over the transcript's word timing.
///
/// Built once per source video; all queries take `&self`, so the index
/// can be shared across per-clip tasks without locking.
#[derive(Debug, Clone)]
pub struct TranscriptIndex {
    words: Vec<Word>,
    sentence_boundaries: Vec<SentenceBoundary>,
}

impl TranscriptIndex {
    /// Build the index from an ordered word list.
    ///
    /// Words must be time-ordered and non-overlapping with
    /// `start_ms < end_ms`; the transcript stage guarantees this, but
    /// it is cheap to verify once here.
    pub fn new(mut words: Vec<Word>) -> AnalysisResult<Self> {
        if words.is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }

        words.sort_by_key(|w| w.start_ms);

        for (i, pair) in words.windows(2).enumerate() {
            if pair[0].end_ms > pair[1].start_ms || pair[0].start_ms >= pair[0].end_ms {
                return Err(AnalysisError::UnorderedWords(i));
            }
        }
        if let Some(last) = words.last() {
            if last.start_ms >= last.end_ms {
                return Err(AnalysisError::UnorderedWords(words.len() - 1));
            }
        }

        let sentence_boundaries = words
            .iter()
            .filter_map(|w| {
                w.terminal_punctuation().map(|kind| SentenceBoundary {
                    at_ms: w.end_ms,
                    kind,
                })
            })
            .collect();

        Ok(Self {
            words,
            sentence_boundaries,
        })
    }

    /// All words, time-ordered.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words in the transcript.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The word whose span contains `t_ms` (start inclusive, end
    /// exclusive), if any.
    pub fn word_containing(&self, t_ms: u64) -> Option<&Word> {
        let idx = self.words.partition_point(|w| w.start_ms <= t_ms);
        if idx == 0 {
            return None;
        }
        let word = &self.words[idx - 1];
        (t_ms < word.end_ms).then_some(word)
    }

    /// Whether `t_ms` falls strictly inside some word.
    pub fn is_word_interior(&self, t_ms: u64) -> bool {
        self.word_containing(t_ms)
            .is_some_and(|w| w.contains_interior(t_ms))
    }

    /// Whether `t_ms` is exactly a word start or end.
    pub fn is_word_boundary(&self, t_ms: u64) -> bool {
        let idx = self.words.partition_point(|w| w.start_ms <= t_ms);
        if idx < self.words.len() && self.words[idx].start_ms == t_ms {
            return true;
        }
        idx.checked_sub(1)
            .map(|i| {
                let w = &self.words[i];
                w.start_ms == t_ms || w.end_ms == t_ms
            })
            .unwrap_or(false)
    }

    /// Latest word start at or before `t_ms`.
    pub fn word_start_at_or_before(&self, t_ms: u64) -> Option<u64> {
        let idx = self.words.partition_point(|w| w.start_ms <= t_ms);
        idx.checked_sub(1).map(|i| self.words[i].start_ms)
    }

    /// Earliest word end at or after `t_ms`.
    pub fn word_end_at_or_after(&self, t_ms: u64) -> Option<u64> {
        // Word ends are monotonic because words do not overlap.
        let idx = self.words.partition_point(|w| w.end_ms < t_ms);
        self.words.get(idx).map(|w| w.end_ms)
    }

    /// Latest word end at or before `t_ms`.
    pub fn word_end_at_or_before(&self, t_ms: u64) -> Option<u64> {
        let idx = self.words.partition_point(|w| w.end_ms <= t_ms);
        idx.checked_sub(1).map(|i| self.words[i].end_ms)
    }

    /// Earliest sentence boundary in `[t_ms, t_ms + within_ms]`.
    pub fn next_sentence_boundary_after(&self, t_ms: u64, within_ms: u64) -> Option<u64> {
        let idx = self
            .sentence_boundaries
            .partition_point(|b| b.at_ms < t_ms);
        self.sentence_boundaries
            .get(idx)
            .filter(|b| b.at_ms <= t_ms.saturating_add(within_ms))
            .map(|b| b.at_ms)
    }

    /// Closest sentence boundary within `tolerance_ms` of `t_ms`,
    /// in either direction.
    pub fn sentence_boundary_near(&self, t_ms: u64, tolerance_ms: u64) -> Option<u64> {
        let idx = self
            .sentence_boundaries
            .partition_point(|b| b.at_ms < t_ms);

        let after = self.sentence_boundaries.get(idx).map(|b| b.at_ms);
        let before = idx
            .checked_sub(1)
            .map(|i| self.sentence_boundaries[i].at_ms);

        [before, after]
            .into_iter()
            .flatten()
            .map(|at| (at.abs_diff(t_ms), at))
            .filter(|(dist, _)| *dist <= tolerance_ms)
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, at)| at)
    }

    /// Whether any word overlaps the half-open range `[start_ms, end_ms)`.
    pub fn has_words_in_range(&self, start_ms: u64, end_ms: u64) -> bool {
        self.words
            .iter()
            .any(|w| w.start_ms < end_ms && w.end_ms > start_ms)
    }
}
