//! Detected silence intervals in source audio.

use serde::{Deserialize, Serialize};

/// A detected quiet span in the source audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    /// Start of the silence in milliseconds
    pub start_ms: u64,
    /// End of the silence in milliseconds
    pub end_ms: u64,
    /// Mean level inside the interval in dBFS, when the detector reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_db: Option<f64>,
}

impl SilenceInterval {
    /// Create a new interval.
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            mean_db: None,
        }
    }

    /// Midpoint of the interval in milliseconds.
    pub fn midpoint_ms(&self) -> u64 {
        self.start_ms + (self.end_ms.saturating_sub(self.start_ms)) / 2
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Sort intervals and merge any that touch or sit within `epsilon_ms`
/// of each other.
///
/// Near-duplicate silences make boundary refinement oscillate between
/// candidates, so adjacent intervals are collapsed before use.
pub fn merge_intervals(mut intervals: Vec<SilenceInterval>, epsilon_ms: u64) -> Vec<SilenceInterval> {
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by_key(|i| i.start_ms);

    let mut merged: Vec<SilenceInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start_ms <= last.end_ms.saturating_add(epsilon_ms) => {
                last.end_ms = last.end_ms.max(interval.end_ms);
                // Keep the quieter of the two reported levels
                last.mean_db = match (last.mean_db, interval.mean_db) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            _ => merged.push(interval),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        assert_eq!(SilenceInterval::new(1000, 2000).midpoint_ms(), 1500);
        assert_eq!(SilenceInterval::new(0, 0).midpoint_ms(), 0);
    }

    #[test]
    fn test_merge_within_epsilon() {
        let intervals = vec![
            SilenceInterval::new(1000, 1500),
            SilenceInterval::new(1530, 2000), // 30ms gap, under epsilon
            SilenceInterval::new(5000, 6000),
        ];
        let merged = merge_intervals(intervals, 50);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start_ms, 1000);
        assert_eq!(merged[0].end_ms, 2000);
        assert_eq!(merged[1].start_ms, 5000);
    }

    #[test]
    fn test_merge_sorts_input() {
        let intervals = vec![
            SilenceInterval::new(5000, 6000),
            SilenceInterval::new(1000, 1500),
        ];
        let merged = merge_intervals(intervals, 50);
        assert_eq!(merged[0].start_ms, 1000);
        assert_eq!(merged[1].start_ms, 5000);
    }

    #[test]
    fn test_merge_keeps_distinct() {
        let intervals = vec![
            SilenceInterval::new(1000, 1500),
            SilenceInterval::new(1600, 2000), // 100ms gap, over epsilon
        ];
        let merged = merge_intervals(intervals, 50);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_overlapping() {
        let mut a = SilenceInterval::new(1000, 2000);
        a.mean_db = Some(-40.0);
        let mut b = SilenceInterval::new(1500, 1800);
        b.mean_db = Some(-55.0);

        let merged = merge_intervals(vec![a, b], 0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end_ms, 2000);
        assert_eq!(merged[0].mean_db, Some(-55.0));
    }
}
