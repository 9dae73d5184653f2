//! JSON file contracts with the surrounding pipeline stages.
//!
//! The transcript and rough-segment files come from the transcription
//! and selection stages; the snapped-segment and reframe-map files are
//! consumed by rendering. Unknown fields on segment records are
//! preserved verbatim so this stage can sit in the middle of the
//! pipeline without stripping upstream metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use sclip_analysis::FaceStats;
use sclip_models::{ContentType, ReframeResult, RoughSegment, SnappedSegment, Word};

use crate::error::{ClipFailure, PipelineError, PipelineResult};

/// Seconds to whole milliseconds, clamping negatives to zero.
pub fn to_ms(sec: f64) -> u64 {
    (sec.max(0.0) * 1000.0).round() as u64
}

#[derive(Debug, Deserialize)]
struct TranscriptFile {
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
struct TranscriptSegment {
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(alias = "text")]
    word: String,
    start: f64,
    end: f64,
}

/// Load word-level timestamps from a transcript JSON file.
///
/// Accepts the segmented shape (`segments[].words[]`) and falls back
/// to a flat top-level `words[]` array. Times are seconds in the file
/// and milliseconds in the returned list.
pub fn load_words(path: impl AsRef<Path>) -> PipelineResult<Vec<Word>> {
    let data = fs::read_to_string(path.as_ref())?;
    let file: TranscriptFile = serde_json::from_str(&data)?;

    let raw: Vec<RawWord> = if file.segments.iter().any(|s| !s.words.is_empty()) {
        file.segments.into_iter().flat_map(|s| s.words).collect()
    } else {
        file.words
    };

    let mut words = Vec::with_capacity(raw.len());
    for w in raw {
        let text = w.word.trim();
        if text.is_empty() || w.end <= w.start {
            warn!(word = %w.word, start = w.start, end = w.end, "Skipping malformed word");
            continue;
        }
        words.push(Word::new(text, to_ms(w.start), to_ms(w.end)));
    }

    Ok(words)
}

/// One record of the rough-segments file.
///
/// Fields this stage does not interpret (titles, scores, notes from
/// the selection UI) ride along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SegmentRecord {
    pub fn as_rough(&self) -> RoughSegment {
        RoughSegment {
            id: self.id.clone(),
            start: self.start,
            end: self.end,
        }
    }

    /// Apply a snapped result back onto this record.
    pub fn apply(&mut self, snapped: &SnappedSegment) {
        self.start = snapped.start;
        self.end = snapped.end;
        self.duration = Some(round3(snapped.duration));
    }
}

/// The rough/snapped segments file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsFile {
    pub segments: Vec<SegmentRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Load the rough segments JSON.
pub fn load_segments(path: impl AsRef<Path>) -> PipelineResult<SegmentsFile> {
    let data = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&data)?)
}

/// One segment's boundary adjustment, for the run report.
#[derive(Debug, Clone, Serialize)]
pub struct Adjustment {
    pub id: String,
    pub old: String,
    pub new: String,
    pub delta_start: String,
    pub delta_end: String,
}

impl Adjustment {
    pub fn new(old_start: f64, old_end: f64, snapped: &SnappedSegment) -> Self {
        Self {
            id: snapped.id.clone().unwrap_or_else(|| "?".to_string()),
            old: format!("{:.1}-{:.1}", old_start, old_end),
            new: format!("{:.3}-{:.3}", snapped.start, snapped.end),
            delta_start: format!("{:+}ms", snapped.start_delta_ms),
            delta_end: format!("{:+}ms", snapped.end_delta_ms),
        }
    }
}

/// Run report for the snap subcommand, printed as JSON.
#[derive(Debug, Serialize)]
pub struct SnapReport {
    pub action: &'static str,
    pub segments_processed: usize,
    pub silences_detected: usize,
    pub word_count: usize,
    pub adjustments: Vec<Adjustment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ClipFailure>,
}

/// Content classification report, written or printed as JSON.
#[derive(Debug, Serialize)]
pub struct ContentReport {
    pub content_type: ContentType,
    pub confidence: f64,
    pub face_stats: FaceStats,
    pub frames_sampled: usize,
}

/// Reframe map entry for one clip.
#[derive(Debug, Clone, Serialize)]
pub struct ClipEntry {
    #[serde(flatten)]
    pub reframe: ReframeResult,
    /// Clip duration in seconds
    pub duration: f64,
}

/// The reframe map file, keyed by clip file name.
#[derive(Debug, Serialize)]
pub struct ReframeMap {
    pub content_type: ContentType,
    pub clip_count: usize,
    pub computation_time_sec: f64,
    pub clips: BTreeMap<String, ClipEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ClipFailure>,
}

/// Write a value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> PipelineResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(PipelineError::Io)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_words_segmented_shape() {
        let f = write_tmp(
            r#"{"segments": [
                {"words": [{"word": " Hello", "start": 1.0, "end": 1.4}]},
                {"words": [{"word": "world.", "start": 1.45, "end": 1.9}]}
            ]}"#,
        );
        let words = load_words(f.path()).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].start_ms, 1000);
        assert_eq!(words[1].end_ms, 1900);
    }

    #[test]
    fn test_load_words_flat_fallback() {
        let f = write_tmp(r#"{"words": [{"text": "hi", "start": 0.5, "end": 0.8}]}"#);
        let words = load_words(f.path()).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "hi");
        assert_eq!(words[0].start_ms, 500);
    }

    #[test]
    fn test_load_words_skips_malformed() {
        let f = write_tmp(
            r#"{"words": [
                {"word": "ok", "start": 1.0, "end": 1.5},
                {"word": "  ", "start": 2.0, "end": 2.5},
                {"word": "bad", "start": 3.0, "end": 3.0}
            ]}"#,
        );
        let words = load_words(f.path()).unwrap();
        assert_eq!(words.len(), 1);
    }

    #[test]
    fn test_segments_extra_fields_preserved() {
        let f = write_tmp(
            r#"{"video": "in.mp4", "segments": [
                {"id": "seg-1", "start": 262.0, "end": 301.0, "title": "The reveal"}
            ]}"#,
        );
        let file = load_segments(f.path()).unwrap();
        assert_eq!(file.segments.len(), 1);
        assert_eq!(file.segments[0].extra["title"], "The reveal");
        assert_eq!(file.extra["video"], "in.mp4");

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["segments"][0]["title"], "The reveal");
        assert_eq!(json["video"], "in.mp4");
    }

    #[test]
    fn test_adjustment_formatting() {
        let snapped = SnappedSegment {
            id: Some("seg-1".to_string()),
            start: 261.9,
            end: 301.72,
            duration: 39.82,
            start_delta_ms: -100,
            end_delta_ms: 720,
        };
        let adj = Adjustment::new(262.0, 301.0, &snapped);
        assert_eq!(adj.old, "262.0-301.0");
        assert_eq!(adj.new, "261.900-301.720");
        assert_eq!(adj.delta_start, "-100ms");
        assert_eq!(adj.delta_end, "+720ms");
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&path, &serde_json::json!({"ok": true})).unwrap();
        let back: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}
