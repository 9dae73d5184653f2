//! Subcommand orchestration.
//!
//! `snap` is sequential: the transcript index is built once and every
//! segment is corrected against it. `reframe` fans out per clip under a
//! semaphore; frame extraction is the only blocking I/O and runs inside
//! the bounded tasks. All snapping for a batch completes before any
//! reframe work because the two are separate invocations gated on clip
//! extraction in between.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use sclip_analysis::{
    classify_content, cursor_track, dominant_face_track, BoundarySnapper, FaceStats,
    ReframeConfig, ReframeEngine, SnapConfig, TranscriptIndex,
};
use sclip_media::{
    detect_silences, diff_candidates, interval_timestamps, load_gray_frame, probe_video,
    uniform_timestamps, CommandFaceDetector, FaceDetection, FaceDetector, FfmpegRunner,
    FrameSampler, MediaError, MotionConfig, SilenceProbeConfig,
};
use sclip_models::{ContentType, TrackSample};

use crate::cli::{DetectArgs, ReframeArgs, SnapArgs};
use crate::error::{ClipFailure, PipelineError, PipelineResult};
use crate::io::{self, Adjustment, ClipEntry, ContentReport, ReframeMap, SnapReport};

/// Run the snap subcommand: correct every rough segment and write the
/// snapped segments file.
///
/// Constraint violations exclude the offending segment and are listed
/// in the report; an empty transcript or unreadable video aborts before
/// any output is written.
pub async fn run_snap(args: &SnapArgs) -> PipelineResult<SnapReport> {
    let words = io::load_words(&args.transcript)?;
    let word_count = words.len();
    let index = TranscriptIndex::new(words)?;

    let mut file = io::load_segments(&args.segments)?;
    let video = probe_video(&args.input_video).await?;

    // Silence probe failures downgrade to word-boundary snapping only
    let silences = if args.no_silence {
        Vec::new()
    } else {
        match detect_silences(&args.input_video, &SilenceProbeConfig::default()).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Silence detection failed, snapping to words only");
                Vec::new()
            }
        }
    };

    let config = SnapConfig::default().with_silence(!silences.is_empty());
    let snapper = BoundarySnapper::new(&index, &silences, config, video.duration)?;

    let mut adjustments = Vec::new();
    let mut failures = Vec::new();
    let mut kept = Vec::with_capacity(file.segments.len());

    for mut record in file.segments {
        let rough = record.as_rough();
        match snapper.snap(&rough) {
            Ok(snapped) => {
                adjustments.push(Adjustment::new(rough.start, rough.end, &snapped));
                record.apply(&snapped);
                kept.push(record);
            }
            Err(e) => {
                let id = record.id.clone().unwrap_or_else(|| "?".to_string());
                warn!(segment = %id, error = %e, "Segment excluded");
                failures.push(ClipFailure::new(id, e));
            }
        }
    }
    file.segments = kept;

    io::write_json(&args.output, &file)?;

    info!(
        processed = adjustments.len(),
        excluded = failures.len(),
        silences = silences.len(),
        "Boundary snapping complete"
    );

    Ok(SnapReport {
        action: "snap_boundaries",
        segments_processed: adjustments.len(),
        silences_detected: silences.len(),
        word_count,
        adjustments,
        failures,
    })
}

/// Run the detect subcommand: classify the video's content type.
pub async fn run_detect(args: &DetectArgs) -> PipelineResult<ContentReport> {
    let video = probe_video(&args.input_video).await?;
    let sampler = FrameSampler::new(&args.input_video, FfmpegRunner::new())?;
    let detector = CommandFaceDetector::new(&args.detector);

    let timestamps = uniform_timestamps(video.duration, classify_frame_count(args.frames));
    let frames = sampler.frames_at(&timestamps).await?;
    let detections = detect_frames(&detector, &frames).await;

    let per_frame: Vec<Vec<FaceDetection>> =
        detections.into_iter().map(|(_, d)| d).collect();
    let stats = FaceStats::from_frames(&per_frame);
    let (content_type, confidence) = classify_content(&stats);

    info!(
        %content_type,
        confidence,
        frames = per_frame.len(),
        "Content detection complete"
    );

    let report = ContentReport {
        content_type,
        confidence,
        face_stats: stats,
        frames_sampled: per_frame.len(),
    };

    if let Some(output) = &args.output {
        io::write_json(output, &report)?;
    }

    Ok(report)
}

/// Run the reframe subcommand: plan a crop for every extracted clip.
///
/// Clips are analyzed in parallel under `--jobs`; per-clip failures are
/// collected, a cancellation mid-run discards everything.
pub async fn run_reframe(
    args: &ReframeArgs,
    cancel: watch::Receiver<bool>,
) -> PipelineResult<ReframeMap> {
    let clips = list_clips(&args.clips_dir)?;
    let config = ReframeConfig::default().with_screen_zoom(args.zoom);
    config.validate()?;

    let started = Instant::now();
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for clip in clips {
        let semaphore = Arc::clone(&semaphore);
        let config = config.clone();
        let detector = args.detector.clone();
        let content_type = args.content_type;
        let no_cursor_track = args.no_cursor_track;
        let cancel = cancel.clone();

        tasks.spawn(async move {
            // Closed sender means the pipeline is shutting down
            let _permit = match semaphore.acquire().await {
                Ok(p) => p,
                Err(_) => return (clip_name(&clip), Err(PipelineError::Cancelled)),
            };
            if *cancel.borrow() {
                return (clip_name(&clip), Err(PipelineError::Cancelled));
            }
            let result = analyze_clip(
                &clip,
                content_type,
                &detector,
                &config,
                no_cursor_track,
                cancel,
            )
            .await;
            (clip_name(&clip), result)
        });
    }

    let mut clips_out = BTreeMap::new();
    let mut failures = Vec::new();
    let mut cancelled = false;

    while let Some(joined) = tasks.join_next().await {
        let (name, result) = joined.map_err(|e| {
            PipelineError::InvalidInput(format!("Clip analysis task panicked: {e}"))
        })?;
        match result {
            Ok(entry) => {
                clips_out.insert(name, entry);
            }
            Err(PipelineError::Cancelled) | Err(PipelineError::Media(MediaError::Cancelled)) => {
                cancelled = true;
            }
            Err(e) => {
                warn!(clip = %name, error = %e, "Clip reframe failed");
                failures.push(ClipFailure::new(name, e));
            }
        }
    }

    if cancelled || *cancel.borrow() {
        return Err(PipelineError::Cancelled);
    }

    let map = ReframeMap {
        content_type: args.content_type,
        clip_count: clips_out.len(),
        computation_time_sec: (started.elapsed().as_secs_f64() * 100.0).round() / 100.0,
        clips: clips_out,
        failures,
    };

    io::write_json(&args.output, &map)?;

    info!(
        clips = map.clip_count,
        failures = map.failures.len(),
        elapsed_sec = map.computation_time_sec,
        "Reframe computation complete"
    );

    Ok(map)
}

/// Plan the crop for a single clip file.
async fn analyze_clip(
    clip: &Path,
    content_type: ContentType,
    detector_program: &str,
    config: &ReframeConfig,
    no_cursor_track: bool,
    cancel: watch::Receiver<bool>,
) -> PipelineResult<ClipEntry> {
    let video = probe_video(clip).await?;
    let runner = FfmpegRunner::new().with_cancel(cancel);
    let sampler = FrameSampler::new(clip, runner)?;

    let samples: Vec<TrackSample> = if content_type.is_face_driven() {
        let timestamps = uniform_timestamps(video.duration, config.face_samples);
        let frames = sampler.frames_at(&timestamps).await?;
        let detector = CommandFaceDetector::new(detector_program);
        let per_frame = detect_frames(&detector, &frames).await;
        dominant_face_track(&per_frame, config)
    } else if no_cursor_track {
        Vec::new()
    } else {
        let timestamps = interval_timestamps(video.duration, config.cursor_interval_sec);
        let frames = sampler.frames_at(&timestamps).await?;
        cursor_blobs(&frames)
    };

    debug!(
        clip = %clip.display(),
        samples = samples.len(),
        "Subject track extracted"
    );

    let engine = ReframeEngine::new(config.clone())?;
    let reframe = engine.plan(content_type, video.resolution(), &samples)?;

    Ok(ClipEntry {
        reframe,
        duration: (video.duration * 100.0).round() / 100.0,
    })
}

/// Run the detector over extracted frames; detector failures on a
/// frame degrade to an empty detection list for that frame.
async fn detect_frames(
    detector: &dyn FaceDetector,
    frames: &[(f64, PathBuf)],
) -> Vec<(f64, Vec<FaceDetection>)> {
    let mut out = Vec::with_capacity(frames.len());
    for (t, path) in frames {
        let detections = match detector.detect(path).await {
            Ok(d) => d,
            Err(e) => {
                warn!(t, error = %e, "Face detection failed on frame");
                Vec::new()
            }
        };
        out.push((*t, detections));
    }
    out
}

/// Diff consecutive frames into cursor candidates and fold them into a
/// track. Undecodable frames are skipped, breaking the pair chain at
/// that point.
fn cursor_blobs(frames: &[(f64, PathBuf)]) -> Vec<TrackSample> {
    let motion_config = MotionConfig::default();
    let mut candidates = Vec::new();
    let mut prev_gray = None;

    for (t, path) in frames {
        let gray = match load_gray_frame(path) {
            Ok(g) => g,
            Err(e) => {
                warn!(t, error = %e, "Skipping undecodable frame");
                continue;
            }
        };
        if let Some(prev) = &prev_gray {
            let blobs = diff_candidates(prev, &gray, &motion_config);
            candidates.push((*t, blobs));
        }
        prev_gray = Some(gray);
    }

    cursor_track(&candidates)
}

/// Frames sampled for classification: the `--frames` override when
/// given, otherwise the analysis configuration's default.
fn classify_frame_count(requested: Option<usize>) -> usize {
    requested.unwrap_or_else(|| ReframeConfig::default().classify_samples)
}

fn clip_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Find `clip_*.mp4` files in the clips directory, sorted by name.
fn list_clips(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::InvalidInput(format!(
            "Clips directory not found: {}",
            dir.display()
        )));
    }

    let mut clips: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension() == Some(OsStr::new("mp4"))
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("clip_"))
        })
        .collect();
    clips.sort();

    if clips.is_empty() {
        return Err(PipelineError::NoClips(dir.to_path_buf()));
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classify_frame_count_defaults_from_config() {
        assert_eq!(
            classify_frame_count(None),
            ReframeConfig::default().classify_samples
        );
        assert_eq!(classify_frame_count(Some(25)), 25);
    }

    #[test]
    fn test_list_clips_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["clip_02.mp4", "clip_01.mp4", "other.mp4", "clip_03.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let clips = list_clips(dir.path()).unwrap();
        let names: Vec<String> = clips.iter().map(|p| clip_name(p)).collect();
        assert_eq!(names, vec!["clip_01.mp4", "clip_02.mp4"]);
    }

    #[test]
    fn test_list_clips_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_clips(dir.path()),
            Err(PipelineError::NoClips(_))
        ));
    }

    #[test]
    fn test_list_clips_missing_dir() {
        assert!(matches!(
            list_clips(Path::new("/definitely/not/here")),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}
