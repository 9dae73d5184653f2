//! Subject trajectory extraction from per-frame detections.
//!
//! Two sources feed the reframe engine with the same output shape:
//! face detections for talking-head and podcast content, motion blobs
//! for screen recordings. Both produce a time-ordered sample series of
//! the single subject the crop should follow.

use tracing::debug;

use sclip_media::{FaceDetection, MotionBlob};
use sclip_models::TrackSample;

use crate::config::{DominantTieBreak, ReframeConfig};

/// Track the dominant face across sampled frames.
///
/// Per-frame detections are grouped into persistent tracks by
/// horizontal proximity; the dominant track is chosen by cumulative
/// screen time or average area per the config. Frames where the
/// dominant face is absent contribute no sample.
pub fn dominant_face_track(
    frames: &[(f64, Vec<FaceDetection>)],
    config: &ReframeConfig,
) -> Vec<TrackSample> {
    let mut tracks: Vec<FaceTrack> = Vec::new();

    for &(t_sec, ref detections) in frames {
        for det in detections {
            let nearest = tracks
                .iter_mut()
                .filter(|track| (track.last_cx - det.cx()).abs() <= config.face_match_distance)
                .min_by(|a, b| {
                    let da = (a.last_cx - det.cx()).abs();
                    let db = (b.last_cx - det.cx()).abs();
                    da.total_cmp(&db)
                });

            match nearest {
                Some(track) => track.push(t_sec, det),
                None => tracks.push(FaceTrack::start(t_sec, det)),
            }
        }
    }

    let Some(dominant) = pick_dominant(tracks, config.dominant_tie_break) else {
        return Vec::new();
    };

    debug!(
        samples = dominant.samples.len(),
        avg_area = dominant.avg_area(),
        "Dominant face track selected"
    );

    dedup_timestamps(dominant.samples)
}

/// Follow the cursor through motion blob candidates.
///
/// Each frame may offer several cursor-sized blobs; the one closest to
/// the cursor's last known position wins. Frames with no candidates
/// (cursor at rest) produce no sample, and the position carries over
/// only as the reference for the next frame's choice.
pub fn cursor_track(frames: &[(f64, Vec<MotionBlob>)]) -> Vec<TrackSample> {
    let mut last_x = 0.5;
    let mut samples = Vec::new();

    for &(t_sec, ref blobs) in frames {
        let Some(best) = blobs
            .iter()
            .min_by(|a, b| (a.x_norm - last_x).abs().total_cmp(&(b.x_norm - last_x).abs()))
        else {
            continue;
        };

        last_x = best.x_norm;
        samples.push(TrackSample::new(
            t_sec,
            best.x_norm,
            best.y_norm,
            best.confidence,
        ));
    }

    debug!(
        frames = frames.len(),
        samples = samples.len(),
        "Cursor track built"
    );

    dedup_timestamps(samples)
}

struct FaceTrack {
    last_cx: f64,
    area_sum: f64,
    samples: Vec<TrackSample>,
}

impl FaceTrack {
    fn start(t_sec: f64, det: &FaceDetection) -> Self {
        let mut track = Self {
            last_cx: det.cx(),
            area_sum: 0.0,
            samples: Vec::new(),
        };
        track.push(t_sec, det);
        track
    }

    fn push(&mut self, t_sec: f64, det: &FaceDetection) {
        self.last_cx = det.cx();
        self.area_sum += det.area_fraction();
        self.samples
            .push(TrackSample::new(t_sec, det.cx(), det.cy(), det.score));
    }

    fn avg_area(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.area_sum / self.samples.len() as f64
        }
    }
}

fn pick_dominant(tracks: Vec<FaceTrack>, tie_break: DominantTieBreak) -> Option<FaceTrack> {
    tracks.into_iter().max_by(|a, b| match tie_break {
        DominantTieBreak::ScreenTime => a
            .samples
            .len()
            .cmp(&b.samples.len())
            .then(a.avg_area().total_cmp(&b.avg_area())),
        DominantTieBreak::Area => a
            .avg_area()
            .total_cmp(&b.avg_area())
            .then(a.samples.len().cmp(&b.samples.len())),
    })
}

/// Collapse samples sharing a timestamp, keeping the last. The reframe
/// engine requires strictly increasing time.
fn dedup_timestamps(mut samples: Vec<TrackSample>) -> Vec<TrackSample> {
    samples.sort_by(|a, b| a.t_sec.total_cmp(&b.t_sec));
    samples.dedup_by(|next, prev| {
        if next.t_sec == prev.t_sec {
            *prev = *next;
            true
        } else {
            false
        }
    });
    samples
}
