//! Frame-differencing motion blobs for cursor tracking.
//!
//! A moving cursor shows up as a small contiguous region of changed
//! pixels between consecutive sampled frames. This module thresholds
//! the absolute frame difference, labels connected components, and
//! returns the cursor-sized candidates; choosing among candidates is
//! the tracker's job.

use image::GrayImage;

/// Configuration for motion blob extraction.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Minimum per-pixel difference to count as changed (0-255).
    pub diff_threshold: u8,

    /// Minimum blob area in pixels. Smaller blobs are sensor noise.
    pub min_area_px: u32,

    /// Maximum blob area in pixels. Larger blobs are scrolls or video,
    /// not a cursor.
    pub max_area_px: u32,

    /// Allowed width/height aspect ratio range for a blob.
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            diff_threshold: 25,
            min_area_px: 50,
            max_area_px: 5000,
            min_aspect: 0.2,
            max_aspect: 5.0,
        }
    }
}

/// A contiguous changed region between two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBlob {
    /// Normalized horizontal centroid
    pub x_norm: f64,
    /// Normalized vertical centroid
    pub y_norm: f64,
    /// Changed pixel count
    pub area_px: u32,
    /// Blob area normalized by frame area, clipped to `[0, 1]`
    pub confidence: f64,
}

/// Extract cursor-sized motion blobs from a pair of grayscale frames.
///
/// Returns an empty vector when the frames differ in size or nothing
/// cursor-sized changed (static content).
pub fn diff_candidates(prev: &GrayImage, curr: &GrayImage, config: &MotionConfig) -> Vec<MotionBlob> {
    let (w, h) = curr.dimensions();
    if prev.dimensions() != (w, h) || w == 0 || h == 0 {
        return Vec::new();
    }

    // Threshold the absolute difference into a binary mask
    let mut mask = vec![false; (w * h) as usize];
    for (i, (p, c)) in prev.as_raw().iter().zip(curr.as_raw().iter()).enumerate() {
        mask[i] = p.abs_diff(*c) >= config.diff_threshold;
    }

    let frame_area = (w as f64) * (h as f64);
    let mut visited = vec![false; mask.len()];
    let mut blobs = Vec::new();
    let mut stack = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        // Flood fill one component, 4-connected
        let mut area: u32 = 0;
        let mut sum_x: u64 = 0;
        let mut sum_y: u64 = 0;
        let (mut min_x, mut max_x) = (u32::MAX, 0u32);
        let (mut min_y, mut max_y) = (u32::MAX, 0u32);

        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let x = (idx as u32) % w;
            let y = (idx as u32) / w;

            area += 1;
            sum_x += x as u64;
            sum_y += y as u64;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            let mut visit = |nx: u32, ny: u32| {
                let nidx = (ny * w + nx) as usize;
                if mask[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            };

            if x > 0 {
                visit(x - 1, y);
            }
            if x + 1 < w {
                visit(x + 1, y);
            }
            if y > 0 {
                visit(x, y - 1);
            }
            if y + 1 < h {
                visit(x, y + 1);
            }
        }

        if area < config.min_area_px || area > config.max_area_px {
            continue;
        }

        let bbox_w = (max_x - min_x + 1) as f64;
        let bbox_h = (max_y - min_y + 1) as f64;
        let aspect = bbox_w / bbox_h.max(1.0);
        if aspect < config.min_aspect || aspect > config.max_aspect {
            continue;
        }

        blobs.push(MotionBlob {
            x_norm: (sum_x as f64 / area as f64) / w as f64,
            y_norm: (sum_y as f64 / area as f64) / h as f64,
            area_px: area,
            confidence: (area as f64 / frame_area).clamp(0.0, 1.0),
        });
    }

    blobs
}
