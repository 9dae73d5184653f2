//! Crop geometry and reframe output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A static framing rectangle in source pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl Crop {
    /// Create a crop rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the rectangle fits inside a `width x height` source frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.w > 0
            && self.h > 0
            && self.x.saturating_add(self.w) <= width
            && self.y.saturating_add(self.h) <= height
    }
}

/// One point of an animated horizontal pan.
///
/// The crop height and width are constant across a clip; only the
/// horizontal offset animates, interpolated linearly between keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropKeyframe {
    /// Clip-local time in seconds
    pub t: f64,
    /// Left edge of the crop at time `t`, pixels
    pub x: u32,
}

/// How the crop for a clip was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReframeStrategy {
    /// Static crop centered on the tracked face position
    #[serde(rename = "face-track")]
    FaceTrack,
    /// Animated pan following the cursor
    #[serde(rename = "cursor-track")]
    CursorTrack,
    /// Static framed crop with no subject tracking
    #[serde(rename = "framed")]
    Framed,
}

/// A pixel resolution, serialized as `"WxH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("Invalid resolution '{}', expected WxH", s))?;
        let width = w
            .parse()
            .map_err(|_| format!("Invalid resolution width '{}'", w))?;
        let height = h
            .parse()
            .map_err(|_| format!("Invalid resolution height '{}'", h))?;
        Ok(Self { width, height })
    }
}

impl Serialize for Resolution {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Reframe output for one clip.
///
/// When `crop_keyframes` has fewer than two points the static `crop`
/// is authoritative and the renderer should ignore the keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReframeResult {
    /// Strategy that produced this result
    pub strategy: ReframeStrategy,
    /// Source clip resolution, lets the consumer derive scale factors
    pub source_resolution: Resolution,
    /// Static (or fallback) crop rectangle
    pub crop: Crop,
    /// Animated pan keyframes, strictly increasing in `t`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crop_keyframes: Vec<CropKeyframe>,
    /// Fixed output resolution for 9:16 delivery
    pub output_resolution: Resolution,
}

impl ReframeResult {
    /// Whether the renderer should animate the crop.
    pub fn is_animated(&self) -> bool {
        self.crop_keyframes.len() >= 2
    }

    /// Crop x at clip-local time `t`, linearly interpolated.
    ///
    /// Falls back to the static crop when not animated. Times outside
    /// the keyframe range are held at the nearest keyframe.
    pub fn crop_x_at(&self, t: f64) -> u32 {
        if !self.is_animated() {
            return self.crop.x;
        }
        let kfs = &self.crop_keyframes;
        if t <= kfs[0].t {
            return kfs[0].x;
        }
        if let Some(last) = kfs.last() {
            if t >= last.t {
                return last.x;
            }
        }
        for pair in kfs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.t && t <= b.t {
                let span = b.t - a.t;
                if span <= f64::EPSILON {
                    return a.x;
                }
                let frac = (t - a.t) / span;
                let x = a.x as f64 + (b.x as f64 - a.x as f64) * frac;
                return x.round() as u32;
            }
        }
        self.crop.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animated_result() -> ReframeResult {
        ReframeResult {
            strategy: ReframeStrategy::CursorTrack,
            source_resolution: Resolution::new(1920, 1080),
            crop: Crop::new(400, 0, 1056, 1080),
            crop_keyframes: vec![
                CropKeyframe { t: 0.0, x: 100 },
                CropKeyframe { t: 2.0, x: 300 },
            ],
            output_resolution: Resolution::new(1080, 1920),
        }
    }

    #[test]
    fn test_crop_fits_within() {
        assert!(Crop::new(0, 0, 1080, 1920).fits_within(1920, 1920));
        assert!(!Crop::new(1000, 0, 1080, 1920).fits_within(1920, 1920));
        assert!(!Crop::new(0, 0, 0, 100).fits_within(1920, 1080));
    }

    #[test]
    fn test_resolution_serde() {
        let r: Resolution = "3840x2160".parse().unwrap();
        assert_eq!(r.width, 3840);
        assert_eq!(serde_json::to_string(&r).unwrap(), r#""3840x2160""#);
        assert!("1080".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_interpolation() {
        let result = animated_result();
        assert_eq!(result.crop_x_at(0.0), 100);
        assert_eq!(result.crop_x_at(1.0), 200);
        assert_eq!(result.crop_x_at(2.0), 300);
        // Held outside the range
        assert_eq!(result.crop_x_at(-1.0), 100);
        assert_eq!(result.crop_x_at(5.0), 300);
    }

    #[test]
    fn test_static_when_single_keyframe() {
        let mut result = animated_result();
        result.crop_keyframes.truncate(1);
        assert!(!result.is_animated());
        assert_eq!(result.crop_x_at(1.0), result.crop.x);
    }
}
