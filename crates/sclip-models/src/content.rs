//! Visual content categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual category of a clip, driving the reframe strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Single large face, face-tracked 9:16 crop
    #[serde(rename = "talking-head")]
    TalkingHead,
    /// Screen recording, cursor-tracked pan at moderate zoom
    #[serde(rename = "screen")]
    Screen,
    /// Multiple faces, dominant-speaker tracked crop
    #[serde(rename = "podcast")]
    Podcast,
}

impl ContentType {
    /// All known content types, for CLI help and validation messages.
    pub const ALL: [ContentType; 3] = [Self::TalkingHead, Self::Screen, Self::Podcast];

    /// String form used in JSON and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TalkingHead => "talking-head",
            Self::Screen => "screen",
            Self::Podcast => "podcast",
        }
    }

    /// Whether this content is framed around faces.
    pub fn is_face_driven(&self) -> bool {
        matches!(self, Self::TalkingHead | Self::Podcast)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "talking-head" | "talking_head" => Ok(Self::TalkingHead),
            "screen" => Ok(Self::Screen),
            "podcast" => Ok(Self::Podcast),
            other => Err(format!(
                "Unknown content type '{}'. Expected one of: talking-head, screen, podcast",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for ct in ContentType::ALL {
            assert_eq!(ct.as_str().parse::<ContentType>().unwrap(), ct);
        }
    }

    #[test]
    fn test_serde_rename() {
        let json = serde_json::to_string(&ContentType::TalkingHead).unwrap();
        assert_eq!(json, r#""talking-head""#);
        let back: ContentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ContentType::TalkingHead);
    }

    #[test]
    fn test_unknown_rejected() {
        assert!("webinar".parse::<ContentType>().is_err());
    }
}
