//! Command-line interface for the `sclip` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sclip_models::ContentType;

#[derive(Debug, Parser)]
#[command(
    name = "sclip",
    version,
    about = "Boundary snapping and content-aware reframing for short clips"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Snap rough segment boundaries to words, sentences and silences
    Snap(SnapArgs),
    /// Classify a video's content type from sampled frames
    Detect(DetectArgs),
    /// Compute 9:16 crop plans for extracted clips
    Reframe(ReframeArgs),
}

#[derive(Debug, Args)]
pub struct SnapArgs {
    /// Transcript JSON with word-level timestamps
    #[arg(long)]
    pub transcript: PathBuf,

    /// Rough segments JSON
    #[arg(long)]
    pub segments: PathBuf,

    /// Source video, used for duration and silence detection
    #[arg(long)]
    pub input_video: PathBuf,

    /// Output path for the snapped segments JSON
    #[arg(long)]
    pub output: PathBuf,

    /// Skip silence-based boundary refinement
    #[arg(long)]
    pub no_silence: bool,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Video to classify
    pub input_video: PathBuf,

    /// Output JSON path; printed to stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Number of frames to sample; defaults to the analysis
    /// configuration's classification sample count
    #[arg(long)]
    pub frames: Option<usize>,

    /// Face detector command, invoked once per frame
    #[arg(long, default_value = "sclip-facedet")]
    pub detector: String,
}

#[derive(Debug, Args)]
pub struct ReframeArgs {
    /// Directory containing extracted clip_*.mp4 files
    #[arg(long)]
    pub clips_dir: PathBuf,

    /// Content type driving the crop strategy
    #[arg(long)]
    pub content_type: ContentType,

    /// Output path for the reframe map JSON
    #[arg(long)]
    pub output: PathBuf,

    /// Visible fraction of source width for screen content
    #[arg(long, default_value_t = 0.55)]
    pub zoom: f64,

    /// Use a static centered crop instead of following the cursor
    #[arg(long)]
    pub no_cursor_track: bool,

    /// Face detector command, invoked once per frame
    #[arg(long, default_value = "sclip-facedet")]
    pub detector: String,

    /// Maximum clips analyzed in parallel
    #[arg(long, default_value_t = 4)]
    pub jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_args_parse() {
        let cli = Cli::parse_from([
            "sclip",
            "snap",
            "--transcript",
            "/tmp/transcript.json",
            "--segments",
            "/tmp/segments.json",
            "--input-video",
            "/tmp/in.mp4",
            "--output",
            "/tmp/out.json",
            "--no-silence",
        ]);
        match cli.command {
            Command::Snap(args) => {
                assert!(args.no_silence);
                assert_eq!(args.output, PathBuf::from("/tmp/out.json"));
            }
            _ => panic!("expected snap subcommand"),
        }
    }

    #[test]
    fn test_detect_frames_unset_by_default() {
        let cli = Cli::parse_from(["sclip", "detect", "/tmp/in.mp4"]);
        match cli.command {
            Command::Detect(args) => {
                assert!(args.frames.is_none());
                assert_eq!(args.detector, "sclip-facedet");
            }
            _ => panic!("expected detect subcommand"),
        }

        let cli = Cli::parse_from(["sclip", "detect", "/tmp/in.mp4", "--frames", "20"]);
        match cli.command {
            Command::Detect(args) => assert_eq!(args.frames, Some(20)),
            _ => panic!("expected detect subcommand"),
        }
    }

    #[test]
    fn test_reframe_args_defaults() {
        let cli = Cli::parse_from([
            "sclip",
            "reframe",
            "--clips-dir",
            "/tmp/clips",
            "--content-type",
            "screen",
            "--output",
            "/tmp/reframe.json",
        ]);
        match cli.command {
            Command::Reframe(args) => {
                assert_eq!(args.content_type, ContentType::Screen);
                assert!((args.zoom - 0.55).abs() < 1e-9);
                assert_eq!(args.jobs, 4);
                assert!(!args.no_cursor_track);
            }
            _ => panic!("expected reframe subcommand"),
        }
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let result = Cli::try_parse_from([
            "sclip",
            "reframe",
            "--clips-dir",
            "/tmp/clips",
            "--content-type",
            "webinar",
            "--output",
            "/tmp/reframe.json",
        ]);
        assert!(result.is_err());
    }
}
