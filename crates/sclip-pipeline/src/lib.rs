//! Batch orchestration for the `sclip` binary.
//!
//! Thin layer over `sclip-analysis` and `sclip-media`: CLI parsing,
//! JSON file contracts, bounded-concurrency clip scheduling, and
//! per-clip failure collection.

pub mod cli;
pub mod error;
pub mod io;
pub mod runner;

pub use cli::{Cli, Command};
pub use error::{ClipFailure, PipelineError, PipelineResult};
