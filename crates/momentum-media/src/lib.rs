#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper and media collaborators for Momentum.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a cancellable async runner
//! - FFprobe stream inspection
//! - Frame extraction and beat detection behind sync traits
//! - The three-stage renderer that turns an edit decision list into a file

pub mod beats;
pub mod command;
pub mod error;
pub mod filters;
pub mod frames;
pub mod metrics;
pub mod probe;
pub mod render;

pub use beats::{AubioBeatDetector, BeatDetector};
pub use command::{
    cancel_requested, check_ffmpeg, check_ffprobe, run_blocking, FfmpegCommand, FfmpegRunner,
};
pub use error::{MediaError, MediaResult, RenderError, RenderStage};
pub use frames::{frame_indices, FfmpegFrameExtractor, FrameExtractor};
pub use probe::{probe_video, VideoInfo};
pub use render::{RenderConfig, Renderer, Workspace};
