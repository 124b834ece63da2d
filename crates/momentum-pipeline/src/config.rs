//! Pipeline configuration.

use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PATH: &str = "output.mp4";
pub const DEFAULT_FRAMES_PER_VIDEO: usize = 10;
pub const DEFAULT_MAX_PARALLEL_ANALYSES: usize = 4;
pub const DEFAULT_VIDEO_GOAL: &str = "Create an engaging short video for social media.";
pub const DEFAULT_KEY_FEATURES: &[&str] = &["dynamic cuts", "text overlays", "upbeat music sync"];

/// Per-run pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Where the rendered video is written
    pub output_path: PathBuf,
    /// Frames sampled from each video for analysis
    pub frames_per_video: usize,
    /// Maximum video analyses holding a worker at once
    pub max_parallel_analyses: usize,
    /// Creative goal passed to the planner
    pub video_goal: String,
    /// Feature tags passed to the planner
    pub key_features: Vec<String>,
    /// Parent directory for render workspaces (system temp when unset)
    pub work_dir: Option<PathBuf>,
    /// Per-invocation ffmpeg timeout
    pub ffmpeg_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            frames_per_video: DEFAULT_FRAMES_PER_VIDEO,
            max_parallel_analyses: DEFAULT_MAX_PARALLEL_ANALYSES,
            video_goal: DEFAULT_VIDEO_GOAL.to_string(),
            key_features: DEFAULT_KEY_FEATURES.iter().map(|s| s.to_string()).collect(),
            work_dir: None,
            ffmpeg_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            output_path: non_empty("MOMENTUM_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            frames_per_video: non_empty("MOMENTUM_FRAMES_PER_VIDEO")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frames_per_video),
            max_parallel_analyses: non_empty("MOMENTUM_MAX_PARALLEL_ANALYSES")
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_parallel_analyses),
            video_goal: non_empty("MOMENTUM_VIDEO_GOAL").unwrap_or(defaults.video_goal),
            key_features: non_empty("MOMENTUM_KEY_FEATURES")
                .map(|s| parse_features(&s))
                .filter(|f| !f.is_empty())
                .unwrap_or(defaults.key_features),
            work_dir: non_empty("MOMENTUM_WORK_DIR").map(PathBuf::from),
            ffmpeg_timeout_secs: non_empty("MOMENTUM_FFMPEG_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Split a comma separated tag list, dropping blanks.
pub fn parse_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
