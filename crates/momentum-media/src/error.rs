//! Error types for media operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an invalid video error.
    pub fn invalid_video(message: impl Into<String>) -> Self {
        Self::InvalidVideo(message.into())
    }
}

/// Renderer stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    StageClips,
    Concatenate,
    MuxAudio,
}

impl RenderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStage::StageClips => "stage_clips",
            RenderStage::Concatenate => "concatenate",
            RenderStage::MuxAudio => "mux_audio",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal outcomes of a render job. The workspace is removed in every case.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("audio file not found: {0}")]
    MissingAudio(PathBuf),

    #[error("could not create render workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("no valid clips could be produced from the edit decision list")]
    NoValidClips,

    #[error("{stage} failed: {diagnostic}")]
    StageFailed {
        stage: RenderStage,
        diagnostic: String,
    },

    #[error("render cancelled")]
    Cancelled,
}

impl RenderError {
    pub fn stage_failed(stage: RenderStage, diagnostic: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            diagnostic: diagnostic.into(),
        }
    }

    /// Attribute a tool error to the stage that ran it.
    pub fn from_media(stage: RenderStage, err: MediaError) -> Self {
        match err {
            MediaError::Cancelled => Self::Cancelled,
            MediaError::FfmpegFailed {
                message, stderr, ..
            } => {
                let diagnostic = stderr
                    .as_deref()
                    .map(stderr_tail)
                    .filter(|tail| !tail.is_empty())
                    .unwrap_or(message);
                Self::stage_failed(stage, diagnostic)
            }
            other => Self::stage_failed(stage, other.to_string()),
        }
    }
}

/// Last non-empty line of a tool's stderr.
pub fn stderr_tail(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
