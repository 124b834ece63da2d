//! Pipeline error types.

use momentum_media::{RenderError, RenderStage};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Problems with the dropped files, raised before any analysis starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    #[error("no audio file provided (expected .mp3 or .wav)")]
    NoAudioFound,

    #[error("no video files provided (expected .mp4 or .mov)")]
    NoVideoFound,
}

/// Why one video was left out of the analysis bundle. Never fatal.
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("video not found: {0}")]
    MissingFile(PathBuf),

    #[error("no frames could be extracted from {0}")]
    NoFrames(PathBuf),

    #[error("content analysis failed for {video}: {message}")]
    Analyzer { video: PathBuf, message: String },

    #[error("analysis worker for {video} did not complete: {message}")]
    Worker { video: PathBuf, message: String },
}

impl AnalysisFailure {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AnalysisFailure::MissingFile(_) => "missing_file",
            AnalysisFailure::NoFrames(_) => "no_frames",
            AnalysisFailure::Analyzer { .. } => "analyzer",
            AnalysisFailure::Worker { .. } => "worker",
        }
    }
}

/// Edit plan acquisition failures.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("no analyzed videos to plan with")]
    EmptyInput,

    #[error("model returned an invalid edit plan: {0}")]
    InvalidResponse(String),

    #[error("model request failed: {0}")]
    Transport(String),
}

/// Terminal failure of a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Render(RenderError),

    #[error("run cancelled")]
    Cancelled,
}

impl From<RenderError> for PipelineError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Render(other),
        }
    }
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingFile,
    NoAudioFound,
    NoVideoFound,
    EmptyAnalysis,
    InvalidPlan,
    PlanTransport,
    MissingAudio,
    Workspace,
    NoValidClips,
    RenderStageFailed,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingFile => "missing_file",
            ErrorKind::NoAudioFound => "no_audio_found",
            ErrorKind::NoVideoFound => "no_video_found",
            ErrorKind::EmptyAnalysis => "empty_analysis",
            ErrorKind::InvalidPlan => "invalid_plan",
            ErrorKind::PlanTransport => "plan_transport",
            ErrorKind::MissingAudio => "missing_audio",
            ErrorKind::Workspace => "workspace",
            ErrorKind::NoValidClips => "no_valid_clips",
            ErrorKind::RenderStageFailed => "render_stage_failed",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(InputError::MissingFile(_)) => ErrorKind::MissingFile,
            PipelineError::Input(InputError::NoAudioFound) => ErrorKind::NoAudioFound,
            PipelineError::Input(InputError::NoVideoFound) => ErrorKind::NoVideoFound,
            PipelineError::Planning(PlanningError::EmptyInput) => ErrorKind::EmptyAnalysis,
            PipelineError::Planning(PlanningError::InvalidResponse(_)) => ErrorKind::InvalidPlan,
            PipelineError::Planning(PlanningError::Transport(_)) => ErrorKind::PlanTransport,
            PipelineError::Render(RenderError::MissingAudio(_)) => ErrorKind::MissingAudio,
            PipelineError::Render(RenderError::Workspace(_)) => ErrorKind::Workspace,
            PipelineError::Render(RenderError::NoValidClips) => ErrorKind::NoValidClips,
            PipelineError::Render(RenderError::StageFailed { .. }) => ErrorKind::RenderStageFailed,
            PipelineError::Render(RenderError::Cancelled) | PipelineError::Cancelled => {
                ErrorKind::Cancelled
            }
        }
    }

    /// One line suitable for showing to the person who dropped the files.
    ///
    /// Tool output and model responses stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Input(e) => format!("Input Error: {}", e),
            PipelineError::Planning(PlanningError::EmptyInput) => {
                "Planning Error: none of the videos could be analyzed".to_string()
            }
            PipelineError::Planning(PlanningError::InvalidResponse(_)) => {
                "Planning Error: the AI model returned an edit plan that could not be used".to_string()
            }
            PipelineError::Planning(PlanningError::Transport(_)) => {
                "Planning Error: the AI model could not be reached".to_string()
            }
            PipelineError::Render(RenderError::StageFailed { stage, .. }) => {
                format!("Render Error: video processing failed while {}", stage_activity(*stage))
            }
            PipelineError::Render(RenderError::Workspace(_)) => {
                "Render Error: could not create a temporary working directory".to_string()
            }
            PipelineError::Render(e) => format!("Render Error: {}", e),
            PipelineError::Cancelled => "Cancelled: the run was cancelled".to_string(),
        }
    }
}

fn stage_activity(stage: RenderStage) -> &'static str {
    match stage {
        RenderStage::StageClips => "cutting clips",
        RenderStage::Concatenate => "joining clips",
        RenderStage::MuxAudio => "adding the audio track",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            PipelineError::from(InputError::NoAudioFound).kind(),
            ErrorKind::NoAudioFound
        );
        assert_eq!(
            PipelineError::from(PlanningError::EmptyInput).kind(),
            ErrorKind::EmptyAnalysis
        );
        assert_eq!(
            PipelineError::from(RenderError::NoValidClips).kind(),
            ErrorKind::NoValidClips
        );
    }

    #[test]
    fn test_render_cancel_becomes_pipeline_cancel() {
        assert!(matches!(
            PipelineError::from(RenderError::Cancelled),
            PipelineError::Cancelled
        ));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = PipelineError::from(RenderError::stage_failed(
            RenderStage::Concatenate,
            "[concat @ 0x55] Impossible to open '/tmp/momentum_render_x/clip_000.mp4'",
        ));
        let message = err.user_message();
        assert_eq!(message, "Render Error: video processing failed while joining clips");
        assert!(!message.contains('\n'));

        let err = PipelineError::from(PlanningError::Transport("503 body".into()));
        assert!(!err.user_message().contains("503"));

        let err = PipelineError::from(InputError::MissingFile(PathBuf::from("/m/v1.mp4")));
        assert_eq!(err.user_message(), "Input Error: file not found: /m/v1.mp4");
    }
}
