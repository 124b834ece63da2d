//! Validation errors for model types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Reasons a decoded model value is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("edit decision list contains no shots")]
    EmptyPlan,

    #[error("shot {index}: start_time must be a finite value >= 0 (got {value})")]
    InvalidStart { index: usize, value: f64 },

    #[error("shot {index}: end_time ({end}) must be greater than start_time ({start})")]
    InvalidRange { index: usize, start: f64, end: f64 },

    #[error("shot {index}: source_video is empty")]
    EmptySource { index: usize },

    #[error("shot {index}: overlay font_size must be positive")]
    InvalidFontSize { index: usize },

    #[error("key_moment_timestamp must be a finite value > 0 (got {0})")]
    InvalidKeyMoment(f64),

    #[error("scene description is empty")]
    EmptyDescription,
}
