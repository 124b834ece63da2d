//! Audio and scene analysis results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ModelError, ModelResult};

/// Beat grid of the audio track.
///
/// An empty beat list is a valid result: beat detection failures degrade to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioAnalysis {
    /// Beat positions in seconds, ascending.
    #[serde(default)]
    pub beat_timestamps: Vec<f64>,
}

impl AudioAnalysis {
    /// Build from raw detector output, dropping negative or non-finite values
    /// and sorting the remainder.
    pub fn from_beats(beats: impl IntoIterator<Item = f64>) -> Self {
        let mut beat_timestamps: Vec<f64> = beats
            .into_iter()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .collect();
        beat_timestamps.sort_by(f64::total_cmp);
        Self { beat_timestamps }
    }

    pub fn is_empty(&self) -> bool {
        self.beat_timestamps.is_empty()
    }
}

/// What the model saw in one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneAnalysis {
    /// Short description of the scene content.
    pub description: String,

    /// Most visually interesting moment, in seconds from the start.
    pub key_moment_timestamp: f64,
}

impl SceneAnalysis {
    pub fn validate(&self) -> ModelResult<()> {
        if self.description.trim().is_empty() {
            return Err(ModelError::EmptyDescription);
        }
        if !self.key_moment_timestamp.is_finite() || self.key_moment_timestamp <= 0.0 {
            return Err(ModelError::InvalidKeyMoment(self.key_moment_timestamp));
        }
        Ok(())
    }
}

/// Everything the planner needs: the beat grid plus each analyzed video.
///
/// Videos whose analysis failed are absent from `videos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub audio: AudioAnalysis,
    pub videos: BTreeMap<PathBuf, SceneAnalysis>,
}

impl AnalysisBundle {
    pub fn new(audio: AudioAnalysis, videos: BTreeMap<PathBuf, SceneAnalysis>) -> Self {
        Self { audio, videos }
    }

    pub fn has_videos(&self) -> bool {
        !self.videos.is_empty()
    }
}
