//! Edit decision list: the plan the model emits and the renderer executes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};

/// Transition into the following shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    #[default]
    HardCut,
    Fade,
    #[serde(other)]
    Other,
}

/// Where the model would like the overlay placed.
///
/// The renderer currently burns every overlay in at the bottom centre; the tag
/// is carried through for future layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
    #[serde(other)]
    Other,
}

/// Text burned into a shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextOverlay {
    pub text: String,

    /// Font size in pixels, must be positive.
    pub font_size: u32,

    #[serde(default)]
    pub position: OverlayPosition,

    /// Free-form style tag, e.g. "minimalist" or "bold".
    #[serde(default)]
    pub style: String,
}

impl TextOverlay {
    /// Overlays with blank text are not rendered.
    pub fn is_renderable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// One segment of a source video placed on the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Shot {
    /// Path of the source video, as given in the analysis bundle.
    pub source_video: PathBuf,

    /// Segment start in seconds (inclusive).
    pub start_time: f64,

    /// Segment end in seconds (exclusive).
    pub end_time: f64,

    #[serde(default)]
    pub transition_to_next: Transition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_overlay: Option<TextOverlay>,
}

impl Shot {
    pub fn new(source_video: impl Into<PathBuf>, start_time: f64, end_time: f64) -> Self {
        Self {
            source_video: source_video.into(),
            start_time,
            end_time,
            transition_to_next: Transition::default(),
            text_overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: TextOverlay) -> Self {
        self.text_overlay = Some(overlay);
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Overlay to burn in, if any has non-blank text.
    pub fn renderable_overlay(&self) -> Option<&TextOverlay> {
        self.text_overlay.as_ref().filter(|o| o.is_renderable())
    }

    fn validate(&self, index: usize) -> ModelResult<()> {
        if self.source_video.as_os_str().is_empty() {
            return Err(ModelError::EmptySource { index });
        }
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(ModelError::InvalidStart {
                index,
                value: self.start_time,
            });
        }
        if !self.end_time.is_finite() || self.end_time <= self.start_time {
            return Err(ModelError::InvalidRange {
                index,
                start: self.start_time,
                end: self.end_time,
            });
        }
        if let Some(overlay) = &self.text_overlay {
            if overlay.font_size == 0 {
                return Err(ModelError::InvalidFontSize { index });
            }
        }
        Ok(())
    }
}

/// Ordered list of shots making up the final cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditDecisionList {
    pub shots: Vec<Shot>,
}

impl EditDecisionList {
    pub fn new(shots: Vec<Shot>) -> Self {
        Self { shots }
    }

    /// Check the structural rules serde cannot express.
    pub fn validate(&self) -> ModelResult<()> {
        if self.shots.is_empty() {
            return Err(ModelError::EmptyPlan);
        }
        self.shots
            .iter()
            .enumerate()
            .try_for_each(|(index, shot)| shot.validate(index))
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Total duration of all shots in seconds.
    pub fn total_duration(&self) -> f64 {
        self.shots.iter().map(Shot::duration).sum()
    }

    /// Shots whose source is not in `known`.
    pub fn unknown_sources<'a>(
        &'a self,
        known: impl Fn(&Path) -> bool + 'a,
    ) -> impl Iterator<Item = (usize, &'a Shot)> + 'a {
        self.shots
            .iter()
            .enumerate()
            .filter(move |(_, shot)| !known(&shot.source_video))
    }

    /// JSON Schema of the wire format, embedded in planning prompts.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(EditDecisionList))
            .unwrap_or(serde_json::Value::Null)
    }
}
