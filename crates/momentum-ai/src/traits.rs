//! Model roles used by the pipeline.

use async_trait::async_trait;
use momentum_models::{AnalysisBundle, SceneAnalysis};

use crate::error::AiResult;

/// Describes a video from a handful of sampled JPEG frames.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Fails on empty input, an empty or unparsable response, or transport errors.
    async fn analyze_frames(&self, frames: &[Vec<u8>]) -> AiResult<SceneAnalysis>;
}

/// Produces a raw edit plan for the analyzed media and creative brief.
///
/// The returned text is unvalidated; the caller parses and checks it.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate_plan(
        &self,
        bundle: &AnalysisBundle,
        goal: &str,
        features: &[String],
    ) -> AiResult<String>;
}
