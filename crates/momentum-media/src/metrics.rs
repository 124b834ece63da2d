//! Renderer metrics.

use metrics::{counter, histogram};

use crate::error::RenderStage;

/// Metric names as constants for consistency.
pub mod names {
    pub const RENDER_STAGE_DURATION_SECONDS: &str = "momentum_render_stage_duration_seconds";
    pub const RENDER_STAGE_FAILURES_TOTAL: &str = "momentum_render_stage_failures_total";
    pub const SHOTS_SKIPPED_TOTAL: &str = "momentum_shots_skipped_total";
}

/// Record how long a renderer stage took.
pub fn record_stage_duration(stage: RenderStage, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::RENDER_STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a renderer stage failure.
pub fn record_stage_failure(stage: RenderStage) {
    let labels = [("stage", stage.as_str().to_string())];
    counter!(names::RENDER_STAGE_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a shot skipped because its source was missing.
pub fn record_shot_skipped() {
    counter!(names::SHOTS_SKIPPED_TOTAL).increment(1);
}
