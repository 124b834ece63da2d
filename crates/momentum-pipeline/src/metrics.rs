//! Prometheus metrics for pipeline runs.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "momentum_runs_total";
    pub const RUN_DURATION_SECONDS: &str = "momentum_run_duration_seconds";
    pub const VIDEOS_ANALYZED_TOTAL: &str = "momentum_videos_analyzed_total";
    pub const VIDEO_ANALYSIS_FAILURES_TOTAL: &str = "momentum_video_analysis_failures_total";
}

/// Record a finished run; `outcome` is "success" or an error kind.
pub fn record_run(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a video that made it into the analysis bundle.
pub fn record_video_analyzed() {
    counter!(names::VIDEOS_ANALYZED_TOTAL).increment(1);
}

/// Record a video omitted from the analysis bundle.
pub fn record_video_analysis_failure(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::VIDEO_ANALYSIS_FAILURES_TOTAL, &labels).increment(1);
}
