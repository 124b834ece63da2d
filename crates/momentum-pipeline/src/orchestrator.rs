//! End-to-end run sequencing.

use momentum_ai::{ContentAnalyzer, PlanGenerator};
use momentum_media::{BeatDetector, FrameExtractor, Renderer};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use crate::analysis::AnalysisCoordinator;
use crate::classifier::MediaClassifier;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::{EventSender, PipelineEvent};
use crate::logging::RunLogger;
use crate::metrics;
use crate::planner::Planner;

/// External collaborators a run depends on.
///
/// The analyzer and plan generator are usually the same model client.
pub struct Collaborators {
    pub beat_detector: Arc<dyn BeatDetector>,
    pub frame_extractor: Arc<dyn FrameExtractor>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub plan_generator: Arc<dyn PlanGenerator>,
    pub renderer: Renderer,
}

/// Classify, analyze, plan, render.
///
/// Holds no per-run state; runs are independent.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    classifier: MediaClassifier,
    coordinator: AnalysisCoordinator,
    planner: Planner,
    renderer: Renderer,
    events: EventSender,
}

impl PipelineOrchestrator {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        let coordinator = AnalysisCoordinator::new(
            collaborators.beat_detector,
            collaborators.frame_extractor,
            collaborators.analyzer,
            config.frames_per_video,
            config.max_parallel_analyses,
        );
        Self {
            classifier: MediaClassifier::new(),
            coordinator,
            planner: Planner::new(collaborators.plan_generator),
            renderer: collaborators.renderer,
            events: EventSender::disabled(),
            config,
        }
    }

    /// Publish progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = EventSender::new(tx);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run to completion and return the rendered file's absolute path.
    pub async fn run_pipeline(&self, paths: &[PathBuf]) -> PipelineResult<PathBuf> {
        self.run_pipeline_with_cancel(paths, None).await
    }

    /// Like [`run_pipeline`](Self::run_pipeline), stopping early once `cancel`
    /// flips to `true`.
    pub async fn run_pipeline_with_cancel(
        &self,
        paths: &[PathBuf],
        cancel: Option<watch::Receiver<bool>>,
    ) -> PipelineResult<PathBuf> {
        let logger = RunLogger::new("orchestrator");
        let span = logger.create_span();
        let started = Instant::now();

        let result = self.execute(paths, cancel, &logger).instrument(span).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(output) => {
                metrics::record_run("success", elapsed);
                logger.log_completion(&format!("{} in {:.1}s", output.display(), elapsed));
                self.events.send(PipelineEvent::Finished {
                    output: output.clone(),
                });
            }
            Err(e) => {
                metrics::record_run(e.kind().as_str(), elapsed);
                logger.log_error(&format!("Run failed ({}): {}", e.kind(), e));
                self.events.send(PipelineEvent::Failed {
                    kind: e.kind(),
                    message: e.user_message(),
                });
            }
        }
        result
    }

    async fn execute(
        &self,
        paths: &[PathBuf],
        mut cancel: Option<watch::Receiver<bool>>,
        logger: &RunLogger,
    ) -> PipelineResult<PathBuf> {
        self.events.send(PipelineEvent::Started {
            run_id: logger.run_id().to_string(),
        });
        logger.log_start(&format!("{} input files", paths.len()));
        ensure_not_cancelled(&cancel)?;

        let inputs = self
            .classifier
            .classify(paths, &logger.for_component("classifier"))?;
        self.events.send(PipelineEvent::InputsClassified {
            audio: inputs.audio.path().to_path_buf(),
            videos: inputs.videos.len(),
        });

        let analysis_logger = logger.for_component("analysis");
        let worker_cancel = cancel.clone();
        let bundle = cancellable(
            &mut cancel,
            self.coordinator.analyze(
                &inputs.audio,
                &inputs.videos,
                &analysis_logger,
                worker_cancel,
            ),
        )
        .await?;
        self.events.send(PipelineEvent::AnalysisComplete {
            analyzed: bundle.videos.len(),
            failed: inputs.videos.len().saturating_sub(bundle.videos.len()),
            beats: bundle.audio.beat_timestamps.len(),
        });

        let planner_logger = logger.for_component("planner");
        let edl = cancellable(
            &mut cancel,
            self.planner.plan(
                &bundle,
                &self.config.video_goal,
                &self.config.key_features,
                &planner_logger,
            ),
        )
        .await??;
        self.events.send(PipelineEvent::PlanReady { shots: edl.len() });

        ensure_not_cancelled(&cancel)?;
        self.events.send(PipelineEvent::RenderStarted);
        logger.log_progress(&format!("Rendering {} shots", edl.len()));

        // The renderer watches the flag itself so it can kill ffmpeg and clean up.
        let output = self
            .renderer
            .render(
                &edl,
                inputs.audio.path(),
                &self.config.output_path,
                cancel.clone(),
            )
            .await?;
        Ok(output)
    }
}

fn ensure_not_cancelled(cancel: &Option<watch::Receiver<bool>>) -> PipelineResult<()> {
    match cancel {
        Some(rx) if *rx.borrow() => Err(PipelineError::Cancelled),
        _ => Ok(()),
    }
}

/// Await `fut` unless the run is cancelled first; a cancelled future is dropped.
async fn cancellable<F: Future>(
    cancel: &mut Option<watch::Receiver<bool>>,
    fut: F,
) -> PipelineResult<F::Output> {
    let Some(rx) = cancel else {
        return Ok(fut.await);
    };
    if *rx.borrow() {
        return Err(PipelineError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancelled(rx) => Err(PipelineError::Cancelled),
        out = fut => Ok(out),
    }
}

/// Resolves once the flag is set; never if the sender goes away first.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}
