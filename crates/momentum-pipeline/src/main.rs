//! Momentum command-line entry point.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use momentum_ai::GeminiClient;
use momentum_media::{AubioBeatDetector, FfmpegFrameExtractor, RenderConfig, Renderer};
use momentum_pipeline::{
    metrics, Collaborators, PipelineConfig, PipelineEvent, PipelineOrchestrator,
};

/// Turn one audio track and a handful of clips into a beat-synced short video.
#[derive(Debug, Parser)]
#[command(name = "momentum", version)]
struct Cli {
    /// Where to write the rendered video
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Creative goal for the edit
    #[arg(short, long)]
    goal: Option<String>,

    /// Feature tag for the edit (repeatable)
    #[arg(short = 'f', long = "feature")]
    features: Vec<String>,

    /// Frames sampled from each video
    #[arg(long)]
    frames: Option<usize>,

    /// Print a Prometheus metrics snapshot on exit
    #[arg(long)]
    metrics: bool,

    /// One audio file (.mp3/.wav) and one or more videos (.mp4/.mov)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Cli {
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(goal) = &self.goal {
            config.video_goal = goal.clone();
        }
        if !self.features.is_empty() {
            config.key_features = self.features.clone();
        }
        if let Some(frames) = self.frames {
            config.frames_per_video = frames;
        }
        config
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(message) => {
            eprintln!("{}", message);
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("momentum=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Returns the line to show on stderr when the run does not succeed.
async fn run(cli: Cli) -> Result<(), String> {
    let metrics_handle = if cli.metrics {
        match metrics::init_metrics() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Metrics recorder unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let config = cli.apply(PipelineConfig::from_env());
    info!("Pipeline config: {:?}", config);

    let orchestrator =
        build_orchestrator(config).map_err(|e| format!("Setup Error: {:#}", e))?;

    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(32);
    let orchestrator = orchestrator.with_events(event_tx);
    let event_logger = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => debug!(event = %json, "Pipeline event"),
                Err(e) => debug!("Unserializable pipeline event: {}", e),
            }
        }
    });

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    let result = orchestrator
        .run_pipeline_with_cancel(&cli.files, Some(cancel_rx))
        .await;

    interrupt.abort();
    drop(orchestrator);
    event_logger.await.ok();

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    match result {
        Ok(output) => {
            println!("{}", output.display());
            Ok(())
        }
        Err(e) => Err(e.user_message()),
    }
}

fn build_orchestrator(config: PipelineConfig) -> anyhow::Result<PipelineOrchestrator> {
    let client = Arc::new(GeminiClient::from_env().context("model client configuration")?);

    let renderer = Renderer::new(RenderConfig {
        workspace_root: config.work_dir.clone(),
        timeout_secs: config.ffmpeg_timeout_secs,
        ..RenderConfig::default()
    })
    .context("ffmpeg is required for rendering")?;

    let frame_extractor =
        FfmpegFrameExtractor::new().context("ffmpeg and ffprobe are required for analysis")?;

    let collaborators = Collaborators {
        beat_detector: Arc::new(AubioBeatDetector::new()),
        frame_extractor: Arc::new(frame_extractor),
        analyzer: client.clone(),
        plan_generator: client,
        renderer,
    };

    Ok(PipelineOrchestrator::new(config, collaborators))
}
