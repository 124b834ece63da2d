//! Deterministic collaborators for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use momentum_ai::{AiError, AiResult, ContentAnalyzer, PlanGenerator};
use momentum_media::{BeatDetector, FrameExtractor, RenderConfig, Renderer};
use momentum_models::{AnalysisBundle, SceneAnalysis};
use momentum_pipeline::{Collaborators, PipelineConfig, PipelineOrchestrator};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

/// Logs its arguments and touches its last argument.
const FAKE_FFMPEG: &str = r#"#!/bin/sh
case "$1" in -version) echo "ffmpeg version fake"; exit 0;; esac
printf '%s\n' "$*" >> "$(dirname "$0")/calls.log"
for last; do :; done
: > "$last"
exit 0
"#;

pub struct FakeBeats(pub Vec<f64>);

impl BeatDetector for FakeBeats {
    fn detect_beats(&self, _path: &Path, _cancel: Option<&watch::Receiver<bool>>) -> Vec<f64> {
        self.0.clone()
    }
}

/// Each frame carries the source path so the analyzer can tell videos apart.
pub struct FakeFrames;

impl FrameExtractor for FakeFrames {
    fn extract_frames(
        &self,
        path: &Path,
        count: usize,
        _cancel: Option<&watch::Receiver<bool>>,
    ) -> Vec<Vec<u8>> {
        let tag = path.to_string_lossy().into_owned().into_bytes();
        vec![tag; count]
    }
}

/// Fails for any video whose path contains "broken"; hangs for "stuck".
#[derive(Default)]
pub struct FakeAnalyzer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze_frames(&self, frames: &[Vec<u8>]) -> AiResult<SceneAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let source = String::from_utf8_lossy(&frames[0]).into_owned();
        if source.contains("broken") {
            return Err(AiError::RequestFailed {
                status: 500,
                body: "internal".into(),
            });
        }
        if source.contains("stuck") {
            std::future::pending::<()>().await;
        }
        Ok(SceneAnalysis {
            description: format!("scene from {}", source),
            key_moment_timestamp: 1.0,
        })
    }
}

/// Cuts one shot from each analyzed video, or replies with fixed text.
#[derive(Default)]
pub struct FakePlanner {
    pub calls: AtomicUsize,
    pub reply: Option<String>,
}

impl FakePlanner {
    pub fn replying(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Some(text.to_string()),
        }
    }
}

#[async_trait]
impl PlanGenerator for FakePlanner {
    async fn generate_plan(
        &self,
        bundle: &AnalysisBundle,
        _goal: &str,
        _features: &[String],
    ) -> AiResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }

        let shots: Vec<_> = bundle
            .videos
            .keys()
            .enumerate()
            .map(|(i, path)| {
                serde_json::json!({
                    "source_video": path,
                    "start_time": 0.0,
                    "end_time": 1.0 + i as f64,
                    "text_overlay": { "text": "Go!", "font_size": 48 }
                })
            })
            .collect();
        Ok(serde_json::json!({ "shots": shots }).to_string())
    }
}

/// Temp directories and fakes for one orchestrator.
pub struct Harness {
    pub tools: TempDir,
    pub media: TempDir,
    pub work_root: TempDir,
    pub analyzer: Arc<FakeAnalyzer>,
    pub planner: Arc<FakePlanner>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_planner(FakePlanner::default())
    }

    pub fn with_planner(planner: FakePlanner) -> Self {
        let tools = TempDir::new().expect("tools dir");
        let ffmpeg = tools.path().join("ffmpeg");
        std::fs::write(&ffmpeg, FAKE_FFMPEG).expect("write fake ffmpeg");
        std::fs::set_permissions(&ffmpeg, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake ffmpeg");

        Self {
            tools,
            media: TempDir::new().expect("media dir"),
            work_root: TempDir::new().expect("work root"),
            analyzer: Arc::new(FakeAnalyzer::default()),
            planner: Arc::new(planner),
        }
    }

    pub fn orchestrator(&self, beats: Vec<f64>) -> PipelineOrchestrator {
        let renderer = Renderer::new(RenderConfig {
            ffmpeg_path: Some(self.tools.path().join("ffmpeg")),
            workspace_root: Some(self.work_root.path().to_path_buf()),
            ..Default::default()
        })
        .expect("renderer with fake ffmpeg");

        let config = PipelineConfig {
            output_path: self.media.path().join("output.mp4"),
            frames_per_video: 3,
            max_parallel_analyses: 2,
            ..Default::default()
        };

        PipelineOrchestrator::new(
            config,
            Collaborators {
                beat_detector: Arc::new(FakeBeats(beats)),
                frame_extractor: Arc::new(FakeFrames),
                analyzer: self.analyzer.clone(),
                plan_generator: self.planner.clone(),
                renderer,
            },
        )
    }

    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.media.path().join(name);
        std::fs::write(&path, b"media").expect("write media fixture");
        path
    }

    pub fn output(&self) -> PathBuf {
        self.media.path().join("output.mp4")
    }

    pub fn workspace_entries(&self) -> usize {
        std::fs::read_dir(self.work_root.path())
            .expect("read work root")
            .count()
    }

    pub fn ffmpeg_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.tools.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn analyzer_calls(&self) -> usize {
        self.analyzer.calls.load(Ordering::SeqCst)
    }

    pub fn planner_calls(&self) -> usize {
        self.planner.calls.load(Ordering::SeqCst)
    }
}
