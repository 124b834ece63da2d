//! Concurrent audio and video analysis.

use futures::future::join_all;
use futures::FutureExt;
use momentum_ai::ContentAnalyzer;
use momentum_media::{cancel_requested, BeatDetector, FrameExtractor};
use momentum_models::{AnalysisBundle, AudioAnalysis, MediaAsset, SceneAnalysis};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};

use crate::error::AnalysisFailure;
use crate::logging::RunLogger;
use crate::metrics;

/// Runs beat detection and per-video content analysis.
///
/// Never fails: a broken audio analysis yields no beats and a broken video
/// (including one whose analyzer panics) is left out of the bundle.
#[derive(Clone)]
pub struct AnalysisCoordinator {
    beat_detector: Arc<dyn BeatDetector>,
    frame_extractor: Arc<dyn FrameExtractor>,
    analyzer: Arc<dyn ContentAnalyzer>,
    frames_per_video: usize,
    permits: Arc<Semaphore>,
}

impl AnalysisCoordinator {
    pub fn new(
        beat_detector: Arc<dyn BeatDetector>,
        frame_extractor: Arc<dyn FrameExtractor>,
        analyzer: Arc<dyn ContentAnalyzer>,
        frames_per_video: usize,
        max_parallel: usize,
    ) -> Self {
        Self {
            beat_detector,
            frame_extractor,
            analyzer,
            frames_per_video,
            permits: Arc::new(Semaphore::new(max_parallel.max(1))),
        }
    }

    /// Analyze the audio track and every video concurrently.
    ///
    /// `cancel` is handed to the blocking workers, which keep running after
    /// this future is dropped and only stop once they see the flag.
    pub async fn analyze(
        &self,
        audio: &MediaAsset,
        videos: &[MediaAsset],
        logger: &RunLogger,
        cancel: Option<watch::Receiver<bool>>,
    ) -> AnalysisBundle {
        let (audio_analysis, scenes) = tokio::join!(
            self.analyze_audio(audio.path(), logger, cancel.clone()),
            self.analyze_videos(videos, logger, cancel)
        );
        AnalysisBundle::new(audio_analysis, scenes)
    }

    async fn analyze_audio(
        &self,
        path: &Path,
        logger: &RunLogger,
        cancel: Option<watch::Receiver<bool>>,
    ) -> AudioAnalysis {
        let detector = Arc::clone(&self.beat_detector);
        let owned = path.to_path_buf();
        let detect = move || detector.detect_beats(&owned, cancel.as_ref());
        match tokio::task::spawn_blocking(detect).await {
            Ok(beats) => {
                let analysis = AudioAnalysis::from_beats(beats);
                if analysis.is_empty() {
                    logger.log_warning(&format!("No beats detected in {}", path.display()));
                } else {
                    logger.log_progress(&format!(
                        "Detected {} beats in {}",
                        analysis.beat_timestamps.len(),
                        path.display()
                    ));
                }
                analysis
            }
            Err(e) => {
                logger.log_warning(&format!(
                    "Beat detection worker failed for {}: {}",
                    path.display(),
                    e
                ));
                AudioAnalysis::default()
            }
        }
    }

    async fn analyze_videos(
        &self,
        videos: &[MediaAsset],
        logger: &RunLogger,
        cancel: Option<watch::Receiver<bool>>,
    ) -> BTreeMap<PathBuf, SceneAnalysis> {
        let tasks = videos.iter().map(|video| {
            let path = video.path().to_path_buf();
            let cancel = cancel.clone();
            async move {
                let outcome = AssertUnwindSafe(self.analyze_video(&path, cancel))
                    .catch_unwind()
                    .await;
                let result = match outcome {
                    Ok(result) => result,
                    Err(panic) => Err(AnalysisFailure::Worker {
                        video: path.clone(),
                        message: panic_message(&*panic),
                    }),
                };
                (path, result)
            }
        });

        let mut scenes = BTreeMap::new();
        for (path, result) in join_all(tasks).await {
            match result {
                Ok(scene) => {
                    metrics::record_video_analyzed();
                    scenes.insert(path, scene);
                }
                Err(failure) => {
                    metrics::record_video_analysis_failure(failure.reason());
                    logger.log_warning(&format!("Skipping video: {}", failure));
                }
            }
        }

        logger.log_progress(&format!(
            "Analyzed {} of {} videos",
            scenes.len(),
            videos.len()
        ));
        scenes
    }

    async fn analyze_video(
        &self,
        path: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<SceneAnalysis, AnalysisFailure> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AnalysisFailure::Worker {
                video: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if !path.is_file() {
            return Err(AnalysisFailure::MissingFile(path.to_path_buf()));
        }
        if cancel_requested(cancel.as_ref()) {
            return Err(AnalysisFailure::Worker {
                video: path.to_path_buf(),
                message: "cancelled".to_string(),
            });
        }

        let extractor = Arc::clone(&self.frame_extractor);
        let owned = path.to_path_buf();
        let count = self.frames_per_video;
        let extract = move || extractor.extract_frames(&owned, count, cancel.as_ref());
        let frames = tokio::task::spawn_blocking(extract)
            .await
            .map_err(|e| AnalysisFailure::Worker {
                video: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if frames.is_empty() {
            return Err(AnalysisFailure::NoFrames(path.to_path_buf()));
        }

        self.analyzer
            .analyze_frames(&frames)
            .await
            .map_err(|e| AnalysisFailure::Analyzer {
                video: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("analysis panicked: {}", detail)
}
