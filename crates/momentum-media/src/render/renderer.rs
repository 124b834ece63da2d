//! Three-stage ffmpeg renderer.

use momentum_models::{EditDecisionList, EncodingConfig};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::workspace::Workspace;
use crate::command::{verify_tool, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult, RenderError, RenderStage};
use crate::filters::drawtext_overlay;
use crate::metrics;

const CONCAT_LIST_NAME: &str = "concat_list.txt";
const CONCATENATED_NAME: &str = "concatenated.mp4";

/// Renderer settings.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// FFmpeg binary; resolved from PATH when unset.
    pub ffmpeg_path: Option<PathBuf>,
    /// Parent directory for job workspaces; system temp when unset.
    pub workspace_root: Option<PathBuf>,
    /// Per-shot encode settings.
    pub encoding: EncodingConfig,
    /// Kill any single ffmpeg invocation after this many seconds.
    pub timeout_secs: Option<u64>,
}

/// Executes edit decision lists.
///
/// Holds no per-job state; one renderer can serve any number of sequential
/// or concurrent jobs.
#[derive(Debug, Clone)]
pub struct Renderer {
    ffmpeg: PathBuf,
    config: RenderConfig,
}

impl Renderer {
    /// Resolve and verify ffmpeg once.
    pub fn new(config: RenderConfig) -> MediaResult<Self> {
        let ffmpeg = match &config.ffmpeg_path {
            Some(path) => path.clone(),
            None => which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?,
        };
        verify_tool(&ffmpeg)?;
        info!(ffmpeg = %ffmpeg.display(), "Renderer ready");
        Ok(Self { ffmpeg, config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `edl` over `audio` into `output`, returning the absolute output path.
    pub async fn render(
        &self,
        edl: &EditDecisionList,
        audio: &Path,
        output: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<PathBuf, RenderError> {
        if !audio.is_file() {
            return Err(RenderError::MissingAudio(audio.to_path_buf()));
        }
        let output = absolute(output).map_err(|e| {
            RenderError::stage_failed(RenderStage::MuxAudio, format!("invalid output path: {e}"))
        })?;

        let workspace = Workspace::acquire(self.config.workspace_root.as_deref())
            .map_err(RenderError::Workspace)?;

        let runner = self.runner(cancel);
        let result = self
            .run_stages(&runner, edl, audio, &output, workspace.path())
            .await;

        workspace.release();
        result
    }

    fn runner(&self, cancel: Option<watch::Receiver<bool>>) -> FfmpegRunner {
        let mut runner = FfmpegRunner::new().with_program(&self.ffmpeg);
        if let Some(rx) = cancel {
            runner = runner.with_cancel(rx);
        }
        if let Some(secs) = self.config.timeout_secs {
            runner = runner.with_timeout(secs);
        }
        runner
    }

    async fn run_stages(
        &self,
        runner: &FfmpegRunner,
        edl: &EditDecisionList,
        audio: &Path,
        output: &Path,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let clips = timed(
            RenderStage::StageClips,
            self.stage_clips(runner, edl, dir),
        )
        .await?;

        let concatenated = timed(
            RenderStage::Concatenate,
            concatenate(runner, &clips, dir),
        )
        .await?;

        timed(
            RenderStage::MuxAudio,
            mux_audio(runner, &concatenated, audio, output, &self.config.encoding),
        )
        .await?;

        info!(output = %output.display(), clips = clips.len(), "Render complete");
        Ok(output.to_path_buf())
    }

    async fn stage_clips(
        &self,
        runner: &FfmpegRunner,
        edl: &EditDecisionList,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let mut clips = Vec::with_capacity(edl.len());

        for (index, shot) in edl.shots.iter().enumerate() {
            if !shot.source_video.is_file() {
                warn!(
                    shot = index,
                    source = %shot.source_video.display(),
                    "Source video not found, skipping shot"
                );
                metrics::record_shot_skipped();
                continue;
            }

            let clip = dir.join(format!("clip_{:03}.mp4", index));
            let mut cmd = FfmpegCommand::new(&shot.source_video, &clip)
                .seek(shot.start_time)
                .duration(shot.duration());
            if let Some(overlay) = shot.renderable_overlay() {
                let textfile = write_overlay_text(dir, index, &overlay.text).await?;
                cmd = cmd.video_filter(drawtext_overlay(&textfile));
            }
            let cmd = cmd.output_args(self.config.encoding.to_ffmpeg_args());

            runner
                .run(&cmd)
                .await
                .map_err(|e| RenderError::from_media(RenderStage::StageClips, e))?;

            debug!(shot = index, clip = %clip.display(), "Staged clip");
            clips.push(clip);
        }

        if clips.is_empty() {
            return Err(RenderError::NoValidClips);
        }
        Ok(clips)
    }
}

async fn concatenate(
    runner: &FfmpegRunner,
    clips: &[PathBuf],
    dir: &Path,
) -> Result<PathBuf, RenderError> {
    let list = dir.join(CONCAT_LIST_NAME);
    tokio::fs::write(&list, concat_list(clips))
        .await
        .map_err(|e| RenderError::stage_failed(RenderStage::Concatenate, e.to_string()))?;

    let concatenated = dir.join(CONCATENATED_NAME);
    let cmd = FfmpegCommand::new(&list, &concatenated)
        .concat_demuxer()
        .codec_copy();

    runner
        .run(&cmd)
        .await
        .map_err(|e| RenderError::from_media(RenderStage::Concatenate, e))?;
    Ok(concatenated)
}

async fn mux_audio(
    runner: &FfmpegRunner,
    video: &Path,
    audio: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> Result<(), RenderError> {
    let cmd = FfmpegCommand::new(video, output)
        .add_input(audio)
        .map("0:v")
        .map("1:a")
        .video_codec("copy")
        .output_args(encoding.audio_args())
        .shortest();

    runner
        .run(&cmd)
        .await
        .map_err(|e| RenderError::from_media(RenderStage::MuxAudio, e))
}

/// Caption text for shot `index`, written verbatim for drawtext's `textfile`.
async fn write_overlay_text(dir: &Path, index: usize, text: &str) -> Result<PathBuf, RenderError> {
    let path = dir.join(format!("overlay_{:03}.txt", index));
    tokio::fs::write(&path, text)
        .await
        .map_err(|e| RenderError::stage_failed(RenderStage::StageClips, e.to_string()))?;
    Ok(path)
}

/// Concat demuxer list, one quoted absolute path per line.
fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|p| {
            let path = p.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", path)
        })
        .collect()
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

async fn timed<T, F>(stage: RenderStage, fut: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    let started = Instant::now();
    let result = fut.await;
    metrics::record_stage_duration(stage, started.elapsed().as_secs_f64());

    if let Err(e) = &result {
        match e {
            RenderError::Cancelled => info!(stage = %stage, "Render cancelled"),
            _ => {
                metrics::record_stage_failure(stage);
                error!(stage = %stage, error = %e, "Render stage failed");
            }
        }
    }
    result
}
