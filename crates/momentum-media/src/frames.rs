//! Representative frame sampling.

use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::command::{cancel_requested, run_blocking, FfmpegCommand};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Samples JPEG frames from a video.
///
/// Implementations block; callers run them on the blocking pool. An empty
/// result means the video could not be sampled. Once `cancel` is set an
/// implementation should stop grabbing and return empty.
pub trait FrameExtractor: Send + Sync {
    fn extract_frames(
        &self,
        path: &Path,
        count: usize,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Vec<Vec<u8>>;
}

/// Evenly spaced frame indices over `[0, total)`.
///
/// The first and last frame are included when `count > 1`; a single frame is
/// taken from the middle; asking for at least `total` frames yields all of them.
pub fn frame_indices(total: u64, count: usize) -> Vec<u64> {
    if total == 0 || count == 0 {
        return Vec::new();
    }
    let count = count as u64;
    if count >= total {
        return (0..total).collect();
    }
    if count == 1 {
        return vec![total / 2];
    }
    (0..count)
        .map(|i| i * (total - 1) / (count - 1))
        .collect()
}

/// Frame extractor backed by ffprobe + single-frame ffmpeg grabs.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegFrameExtractor {
    /// Resolve both tools from PATH.
    pub fn new() -> MediaResult<Self> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;
        Ok(Self { ffmpeg, ffprobe })
    }

    pub fn with_programs(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn try_extract(
        &self,
        path: &Path,
        count: usize,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> MediaResult<Vec<Vec<u8>>> {
        if cancel_requested(cancel) {
            return Err(MediaError::Cancelled);
        }
        let info = probe_video(&self.ffprobe, path)?;
        let indices = frame_indices(info.frame_count, count);
        debug!(
            path = %path.display(),
            total_frames = info.frame_count,
            requested = count,
            "Sampling frames"
        );

        let mut frames = Vec::with_capacity(indices.len());
        for index in indices {
            let timestamp = index as f64 / info.fps;
            match self.grab_frame(path, timestamp, cancel) {
                Ok(bytes) if !bytes.is_empty() => frames.push(bytes),
                Ok(_) => warn!(path = %path.display(), index, "Empty frame, skipping"),
                Err(MediaError::Cancelled) => return Err(MediaError::Cancelled),
                Err(e) => warn!(path = %path.display(), index, error = %e, "Failed to read frame, skipping"),
            }
        }
        Ok(frames)
    }

    fn grab_frame(
        &self,
        path: &Path,
        timestamp: f64,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> MediaResult<Vec<u8>> {
        let cmd = FfmpegCommand::new(path, "pipe:1")
            .seek(timestamp)
            .single_frame()
            .output_args(["-f", "image2pipe", "-c:v", "mjpeg"]);

        let mut command = Command::new(&self.ffmpeg);
        command.args(cmd.build_args());
        let output = run_blocking(command, cancel)?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                "frame grab failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
                output.status.code(),
            ));
        }
        Ok(output.stdout)
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    fn extract_frames(
        &self,
        path: &Path,
        count: usize,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Vec<Vec<u8>> {
        if count == 0 {
            warn!(path = %path.display(), "Requested zero frames");
            return Vec::new();
        }
        match self.try_extract(path, count, cancel) {
            Ok(frames) => frames,
            Err(MediaError::Cancelled) => {
                debug!(path = %path.display(), "Frame extraction cancelled");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Frame extraction failed");
                Vec::new()
            }
        }
    }
}
