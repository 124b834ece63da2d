//! Beat detection.

use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::command::run_blocking;
use crate::error::MediaError;

/// Detects beat positions in an audio file.
///
/// Never fails past this boundary: any problem, cancellation included, yields
/// an empty list. Blocking.
pub trait BeatDetector: Send + Sync {
    fn detect_beats(&self, path: &Path, cancel: Option<&watch::Receiver<bool>>) -> Vec<f64>;
}

/// Beat detector that shells out to `aubio beat`.
#[derive(Debug, Clone)]
pub struct AubioBeatDetector {
    program: PathBuf,
}

impl Default for AubioBeatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AubioBeatDetector {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("aubio"),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl BeatDetector for AubioBeatDetector {
    fn detect_beats(&self, path: &Path, cancel: Option<&watch::Receiver<bool>>) -> Vec<f64> {
        if !path.is_file() {
            warn!(path = %path.display(), "Audio file not found, skipping beat detection");
            return Vec::new();
        }

        let mut command = Command::new(&self.program);
        command.arg("beat").arg(path);
        let output = match run_blocking(command, cancel) {
            Ok(output) => output,
            Err(MediaError::Cancelled) => {
                debug!(path = %path.display(), "Beat detection cancelled");
                return Vec::new();
            }
            Err(e) => {
                warn!(program = %self.program.display(), error = %e, "Could not launch beat detector");
                return Vec::new();
            }
        };

        if !output.status.success() {
            warn!(
                exit_code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Beat detector failed"
            );
            return Vec::new();
        }

        let beats = parse_beat_lines(&String::from_utf8_lossy(&output.stdout));
        debug!(path = %path.display(), beats = beats.len(), "Detected beats");
        beats
    }
}

/// One timestamp per line; unparsable or negative lines are dropped.
fn parse_beat_lines(stdout: &str) -> Vec<f64> {
    let mut beats: Vec<f64> = stdout
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t >= 0.0)
        .collect();
    beats.sort_by(f64::total_cmp);
    beats
}
