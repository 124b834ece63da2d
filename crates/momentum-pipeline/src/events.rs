//! Run progress notifications.

use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::ErrorKind;

/// Event emitted as a run moves through its phases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Input validation is starting
    Started { run_id: String },

    InputsClassified { audio: PathBuf, videos: usize },

    AnalysisComplete {
        analyzed: usize,
        failed: usize,
        beats: usize,
    },

    PlanReady { shots: usize },

    RenderStarted,

    Finished { output: PathBuf },

    Failed { kind: ErrorKind, message: String },
}

/// Non-blocking event sink. Events are dropped when nobody listens or the
/// channel is full.
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, event: PipelineEvent) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.try_send(event) {
                debug!("Dropped pipeline event: {}", e);
            }
        }
    }
}
