//! Structured run logging utilities.
//!
//! Every component receives a [`RunLogger`] so that all events of one run
//! carry the same `run_id`.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    component: String,
}

impl RunLogger {
    /// Start a new run with a fresh id.
    pub fn new(component: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            component: component.to_string(),
        }
    }

    /// Logger for an existing run id.
    pub fn from_string(run_id: &str, component: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            component: component.to_string(),
        }
    }

    /// Same run, different component.
    pub fn for_component(&self, component: &str) -> Self {
        Self::from_string(&self.run_id, component)
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            component = %self.component,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            component = %self.component,
            "{}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            component = %self.component,
            "{}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            component = %self.component,
            "{}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            component = %self.component,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Span covering the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            component = %self.component
        )
    }
}
