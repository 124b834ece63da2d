//! Momentum media generation pipeline.
//!
//! This crate provides:
//! - Input classification into one audio track and its videos
//! - Concurrent beat detection and per-video content analysis
//! - Edit plan acquisition and validation
//! - Run orchestration with progress events and cooperative cancellation

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod planner;

pub use analysis::AnalysisCoordinator;
pub use classifier::{ClassifiedInputs, MediaClassifier};
pub use config::PipelineConfig;
pub use error::{
    AnalysisFailure, ErrorKind, InputError, PipelineError, PipelineResult, PlanningError,
};
pub use events::{EventSender, PipelineEvent};
pub use logging::RunLogger;
pub use orchestrator::{Collaborators, PipelineOrchestrator};
pub use planner::{parse_plan, Planner};
