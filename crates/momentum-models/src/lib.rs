//! Shared data models for the Momentum video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Classified media assets
//! - Audio and per-video scene analysis
//! - The edit decision list produced by the planner
//! - Encoding configuration used by the renderer

pub mod analysis;
pub mod asset;
pub mod edl;
pub mod encoding;
pub mod error;

// Re-export common types
pub use analysis::{AnalysisBundle, AudioAnalysis, SceneAnalysis};
pub use asset::{MediaAsset, MediaKind};
pub use edl::{EditDecisionList, OverlayPosition, Shot, TextOverlay, Transition};
pub use encoding::EncodingConfig;
pub use error::{ModelError, ModelResult};
