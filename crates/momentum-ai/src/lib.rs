//! Generative model access for Momentum.
//!
//! The pipeline talks to the model in two roles, each behind a trait so
//! tests can substitute deterministic fakes:
//! - [`ContentAnalyzer`]: sampled frames in, [`SceneAnalysis`] out
//! - [`PlanGenerator`]: analysis bundle and creative brief in, raw plan text out
//!
//! [`GeminiClient`] implements both over the Gemini REST API.
//!
//! [`SceneAnalysis`]: momentum_models::SceneAnalysis

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod traits;
mod types;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{AiError, AiResult};
pub use prompt::strip_code_fences;
pub use traits::{ContentAnalyzer, PlanGenerator};
