//! Edit decision list rendering.
//!
//! A render job runs three ffmpeg stages in order inside a private workspace:
//! 1. Trim each shot (burning in its caption) to `clip_NNN.mp4`
//! 2. Join the clips with the concat demuxer using stream copy
//! 3. Replace the audio with the external track
//!
//! The workspace is removed whatever the outcome.

mod renderer;
mod workspace;

pub use renderer::{RenderConfig, Renderer};
pub use workspace::{Workspace, WORKSPACE_PREFIX};
