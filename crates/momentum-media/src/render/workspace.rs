//! Job-private scratch directory.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

pub const WORKSPACE_PREFIX: &str = "momentum_render_";

/// Temporary directory owned by exactly one render job.
///
/// Removed by [`Workspace::release`] or, if the job future is dropped first,
/// on drop. Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a new workspace under `root`, or the system temp dir.
    pub fn acquire(root: Option<&Path>) -> io::Result<Self> {
        let dir = match root {
            Some(root) => {
                let root = if root.is_absolute() {
                    root.to_path_buf()
                } else {
                    std::env::current_dir()?.join(root)
                };
                std::fs::create_dir_all(&root)?;
                tempfile::Builder::new()
                    .prefix(WORKSPACE_PREFIX)
                    .tempdir_in(&root)?
            }
            None => tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!(workspace = %path.display(), "Acquired render workspace");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(workspace = %self.path.display(), "Removed render workspace"),
                Err(e) => warn!(
                    workspace = %self.path.display(),
                    error = %e,
                    "ResourceCleanupWarning: failed to remove render workspace"
                ),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}
