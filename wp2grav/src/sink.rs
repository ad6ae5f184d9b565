//! Filesystem sink writing the export tree under a dated run root.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use wp2grav_core::contract::{Sink, SinkError};

/// Sink rooted at one directory; all relative paths land beneath it.
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    /// Creates a sink rooted at `base/user-<YYYYMMDD>`, the dated run
    /// directory all export targets of one run share.
    pub fn dated(base: &Path) -> std::io::Result<Self> {
        let root = base.join(format!("user-{}", Utc::now().format("%Y%m%d")));
        Self::at(root)
    }

    /// Creates a sink rooted at an explicit directory.
    pub fn at(root: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&root)?;
        info!(root = %root.display(), "Export run root ready");
        Ok(DirSink { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

#[async_trait]
impl Sink for DirSink {
    async fn write(&self, rel_path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
        let path = self.absolute(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                error!(error = ?e, path = %path.display(), "Could not create parent directory");
                SinkError::from(e)
            })?;
        }
        fs::write(&path, bytes).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Could not write file");
            SinkError::from(e)
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        Ok(())
    }

    async fn ensure_directory(&self, rel_path: &Path) -> Result<(), SinkError> {
        let path = self.absolute(rel_path);
        fs::create_dir_all(&path).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Could not create directory");
            SinkError::from(e)
        })?;
        Ok(())
    }

    async fn copy_asset(&self, source: &Path, dest_rel: &Path) -> Result<(), SinkError> {
        let dest = self.absolute(dest_rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                error!(error = ?e, path = %dest.display(), "Could not create asset directory");
                SinkError::from(e)
            })?;
        }
        fs::copy(source, &dest).map_err(|e| {
            error!(
                error = ?e,
                source = %source.display(),
                dest = %dest.display(),
                "Could not copy asset"
            );
            SinkError::from(e)
        })?;
        debug!(source = %source.display(), dest = %dest.display(), "Copied asset");
        Ok(())
    }
}
