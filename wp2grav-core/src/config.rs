//! Engine-level export settings, shared by every pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assets::AssetRelocator;

/// Theme directory name used when the configuration does not name one.
pub const DEFAULT_THEME: &str = "wordpress-export";

/// Settings the export pipelines need about the source site: where its
/// URLs point, where its content directory lives on disk, and which theme
/// directory receives the generated blueprints and templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Public base URL of the WordPress site, e.g. `https://example.com`.
    pub base_url: String,
    /// Absolute path of the site's `wp-content` directory.
    pub content_dir: PathBuf,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl ExportConfig {
    /// The relocator mapping this site's upload URLs into the export tree.
    pub fn relocator(&self) -> AssetRelocator {
        AssetRelocator::new(&self.base_url, &self.content_dir)
    }

    /// Emits a structured trace of the loaded settings.
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            content_dir = %self.content_dir.display(),
            theme = %self.theme,
            "Loaded export settings"
        );
        debug!(config = ?self, "Export settings (full debug)");
    }
}
