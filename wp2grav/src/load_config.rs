//! `load_config` module: loads the static YAML configuration into typed
//! section structs.
//!
//! This is the only place where untrusted YAML is parsed and mapped to
//! strongly-typed structs. The `source` section describes the WordPress
//! side (snapshot file, public base URL, content directory on disk); the
//! `export` section describes the destination (output directory, theme
//! name).
//!
//! # Errors
//! All errors here use `anyhow::Error` for context-rich diagnostics and
//! are surfaced at the CLI boundary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};
use wp2grav_core::config::{ExportConfig, DEFAULT_THEME};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub source: SourceSection,
    pub export: ExportSection,
}

/// Where the WordPress data comes from.
#[derive(Debug, Deserialize)]
pub struct SourceSection {
    /// Path to the JSON snapshot of the site's content.
    pub snapshot: PathBuf,
    /// Public base URL of the source site, e.g. `https://example.com`.
    pub base_url: String,
    /// Absolute path of the site's `wp-content` directory.
    pub content_dir: PathBuf,
}

/// Where the export goes.
#[derive(Debug, Deserialize)]
pub struct ExportSection {
    /// Directory the dated run root is created under.
    pub output_dir: PathBuf,
    /// Theme directory name; defaults when omitted.
    #[serde(default)]
    pub theme: Option<String>,
}

impl CliConfig {
    /// Engine-level export settings assembled from both sections.
    pub fn export_settings(&self) -> ExportConfig {
        ExportConfig {
            base_url: self.source.base_url.clone(),
            content_dir: self.source.content_dir.clone(),
            theme: self
                .export
                .theme
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
        }
    }
}

/// Loads a static YAML config file into a [`CliConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(config)
}
