//! Error taxonomy of the export pipelines.
//!
//! Collaborators hand back boxed errors (see [`crate::contract`]); the
//! pipelines translate those into one of the variants here, attaching the
//! path or subject involved. Everything in this enum is fatal for the
//! running export target; recoverable conditions (missing slugs, unknown
//! field kinds, failed asset copies) are handled in place and never
//! surface as an `ExportError`.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::{SinkError, SourceError};

#[derive(Debug, Error)]
pub enum ExportError {
    /// The content source failed to deliver records.
    #[error("content source failure: {0}")]
    Source(String),

    /// A directory under the run root could not be created.
    #[error("could not create export folder {path}: {reason}")]
    Setup { path: PathBuf, reason: String },

    /// A document could not be persisted.
    #[error("could not save {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// The source returned nothing for a target that requires records.
    #[error("no {0} found, nothing to export")]
    EmptySet(&'static str),

    /// A document header failed to serialize.
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ExportError {
    pub(crate) fn setup(path: impl Into<PathBuf>, reason: SinkError) -> Self {
        ExportError::Setup {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: SinkError) -> Self {
        ExportError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<SourceError> for ExportError {
    fn from(e: SourceError) -> Self {
        ExportError::Source(e.to_string())
    }
}
