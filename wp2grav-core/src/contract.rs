#![allow(unused)]

//! # contract: interfaces between the export engine and its collaborators
//!
//! This module defines the two traits the export pipelines are written
//! against, plus the plain data records that cross those boundaries:
//!
//! - [`ContentSource`]: read-only access to the WordPress side: site info,
//!   roles, users, content types with their field schemas, entities and
//!   their plugin-supplied custom fields.
//! - [`Sink`]: write access to the export tree: documents, directories and
//!   byte-for-byte asset copies, all addressed relative to the run root.
//!
//! ## Interface & Extensibility
//! - All methods are async, returning results with boxed error types, so a
//!   source can be a live database, an HTTP API or a file snapshot without
//!   the engine caring.
//! - Error handling is uniform: collaborators convert their upstream errors
//!   into boxed trait objects; the pipelines translate those into the
//!   engine's own error taxonomy.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so the pipeline tests drive
//!   deterministic mocks instead of a real WordPress install or filesystem.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};

/// Error type for content source failures (boxed, like the sink's).
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for sink failures.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Blog-level information used for the site configuration export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub admin_email: String,
    /// Display name of the primary admin; absent sources fall back to a
    /// generic author name at export time.
    #[serde(default)]
    pub admin_name: Option<String>,
}

/// A WordPress role as the source reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRole {
    /// Role key, e.g. `administrator` or `Site Editors`.
    pub key: String,
    /// Human-readable role label.
    pub label: String,
}

/// A WordPress user record. Only `id`, `login` and `email` are required;
/// everything else is profile metadata that may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUser {
    pub id: u64,
    pub login: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// WordPress locale such as `de_DE`; absent means the site default.
    #[serde(default)]
    pub locale: Option<String>,
    /// Role keys this user holds, in source order.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Publication state of an entity. Anything the source reports beyond the
/// enumerated states is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityStatus {
    Publish,
    Future,
    Draft,
    Trash,
    Other(String),
}

impl From<&str> for EntityStatus {
    fn from(s: &str) -> Self {
        match s {
            "publish" => EntityStatus::Publish,
            "future" => EntityStatus::Future,
            "draft" => EntityStatus::Draft,
            "trash" => EntityStatus::Trash,
            other => EntityStatus::Other(other.to_string()),
        }
    }
}

/// A single post/page/custom-type entity with everything the page export
/// needs: identity, publication state, raw HTML body, taxonomy terms, raw
/// post metadata and the URLs of media attached to it.
#[derive(Debug, Clone)]
pub struct SourceEntity {
    pub id: u64,
    /// URL slug. Entities without one cannot become pages and are skipped.
    pub slug: Option<String>,
    pub type_key: String,
    pub status: EntityStatus,
    pub title: String,
    pub guid: String,
    /// Post body as stored by the source (HTML).
    pub body: String,
    pub date: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub author_id: u64,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    /// Category term names, in source order (duplicates preserved).
    pub categories: Vec<String>,
    /// Tag term names, in source order.
    pub tags: Vec<String>,
    /// Raw post metadata, order preserved.
    pub meta: serde_yaml::Mapping,
    /// URLs of media attached to this entity.
    pub media: Vec<String>,
}

/// One plugin-supplied custom field attached to an entity, as declared by
/// the source: the raw kind tag plus value and presentation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFieldRecord {
    pub name: String,
    /// Declared field kind, e.g. `text`, `image`, or anything a plugin
    /// invented.
    pub kind: String,
    #[serde(default)]
    pub value: serde_yaml::Value,
    #[serde(default)]
    pub label: Option<String>,
    /// Help text shown alongside the field in the source's edit UI.
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    /// Declared default value, carried alongside the presentation metadata.
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

/// Read side of the export: everything the pipelines pull out of WordPress.
///
/// Implementations own the source records; the engine only borrows them for
/// the duration of a run. The trait is implemented by real query layers and
/// by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Blog title, description and admin identity.
    async fn site_info(&self) -> Result<SiteInfo, SourceError>;

    /// All roles, in a stable source order.
    async fn list_roles(&self) -> Result<Vec<SourceRole>, SourceError>;

    /// All users, in a stable source order.
    async fn list_users(&self) -> Result<Vec<SourceUser>, SourceError>;

    /// All exportable content type keys. The built-in `attachment` type is
    /// media bookkeeping, not content, and must never be included.
    async fn list_content_types(&self) -> Result<Vec<String>, SourceError>;

    /// Entities of one content type, drafts and scheduled posts included.
    async fn list_entities(&self, type_key: &str) -> Result<Vec<SourceEntity>, SourceError>;

    /// The field schema of a content type as ordered `(kind, enabled)`
    /// pairs. Unknown types yield an empty schema.
    async fn field_schema(&self, type_key: &str) -> Result<Vec<(String, bool)>, SourceError>;

    /// Custom field records for one entity. Empty when the entity has none
    /// or when no custom-fields extension is active on the source.
    async fn custom_fields(&self, entity_id: u64)
        -> Result<Vec<CustomFieldRecord>, SourceError>;
}

/// Write side of the export. All paths are relative to the run root except
/// the asset source path, which is absolute on the machine holding the
/// WordPress content directory.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Sink: Send + Sync {
    /// Persist one document, creating parent directories as needed.
    async fn write(&self, rel_path: &Path, bytes: &[u8]) -> Result<(), SinkError>;

    /// Create a directory (and parents) under the run root.
    async fn ensure_directory(&self, rel_path: &Path) -> Result<(), SinkError>;

    /// Copy one binary asset into the export tree.
    async fn copy_asset(&self, source: &Path, dest_rel: &Path) -> Result<(), SinkError>;
}
