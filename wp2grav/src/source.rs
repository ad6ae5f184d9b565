//! JSON snapshot implementation of the content source.
//!
//! The exporter does not query a live WordPress install. It reads one JSON
//! snapshot file holding everything a run needs: site info, roles, users,
//! post types with their schemas, posts and their custom field records.
//! The snapshot is converted into the engine's typed records eagerly at
//! load time, so malformed records fail the run immediately instead of
//! surfacing halfway through an export.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use wp2grav_core::contract::{
    ContentSource, CustomFieldRecord, EntityStatus, SiteInfo, SourceEntity, SourceError,
    SourceRole, SourceUser,
};

/// Timestamp format WordPress stores post dates in.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed snapshot record: post {id} has an invalid {field}: {reason}")]
    MalformedRecord {
        id: u64,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct SnapshotData {
    site: SiteInfo,
    #[serde(default)]
    roles: Vec<SourceRole>,
    #[serde(default)]
    users: Vec<SourceUser>,
    #[serde(default)]
    post_types: Vec<PostTypeRecord>,
    #[serde(default)]
    posts: Vec<PostRecord>,
    /// Custom field records keyed by post id.
    #[serde(default)]
    custom_fields: HashMap<String, Vec<CustomFieldRecord>>,
}

#[derive(Debug, Deserialize)]
struct PostTypeRecord {
    key: String,
    #[serde(default)]
    supports: Vec<SchemaEntry>,
}

#[derive(Debug, Deserialize)]
struct SchemaEntry {
    kind: String,
    #[serde(default = "default_true")]
    enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Raw post shape in the snapshot; converted to [`SourceEntity`] at load.
#[derive(Debug, Deserialize)]
struct PostRecord {
    id: u64,
    #[serde(default)]
    slug: Option<String>,
    #[serde(rename = "type")]
    type_key: String,
    status: String,
    title: String,
    guid: String,
    #[serde(default)]
    body: String,
    date: String,
    modified: String,
    author_id: u64,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    meta: serde_yaml::Mapping,
    #[serde(default)]
    media: Vec<String>,
}

/// Content source backed by one JSON snapshot file, fully loaded and
/// validated up front.
#[derive(Debug)]
pub struct JsonSnapshot {
    site: SiteInfo,
    roles: Vec<SourceRole>,
    users: Vec<SourceUser>,
    types: Vec<(String, Vec<(String, bool)>)>,
    posts: Vec<SourceEntity>,
    custom_fields: HashMap<String, Vec<CustomFieldRecord>>,
}

impl JsonSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        info!(snapshot = %path.display(), "Loading content snapshot");
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data: SnapshotData =
            serde_json::from_str(&raw).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut types = Vec::new();
        for record in data.post_types {
            // Attachments are media bookkeeping, not content.
            if record.key == "attachment" {
                debug!("Snapshot lists the attachment type, excluding it");
                continue;
            }
            let schema = record
                .supports
                .into_iter()
                .map(|entry| (entry.kind, entry.enabled))
                .collect();
            types.push((record.key, schema));
        }

        let mut posts = Vec::new();
        for record in data.posts {
            posts.push(convert_post(record)?);
        }

        info!(
            roles = data.roles.len(),
            users = data.users.len(),
            post_types = types.len(),
            posts = posts.len(),
            "Snapshot loaded"
        );
        Ok(JsonSnapshot {
            site: data.site,
            roles: data.roles,
            users: data.users,
            types,
            posts,
            custom_fields: data.custom_fields,
        })
    }
}

fn convert_post(record: PostRecord) -> Result<SourceEntity, SnapshotError> {
    let date = parse_datetime(record.id, "date", &record.date)?;
    let modified = parse_datetime(record.id, "modified", &record.modified)?;
    Ok(SourceEntity {
        id: record.id,
        slug: record.slug,
        type_key: record.type_key,
        status: EntityStatus::from(record.status.as_str()),
        title: record.title,
        guid: record.guid,
        body: record.body,
        date,
        modified,
        author_id: record.author_id,
        author: record.author,
        excerpt: record.excerpt,
        categories: record.categories,
        tags: record.tags,
        meta: record.meta,
        media: record.media,
    })
}

fn parse_datetime(
    id: u64,
    field: &'static str,
    raw: &str,
) -> Result<NaiveDateTime, SnapshotError> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).map_err(|e| SnapshotError::MalformedRecord {
        id,
        field,
        reason: e.to_string(),
    })
}

#[async_trait]
impl ContentSource for JsonSnapshot {
    async fn site_info(&self) -> Result<SiteInfo, SourceError> {
        Ok(self.site.clone())
    }

    async fn list_roles(&self) -> Result<Vec<SourceRole>, SourceError> {
        Ok(self.roles.clone())
    }

    async fn list_users(&self) -> Result<Vec<SourceUser>, SourceError> {
        Ok(self.users.clone())
    }

    async fn list_content_types(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.types.iter().map(|(key, _)| key.clone()).collect())
    }

    async fn list_entities(&self, type_key: &str) -> Result<Vec<SourceEntity>, SourceError> {
        Ok(self
            .posts
            .iter()
            .filter(|post| post.type_key == type_key)
            .cloned()
            .collect())
    }

    async fn field_schema(&self, type_key: &str) -> Result<Vec<(String, bool)>, SourceError> {
        Ok(self
            .types
            .iter()
            .find(|(key, _)| key == type_key)
            .map(|(_, schema)| schema.clone())
            .unwrap_or_default())
    }

    async fn custom_fields(
        &self,
        entity_id: u64,
    ) -> Result<Vec<CustomFieldRecord>, SourceError> {
        Ok(self
            .custom_fields
            .get(&entity_id.to_string())
            .cloned()
            .unwrap_or_default())
    }
}
