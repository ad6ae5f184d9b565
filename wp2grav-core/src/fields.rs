//! Conversion of plugin-supplied custom fields into Grav field descriptors.
//!
//! Two mappers live here. [`map_field`] turns one custom field *value*
//! (attached to an entity) into the YAML descriptor that lands under the
//! page's reserved `wp.meta.acf` namespace, together with any media
//! sidecar and pending asset copy it implies. [`schema_field`] turns one
//! content-type *schema* kind into the form field descriptor that lands in
//! the type's blueprint. Both are pure: no I/O happens during mapping,
//! byte copies are executed later against the sink.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::assets::{AssetMapping, AssetRelocator};
use crate::contract::CustomFieldRecord;
use crate::document::yaml_str;

/// Content-type features WordPress itself defines. Schema kinds outside
/// this set were registered by plugins and go on the blueprint's second
/// tab.
const CORE_FEATURES: &[&str] = &[
    "title",
    "editor",
    "author",
    "thumbnail",
    "excerpt",
    "trackbacks",
    "custom-fields",
    "comments",
    "revisions",
    "page-attributes",
    "post-formats",
];

/// The closed set of custom field kinds the mapper understands. Anything
/// else is carried as `Other` and exported as an explicit unmapped marker
/// instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Number,
    Range,
    File,
    Image,
    Other(String),
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        match s {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "email" => FieldKind::Email,
            "number" => FieldKind::Number,
            "range" => FieldKind::Range,
            "file" => FieldKind::File,
            "image" => FieldKind::Image,
            other => {
                warn!(kind = other, "Unknown custom field kind, exporting as unmapped");
                FieldKind::Other(other.to_string())
            }
        }
    }
}

/// A custom field after mapping: the descriptor to place in the page
/// header, plus the media sidecar and pending copy for file-backed kinds.
#[derive(Debug, Clone)]
pub struct MappedField {
    pub name: String,
    pub descriptor: Value,
    pub sidecar: Option<MediaSidecar>,
    pub copy: Option<AssetMapping>,
}

/// Companion metadata file written next to a relocated media asset.
#[derive(Debug, Clone)]
pub struct MediaSidecar {
    /// Destination relative to the run root, `<asset path>.meta.yaml`.
    pub dest_rel: PathBuf,
    pub content: String,
}

/// Maps one custom field record to its Grav descriptor.
///
/// Returns `None` when the field should be omitted: value absent or empty
/// (a numeric zero is a value and survives), or a file-backed field whose
/// value lacks the required `url`/`filename` sub-values or points outside
/// the site's upload tree.
pub fn map_field(record: &CustomFieldRecord, relocator: &AssetRelocator) -> Option<MappedField> {
    if !has_value(&record.value) {
        return None;
    }
    match FieldKind::from(record.kind.as_str()) {
        FieldKind::Text | FieldKind::Textarea | FieldKind::Email | FieldKind::Number => {
            Some(scalar_field(record))
        }
        FieldKind::Range => Some(range_field(record)),
        FieldKind::File | FieldKind::Image => media_field(record, relocator),
        FieldKind::Other(kind) => Some(unmapped_field(record, &kind)),
    }
}

/// Whether a field value counts as present. Null and empty strings,
/// lists and mappings are absent; zero and false are real values.
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Sequence(s) => !s.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        _ => true,
    }
}

fn scalar_field(record: &CustomFieldRecord) -> MappedField {
    let meta = presentation(record);
    let descriptor = if meta.is_empty() {
        record.value.clone()
    } else {
        let mut wrapped = Mapping::new();
        wrapped.insert(yaml_str("value"), record.value.clone());
        for (key, value) in meta {
            wrapped.insert(key, value);
        }
        Value::Mapping(wrapped)
    };
    MappedField {
        name: record.name.clone(),
        descriptor,
        sidecar: None,
        copy: None,
    }
}

fn range_field(record: &CustomFieldRecord) -> MappedField {
    let mut descriptor = Mapping::new();
    descriptor.insert(yaml_str("value"), record.value.clone());
    if let Some(min) = record.min {
        descriptor.insert(yaml_str("min"), Value::from(min));
    }
    if let Some(max) = record.max {
        descriptor.insert(yaml_str("max"), Value::from(max));
    }
    if let Some(step) = record.step {
        descriptor.insert(yaml_str("step"), Value::from(step));
    }
    for (key, value) in presentation(record) {
        descriptor.insert(key, value);
    }
    MappedField {
        name: record.name.clone(),
        descriptor: Value::Mapping(descriptor),
        sidecar: None,
        copy: None,
    }
}

fn media_field(record: &CustomFieldRecord, relocator: &AssetRelocator) -> Option<MappedField> {
    let value = record.value.as_mapping()?;
    let url = str_entry(value, "url")?;
    let filename = str_entry(value, "filename")?;
    let Some(mapping) = relocator.resolve(&url) else {
        debug!(
            field = %record.name,
            url = %url,
            "File field points outside the upload tree, omitting"
        );
        return None;
    };

    let mut descriptor = Mapping::new();
    descriptor.insert(yaml_str("name"), yaml_str(&filename));
    if let Some(mime) = str_entry(value, "mime_type") {
        descriptor.insert(yaml_str("type"), yaml_str(mime));
    }
    if let Some(size) = value.get(&yaml_str("filesize")).and_then(|v| v.as_u64()) {
        descriptor.insert(yaml_str("size"), Value::from(size));
    }
    descriptor.insert(yaml_str("path"), yaml_str(mapping.grav_file_path()));

    // Grav reads alt/title text from a .meta.yaml next to the asset; the
    // filename stands in when the source has no alt text.
    let alt = str_entry(value, "alt")
        .filter(|alt| !alt.is_empty())
        .unwrap_or_else(|| filename.clone());
    let title = str_entry(value, "title").unwrap_or_default();
    let sidecar = MediaSidecar {
        dest_rel: PathBuf::from(format!("{}.meta.yaml", mapping.dest_rel.display())),
        content: format!("image:\nalt_text: '{alt}'\ntitle_text: '{title}'\n"),
    };

    Some(MappedField {
        name: record.name.clone(),
        descriptor: Value::Mapping(descriptor),
        sidecar: Some(sidecar),
        copy: Some(mapping),
    })
}

fn unmapped_field(record: &CustomFieldRecord, kind: &str) -> MappedField {
    let mut descriptor = Mapping::new();
    descriptor.insert(
        yaml_str("error"),
        yaml_str(format!("Missing field definition: {kind}")),
    );
    descriptor.insert(yaml_str("kind"), yaml_str(kind));
    descriptor.insert(yaml_str("value"), record.value.clone());
    MappedField {
        name: record.name.clone(),
        descriptor: Value::Mapping(descriptor),
        sidecar: None,
        copy: None,
    }
}

/// Label, help, default and required flag, when the record carries them.
/// The required flag is only written when explicitly true.
fn presentation(record: &CustomFieldRecord) -> Mapping {
    let mut meta = Mapping::new();
    if let Some(label) = &record.label {
        meta.insert(yaml_str("label"), yaml_str(label));
    }
    if let Some(help) = &record.instructions {
        meta.insert(yaml_str("help"), yaml_str(help));
    }
    if let Some(default) = &record.default {
        meta.insert(yaml_str("default"), default.clone());
    }
    if record.required {
        meta.insert(yaml_str("required"), Value::Bool(true));
    }
    meta
}

fn str_entry(map: &Mapping, key: &str) -> Option<String> {
    map.get(&yaml_str(key))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

/// Maps one content-type schema kind to a blueprint form field keyed
/// `header.<kind>`. Comment and revision bookkeeping never become fields.
pub fn schema_field(kind: &str) -> Option<(String, Value)> {
    match kind {
        "comments" | "revisions" => None,
        "thumbnail" | "image" => {
            let mut descriptor = Mapping::new();
            descriptor.insert(yaml_str("type"), yaml_str("file"));
            descriptor.insert(yaml_str("label"), yaml_str(kind));
            descriptor.insert(
                yaml_str("destination"),
                yaml_str("user/data/wp-content/uploads"),
            );
            descriptor.insert(
                yaml_str("accept"),
                Value::Sequence(vec![yaml_str("image/*")]),
            );
            Some((format!("header.{kind}"), Value::Mapping(descriptor)))
        }
        _ => {
            let mut descriptor = Mapping::new();
            descriptor.insert(yaml_str("type"), yaml_str("text"));
            descriptor.insert(yaml_str("label"), yaml_str(kind));
            descriptor.insert(
                yaml_str("help"),
                yaml_str(format!("Help description for {kind}")),
            );
            Some((format!("header.{kind}"), Value::Mapping(descriptor)))
        }
    }
}

/// Whether a schema kind is part of WordPress's own feature set, as
/// opposed to one registered by a plugin.
pub fn is_core_feature(kind: &str) -> bool {
    CORE_FEATURES.contains(&kind)
}
