//! Assembly of the YAML documents Grav consumes.
//!
//! A [`Document`] is an insertion-ordered header mapping with an optional
//! body. Header order is what makes export runs reproducible and their
//! output diffable, so all assembly routines write keys in one fixed order
//! and rely on the mapping's overwrite-on-reinsert behavior to keep keys
//! unique. Pages serialize as `---` front-matter plus the Markdown body;
//! groups, accounts, blueprints and site config serialize as bare YAML,
//! which is the form Grav parses for its configuration files.

use std::collections::HashSet;

use serde_yaml::{Mapping, Value};

use crate::contract::{
    CustomFieldRecord, EntityStatus, SiteInfo, SourceEntity, SourceRole, SourceUser,
};
use crate::fields::MappedField;
use crate::naming;

/// Raw timestamp format used by the source, kept verbatim in headers.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Human-readable date shown on pages, e.g. `January 1, 2024`.
const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

/// Shorthand for a YAML string value.
pub fn yaml_str(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

/// One output document: an ordered header mapping plus an optional body.
#[derive(Debug, Clone, Default)]
pub struct Document {
    header: Mapping,
    body: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Sets a top-level header key, overwriting any earlier value.
    pub fn set(&mut self, key: &str, value: Value) {
        self.header.insert(yaml_str(key), value);
    }

    /// Sets a nested header key, creating intermediate mappings as needed.
    /// A non-mapping value in the way is replaced.
    pub fn set_path(&mut self, path: &[&str], value: Value) {
        if path.is_empty() {
            return;
        }
        let parent = descend(&mut self.header, &path[..path.len() - 1]);
        parent.insert(yaml_str(path[path.len() - 1]), value);
    }

    /// Appends to a sequence at a nested header key, creating it first if
    /// absent.
    pub fn push_path(&mut self, path: &[&str], value: Value) {
        if path.is_empty() {
            return;
        }
        let parent = descend(&mut self.header, &path[..path.len() - 1]);
        let key = yaml_str(path[path.len() - 1]);
        if !matches!(parent.get(&key), Some(Value::Sequence(_))) {
            parent.insert(key.clone(), Value::Sequence(Vec::new()));
        }
        if let Some(Value::Sequence(seq)) = parent.get_mut(&key) {
            seq.push(value);
        }
    }

    pub fn set_body(&mut self, body: String) {
        self.body = Some(body);
    }

    pub fn header(&self) -> &Mapping {
        &self.header
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Serializes the header as a bare YAML document, the form Grav reads
    /// for accounts, groups and configuration.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.header)
    }

    /// Serializes as `---` delimited front-matter followed by the body,
    /// the form Grav reads for pages.
    pub fn to_frontmatter(&self) -> Result<String, serde_yaml::Error> {
        let header = serde_yaml::to_string(&self.header)?;
        let mut out = format!("---\n{header}---\n");
        if let Some(body) = &self.body {
            out.push_str(body);
            if !body.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Walks `path` inside `root`, creating intermediate mappings, and returns
/// the innermost mapping.
fn descend<'a>(root: &'a mut Mapping, path: &[&str]) -> &'a mut Mapping {
    let mut current = root;
    for segment in path {
        let key = yaml_str(*segment);
        if !matches!(current.get(&key), Some(Value::Mapping(_))) {
            current.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        current = match current.get_mut(&key) {
            Some(Value::Mapping(next)) => next,
            _ => unreachable!("intermediate mapping was just inserted"),
        };
    }
    current
}

/// Builds the groups.yaml entry for one role: `(group_key, entry)`.
///
/// The `administrator` role additionally receives admin panel access.
pub fn group_entry(role: &SourceRole) -> (String, Value) {
    let normalized = naming::grav_role(&role.key);
    let mut entry = Mapping::new();
    entry.insert(yaml_str("icon"), yaml_str("cog"));
    entry.insert(
        yaml_str("readableName"),
        yaml_str(naming::grav_role(&role.label)),
    );
    entry.insert(
        yaml_str("description"),
        yaml_str(format!("Exported Wordpress role {normalized}")),
    );

    let mut site = Mapping::new();
    site.insert(yaml_str("login"), Value::Bool(true));
    let mut access = Mapping::new();
    access.insert(yaml_str("site"), Value::Mapping(site));
    if role.key == "administrator" {
        let mut admin = Mapping::new();
        admin.insert(yaml_str("login"), Value::Bool(true));
        admin.insert(yaml_str("super"), Value::Bool(true));
        access.insert(yaml_str("admin"), Value::Mapping(admin));
    }
    entry.insert(yaml_str("access"), Value::Mapping(access));

    (naming::grav_group_key(&role.key), Value::Mapping(entry))
}

/// The synthetic group every exported account joins, so imported users can
/// log in even when their role grants nothing else.
pub fn authenticated_group_entry() -> (String, Value) {
    let mut entry = Mapping::new();
    entry.insert(yaml_str("icon"), yaml_str("cog"));
    entry.insert(yaml_str("readableName"), yaml_str("Authenticated_User"));
    entry.insert(
        yaml_str("description"),
        yaml_str("Exported Wordpress role authenticated_user"),
    );
    let mut site = Mapping::new();
    site.insert(yaml_str("login"), Value::Bool(true));
    let mut access = Mapping::new();
    access.insert(yaml_str("site"), Value::Mapping(site));
    entry.insert(yaml_str("access"), Value::Mapping(access));

    (naming::AUTHENTICATED_GROUP.to_string(), Value::Mapping(entry))
}

/// Builds one Grav account document. Profile keys the source did not
/// provide are omitted rather than written empty.
pub fn account_document(
    user: &SourceUser,
    language: &str,
    groups: &[String],
    password: &str,
) -> Document {
    let mut doc = Document::new();
    doc.set("email", yaml_str(&user.email));
    doc.set_path(&["wp", "id"], Value::from(user.id));
    if let Some(url) = &user.url {
        doc.set_path(&["wp", "user_url"], yaml_str(url));
    }
    if let Some(display_name) = &user.display_name {
        doc.set_path(&["wp", "display_name"], yaml_str(display_name));
    }
    if let Some(nickname) = &user.nickname {
        doc.set_path(&["wp", "nickname"], yaml_str(nickname));
    }
    if let Some(description) = &user.description {
        doc.set_path(&["wp", "description"], yaml_str(description));
    }
    if let Some(first_name) = &user.first_name {
        doc.set_path(&["wp", "first_name"], yaml_str(first_name));
    }
    if let Some(last_name) = &user.last_name {
        doc.set_path(&["wp", "last_name"], yaml_str(last_name));
    }

    let fullname = user
        .nickname
        .clone()
        .or_else(|| user.display_name.clone())
        .unwrap_or_else(|| user.login.clone());
    doc.set("fullname", yaml_str(fullname));
    doc.set("title", Value::Null);
    doc.set("state", yaml_str("enabled"));
    doc.set("language", yaml_str(language));
    doc.set(
        "groups",
        Value::Sequence(groups.iter().map(yaml_str).collect()),
    );
    doc.set("password", yaml_str(password));
    doc
}

/// Builds the blueprint document for one content type. With no fields at
/// all, the document is just the title, without an empty form section.
pub fn blueprint_document(
    type_key: &str,
    content_fields: &[(String, Value)],
    extra_fields: &[(String, Value)],
) -> Document {
    let mut doc = Document::new();
    doc.set("title", yaml_str(type_key));
    if content_fields.is_empty() && extra_fields.is_empty() {
        return doc;
    }

    let mut tab_entries = Mapping::new();
    if !content_fields.is_empty() {
        tab_entries.insert(yaml_str("content"), tab("Content", content_fields));
    }
    if !extra_fields.is_empty() {
        tab_entries.insert(yaml_str("wordpress"), tab("Plugin Fields", extra_fields));
    }

    let mut tabs = Mapping::new();
    tabs.insert(yaml_str("type"), yaml_str("tabs"));
    tabs.insert(yaml_str("active"), Value::from(1));
    tabs.insert(yaml_str("fields"), Value::Mapping(tab_entries));

    let mut form_fields = Mapping::new();
    form_fields.insert(yaml_str("tabs"), Value::Mapping(tabs));
    let mut form = Mapping::new();
    form.insert(yaml_str("fields"), Value::Mapping(form_fields));
    doc.set("form", Value::Mapping(form));
    doc
}

fn tab(title: &str, fields: &[(String, Value)]) -> Value {
    let mut entries = Mapping::new();
    for (key, descriptor) in fields {
        entries.insert(yaml_str(key), descriptor.clone());
    }
    let mut tab = Mapping::new();
    tab.insert(yaml_str("type"), yaml_str("tab"));
    tab.insert(yaml_str("title"), yaml_str(title));
    tab.insert(yaml_str("fields"), Value::Mapping(entries));
    Value::Mapping(tab)
}

/// Builds the front-matter document for one entity.
///
/// Raw post metadata comes first under `wp.meta`, minus the keys shadowed
/// by custom field records (the plugin stores both `<name>` and `_<name>`
/// alongside its own records); the mapped custom fields follow under the
/// reserved `wp.meta.acf` namespace so they can never collide with system
/// keys.
pub fn page_document(
    entity: &SourceEntity,
    custom: &[CustomFieldRecord],
    mapped: &[MappedField],
    body: String,
) -> Document {
    let mut doc = Document::new();

    let shadowed: HashSet<String> = custom
        .iter()
        .flat_map(|record| [record.name.clone(), format!("_{}", record.name)])
        .collect();
    for (key, value) in &entity.meta {
        let Some(name) = key.as_str() else { continue };
        if shadowed.contains(name) {
            continue;
        }
        doc.set_path(&["wp", "meta", name], value.clone());
    }
    for field in mapped {
        doc.set_path(&["wp", "meta", "acf", field.name.as_str()], field.descriptor.clone());
    }

    doc.set_path(&["wp", "post", "ID"], Value::from(entity.id));
    doc.set_path(&["wp", "post", "guid"], yaml_str(&entity.guid));
    doc.set("title", yaml_str(&entity.title));
    doc.set(
        "modified",
        yaml_str(entity.modified.format(DATETIME_FORMAT).to_string()),
    );
    doc.set(
        "date",
        yaml_str(entity.date.format(DISPLAY_DATE_FORMAT).to_string()),
    );

    let publish_date = entity.date.format(DATETIME_FORMAT).to_string();
    match entity.status {
        EntityStatus::Publish => {
            doc.set("publish_date", yaml_str(&publish_date));
            doc.set("published", Value::Bool(true));
        }
        EntityStatus::Future => {
            doc.set("published", Value::Bool(false));
            doc.set("publish_date", yaml_str(&publish_date));
        }
        _ => {
            doc.set("published", Value::Bool(false));
        }
    }

    doc.set_path(&["wp", "post", "author_id"], Value::from(entity.author_id));
    if let Some(author) = &entity.author {
        doc.set_path(&["wp", "post", "author"], yaml_str(author));
    }
    if let Some(excerpt) = &entity.excerpt {
        doc.set_path(&["wp", "post", "excerpt"], yaml_str(excerpt));
    }

    for category in &entity.categories {
        doc.push_path(&["taxonomy", "category"], yaml_str(category));
    }
    for tag in &entity.tags {
        doc.push_path(&["taxonomy", "tag"], yaml_str(tag));
    }

    doc.set_body(body);
    doc
}

/// Builds config/site.yaml from the source's blog info.
pub fn site_document(site: &SiteInfo, author_name: &str) -> Document {
    let mut doc = Document::new();
    doc.set("title", yaml_str(&site.title));
    doc.set_path(&["author", "name"], yaml_str(author_name));
    doc.set_path(&["author", "email"], yaml_str(&site.admin_email));
    if let Some(description) = &site.description {
        doc.set_path(&["metadata", "description"], yaml_str(description));
    }
    doc
}
