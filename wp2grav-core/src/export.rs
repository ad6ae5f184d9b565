//! # Export pipelines: WordPress records → Grav export tree
//!
//! One routine per export target, each drivable on its own or through
//! [`export_all`] which runs them in dependency order (roles strictly
//! before accounts, since accounts reference the generated group keys).
//!
//! Every pipeline follows the same shape:
//!
//! 1. Pull the records it needs from the [`ContentSource`].
//! 2. Map them through the naming / field / document layers.
//! 3. Persist the results through the [`Sink`], strictly sequentially.
//!
//! Failures that make the target unusable (source errors, directory
//! setup, document writes, empty record sets for targets that need them)
//! abort with an [`ExportError`]. Local conditions (an entity without a
//! slug, a media file that cannot be copied, an unknown field kind) are
//! logged and the run continues, so one broken record never sinks a
//! migration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng};
use serde_yaml::Mapping;
use tracing::{debug, error, info, warn};

use crate::assets::{AssetMapping, MediaReference};
use crate::config::ExportConfig;
use crate::contract::{ContentSource, EntityStatus, Sink};
use crate::document::{self, yaml_str, Document};
use crate::error::ExportError;
use crate::fields::{self, MappedField};
use crate::naming;
use crate::render;

/// Length of the generated placeholder password on exported accounts.
const PASSWORD_LENGTH: usize = 16;

/// Raw trailer Grav expects at the end of an account file, appended
/// outside the structured YAML body.
const LOGIN_ATTEMPTS_TRAILER: &str = "login_attempts: {  }";

/// Static passthrough template written for every exported content type.
const PASSTHROUGH_TEMPLATE: &str = "\
{% extends 'partials/base.html.twig' %}

{% block content %}
    {{ page.content|raw }}
{% endblock %}
";

#[derive(Debug, Clone, Default)]
pub struct RolesReport {
    /// Group keys written to groups.yaml, synthetic entry included.
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UsersReport {
    /// Normalized account usernames, one per written account file.
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostTypesReport {
    /// Content types that received a blueprint and template.
    pub post_types: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostsReport {
    /// Slugs of the written pages, in export order.
    pub pages: Vec<String>,
    /// Entities skipped for lack of a slug.
    pub skipped: usize,
    /// Media assets copied into the data tree.
    pub assets: usize,
}

#[derive(Debug, Clone)]
pub struct SiteReport {
    pub title: String,
}

/// Combined report of a full export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub roles: RolesReport,
    pub users: UsersReport,
    pub post_types: PostTypesReport,
    pub posts: PostsReport,
    pub site: SiteReport,
}

/// Exports all roles as one groups.yaml, appending the synthetic
/// authenticated-user group after the role-derived entries.
pub async fn export_roles<S, K>(source: &S, sink: &K) -> Result<RolesReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting role export");
    let roles = source.list_roles().await?;
    sink.ensure_directory(Path::new("config"))
        .await
        .map_err(|e| ExportError::setup("config", e))?;

    let mut groups = Mapping::new();
    for role in &roles {
        let (key, entry) = document::group_entry(role);
        debug!(role = %role.key, group = %key, "Mapped role to group");
        groups.insert(yaml_str(&key), entry);
    }
    let (auth_key, auth_entry) = document::authenticated_group_entry();
    groups.insert(yaml_str(&auth_key), auth_entry);

    let keys: Vec<String> = groups
        .keys()
        .filter_map(|key| key.as_str().map(str::to_owned))
        .collect();
    let text = serde_yaml::to_string(&groups)?;
    let path = Path::new("config/groups.yaml");
    sink.write(path, text.as_bytes())
        .await
        .map_err(|e| ExportError::write(path, e))?;

    info!(groups = keys.len(), "Role export complete");
    Ok(RolesReport { groups: keys })
}

/// Exports all users as Grav account files under `accounts/`.
///
/// Distinct logins can normalise to the same account name; that collision
/// is warned about and the later account overwrites the earlier one, so
/// the export never silently drops a user without a trace in the log.
pub async fn export_users<S, K>(source: &S, sink: &K) -> Result<UsersReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting user export");
    let users = source.list_users().await?;
    if users.is_empty() {
        error!("Source returned no users");
        return Err(ExportError::EmptySet("users"));
    }
    sink.ensure_directory(Path::new("accounts"))
        .await
        .map_err(|e| ExportError::setup("accounts", e))?;

    let mut report = UsersReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    for user in &users {
        let username = naming::grav_username(&user.login, user.id);
        if !seen.insert(username.clone()) {
            warn!(
                username = %username,
                login = %user.login,
                "Normalized username collides with an earlier account"
            );
        }

        let language = grav_language(user.locale.as_deref());
        let mut groups: Vec<String> =
            user.roles.iter().map(|role| naming::grav_group_key(role)).collect();
        groups.push(naming::AUTHENTICATED_GROUP.to_string());
        let password = generate_password(PASSWORD_LENGTH);

        let account = document::account_document(user, &language, &groups, &password);
        let mut text = account.to_yaml()?;
        text.push_str(LOGIN_ATTEMPTS_TRAILER);

        let path = PathBuf::from("accounts").join(format!("{username}.yaml"));
        sink.write(&path, text.as_bytes())
            .await
            .map_err(|e| ExportError::write(&path, e))?;
        debug!(account = %path.display(), "Wrote account");
        report.accounts.push(username);
    }

    info!(accounts = report.accounts.len(), "User export complete");
    Ok(report)
}

/// Exports every content type as a theme blueprint plus a static
/// passthrough template, along with the theme's own metadata files.
pub async fn export_post_types<S, K>(
    source: &S,
    sink: &K,
    config: &ExportConfig,
) -> Result<PostTypesReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting post type export");
    let types = source.list_content_types().await?;
    if types.is_empty() {
        error!("Source returned no post types");
        return Err(ExportError::EmptySet("post types"));
    }

    let theme_dir = PathBuf::from("themes").join(&config.theme);
    let blueprints_dir = theme_dir.join("blueprints");
    let templates_dir = theme_dir.join("templates");
    for dir in [&blueprints_dir, &templates_dir] {
        sink.ensure_directory(dir)
            .await
            .map_err(|e| ExportError::setup(dir, e))?;
    }

    let meta_path = theme_dir.join("blueprints.yaml");
    sink.write(&meta_path, theme_blueprint(&config.theme).to_yaml()?.as_bytes())
        .await
        .map_err(|e| ExportError::write(&meta_path, e))?;
    let settings_path = theme_dir.join(format!("{}.yaml", config.theme));
    sink.write(&settings_path, theme_settings().to_yaml()?.as_bytes())
        .await
        .map_err(|e| ExportError::write(&settings_path, e))?;

    let mut report = PostTypesReport::default();
    for type_key in &types {
        let schema = source.field_schema(type_key).await?;
        let mut content_fields = Vec::new();
        let mut extra_fields = Vec::new();
        for (kind, enabled) in &schema {
            if !enabled {
                continue;
            }
            let Some(field) = fields::schema_field(kind) else { continue };
            if fields::is_core_feature(kind) {
                content_fields.push(field);
            } else {
                extra_fields.push(field);
            }
        }

        let blueprint = document::blueprint_document(type_key, &content_fields, &extra_fields);
        let path = blueprints_dir.join(format!("{type_key}.yaml"));
        sink.write(&path, blueprint.to_yaml()?.as_bytes())
            .await
            .map_err(|e| ExportError::write(&path, e))?;
        let template_path = templates_dir.join(format!("{type_key}.html.twig"));
        sink.write(&template_path, PASSTHROUGH_TEMPLATE.as_bytes())
            .await
            .map_err(|e| ExportError::write(&template_path, e))?;
        debug!(post_type = %type_key, "Wrote blueprint and template");
        report.post_types.push(type_key.clone());
    }

    info!(post_types = report.post_types.len(), "Post type export complete");
    Ok(report)
}

/// Exports entities of every content type as Grav pages, relocating the
/// media they reference (attached, embedded in the body, and carried by
/// file-backed custom fields) into the mirrored data tree.
///
/// `only_id` restricts the run to a single entity across all types.
pub async fn export_posts<S, K>(
    source: &S,
    sink: &K,
    config: &ExportConfig,
    only_id: Option<u64>,
) -> Result<PostsReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting post export");
    let relocator = config.relocator();
    sink.ensure_directory(Path::new("pages"))
        .await
        .map_err(|e| ExportError::setup("pages", e))?;

    let types = source.list_content_types().await?;
    let mut report = PostsReport::default();
    // Bookkeeping across the whole pass, so shared upload directories and
    // assets referenced from several pages are only handled once.
    let mut ensured_dirs: HashSet<PathBuf> = HashSet::new();
    let mut copied: HashSet<PathBuf> = HashSet::new();

    for type_key in &types {
        let entities = source.list_entities(type_key).await?;
        info!(post_type = %type_key, count = entities.len(), "Exporting entities");
        for entity in &entities {
            if let Some(only) = only_id {
                if entity.id != only {
                    continue;
                }
            }
            let Some(slug) = entity.slug.as_deref().filter(|s| !s.is_empty()) else {
                debug!(id = entity.id, "Entity has no slug, skipping");
                report.skipped += 1;
                continue;
            };

            let custom = source.custom_fields(entity.id).await?;
            let mapped: Vec<MappedField> = custom
                .iter()
                .filter_map(|record| fields::map_field(record, &relocator))
                .collect();
            let rendered = render::render_body(&entity.body, &relocator);

            let page_dir = if entity.status == EntityStatus::Trash {
                Path::new("pages").join("z_trashed").join(slug)
            } else {
                Path::new("pages").join(slug)
            };
            if ensured_dirs.insert(page_dir.clone()) {
                sink.ensure_directory(&page_dir)
                    .await
                    .map_err(|e| ExportError::setup(&page_dir, e))?;
            }

            let page = document::page_document(entity, &custom, &mapped, rendered.markdown);
            let path = page_dir.join(format!("{}.md", entity.type_key));
            sink.write(&path, page.to_frontmatter()?.as_bytes())
                .await
                .map_err(|e| ExportError::write(&path, e))?;

            let mut pending: Vec<AssetMapping> = Vec::new();
            for url in &entity.media {
                let media = MediaReference::parse(url);
                match relocator.resolve(&media.canonical) {
                    Some(mapping) => pending.push(mapping),
                    None => debug!(url = %url, "Attached media outside the upload tree, skipping"),
                }
            }
            pending.extend(rendered.copies);
            for field in &mapped {
                if let Some(copy) = &field.copy {
                    pending.push(copy.clone());
                }
            }

            for copy in pending {
                if !copied.insert(copy.dest_rel.clone()) {
                    continue;
                }
                if let Some(parent) = copy.dest_rel.parent() {
                    let parent = parent.to_path_buf();
                    if ensured_dirs.insert(parent.clone()) {
                        sink.ensure_directory(&parent)
                            .await
                            .map_err(|e| ExportError::setup(&parent, e))?;
                    }
                }
                match sink.copy_asset(&copy.source_path, &copy.dest_rel).await {
                    Ok(()) => report.assets += 1,
                    Err(e) => warn!(
                        error = %e,
                        asset = %copy.dest_rel.display(),
                        "Could not copy media asset, continuing"
                    ),
                }
            }
            for field in &mapped {
                if let Some(sidecar) = &field.sidecar {
                    if let Err(e) = sink.write(&sidecar.dest_rel, sidecar.content.as_bytes()).await
                    {
                        warn!(
                            error = %e,
                            path = %sidecar.dest_rel.display(),
                            "Could not write media sidecar, continuing"
                        );
                    }
                }
            }

            debug!(page = %path.display(), "Wrote page");
            report.pages.push(slug.to_string());
        }
    }

    info!(
        pages = report.pages.len(),
        skipped = report.skipped,
        assets = report.assets,
        "Post export complete"
    );
    Ok(report)
}

/// Exports the blog-level configuration as config/site.yaml.
pub async fn export_site<S, K>(source: &S, sink: &K) -> Result<SiteReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting site export");
    let site = source.site_info().await?;
    sink.ensure_directory(Path::new("config"))
        .await
        .map_err(|e| ExportError::setup("config", e))?;

    let author = site
        .admin_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Site Admin".to_string());
    let doc = document::site_document(&site, &author);
    let path = Path::new("config/site.yaml");
    sink.write(path, doc.to_yaml()?.as_bytes())
        .await
        .map_err(|e| ExportError::write(path, e))?;

    info!(title = %site.title, "Site export complete");
    Ok(SiteReport { title: site.title })
}

/// Runs every export target in dependency order.
pub async fn export_all<S, K>(
    source: &S,
    sink: &K,
    config: &ExportConfig,
) -> Result<ExportReport, ExportError>
where
    S: ContentSource,
    K: Sink,
{
    info!("Starting full export");
    let roles = export_roles(source, sink).await?;
    let users = export_users(source, sink).await?;
    let post_types = export_post_types(source, sink, config).await?;
    let posts = export_posts(source, sink, config, None).await?;
    let site = export_site(source, sink).await?;
    info!("Full export complete");
    Ok(ExportReport {
        roles,
        users,
        post_types,
        posts,
        site,
    })
}

/// Grav language code for a WordPress locale: the primary subtag,
/// lowercased, defaulting to `en`.
fn grav_language(locale: Option<&str>) -> String {
    locale
        .and_then(|l| l.split(['_', '-']).next())
        .filter(|subtag| !subtag.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "en".to_string())
}

fn generate_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn theme_blueprint(theme: &str) -> Document {
    let mut doc = Document::new();
    doc.set("name", yaml_str(theme));
    doc.set("version", yaml_str("1.0.0"));
    doc.set(
        "description",
        yaml_str("Theme generated from a WordPress export"),
    );
    doc
}

fn theme_settings() -> Document {
    let mut doc = Document::new();
    doc.set("enable", serde_yaml::Value::Bool(true));
    doc
}
