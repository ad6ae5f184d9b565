//! Conversion of entity bodies from WordPress HTML into page Markdown.
//!
//! The conversion is deliberately minimal: the common WordPress markup
//! (headings, paragraphs, hard breaks, lists, emphasis, links, images)
//! becomes Markdown, a handful of HTML entities are decoded, and whatever
//! markup remains is stripped so no raw tags leak into pages. Before
//! converting, every embedded image reference is collected so sized
//! derivatives can be rewritten to their full-size original with a
//! `?resize=W,H` query, and so the referenced files can be scheduled for
//! relocation into the export tree.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::assets::{AssetMapping, AssetRelocator, MediaReference};

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+src="([^">]+)""#).unwrap());

static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img[^>]*>").unwrap());

static ALT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)alt="([^"]*)""#).unwrap());

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a[^>]*href="([^">]+)"[^>]*>(.*?)</a>"#).unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static EXTRA_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Result of rendering one body: the Markdown text plus the asset copies
/// the body references. Copies are pending work for the caller; rendering
/// itself does no I/O.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub markdown: String,
    pub copies: Vec<AssetMapping>,
}

/// Renders one HTML body to Markdown, rewriting upload references.
///
/// Sized image derivatives (`photo-300x200.jpg`) become the full-size
/// original with the dimensions preserved as a query
/// (`photo.jpg?resize=300,200`); every reference into the source's upload
/// tree is rewritten to the relocated `user://data` form. References
/// outside the upload tree are left untouched. Plain-text bodies pass
/// through unharmed.
pub fn render_body(html: &str, relocator: &AssetRelocator) -> Rendered {
    let references: Vec<String> = IMG_SRC_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect();

    let mut markdown = html_to_markdown(html);
    let mut copies = Vec::new();
    for reference in references {
        let media = MediaReference::parse(&reference);
        let Some(mapping) = relocator.resolve(&media.canonical) else {
            debug!(url = %reference, "Embedded image outside the upload tree, leaving as-is");
            continue;
        };
        if let Some((width, height)) = media.dimensions() {
            let resized = format!("{}?resize={},{}", media.canonical, width, height);
            markdown = markdown.replace(&media.original, &resized);
        }
        copies.push(mapping);
    }

    // Any remaining reference into the upload tree, images and document
    // links alike, now points at the relocated data directory.
    markdown = markdown.replace(&relocator.uploads_url(), relocator.grav_uploads_ref());

    Rendered { markdown, copies }
}

fn html_to_markdown(html: &str) -> String {
    let mut md = html.to_string();
    for level in (1..=6).rev() {
        md = md.replace(&format!("<h{level}>"), &format!("\n\n{} ", "#".repeat(level)));
        md = md.replace(&format!("</h{level}>"), "\n\n");
    }
    md = md.replace("<p>", "\n\n");
    md = md.replace("</p>", "\n");
    md = md.replace("<br>", "\n").replace("<br/>", "\n").replace("<br />", "\n");
    md = md.replace("<ul>", "\n").replace("</ul>", "\n");
    md = md.replace("<ol>", "\n").replace("</ol>", "\n");
    md = md.replace("<li>", "- ").replace("</li>", "\n");
    md = md.replace("<blockquote>", "\n> ").replace("</blockquote>", "\n");
    md = md.replace("<strong>", "**").replace("</strong>", "**");
    md = md.replace("<b>", "**").replace("</b>", "**");
    md = md.replace("<em>", "*").replace("</em>", "*");
    md = md.replace("<i>", "*").replace("</i>", "*");
    md = md.replace("<code>", "`").replace("</code>", "`");

    // Images and links carry attributes, so plain replaces don't reach
    // them. Images first, so a linked image becomes [![alt](src)](href).
    md = IMG_TAG_RE
        .replace_all(&md, |caps: &Captures| {
            let tag = &caps[0];
            let src = IMG_SRC_RE
                .captures(tag)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            if src.is_empty() {
                return String::new();
            }
            let alt = ALT_RE
                .captures(tag)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            format!("![{alt}]({src})")
        })
        .into_owned();
    md = LINK_RE.replace_all(&md, "[$2]($1)").into_owned();

    if let Some(rest) = md.strip_prefix("<html><body>") {
        md = rest.to_string();
    }
    md = TAG_RE.replace_all(&md, "").into_owned();

    // Entities after tag stripping, so decoded angle brackets survive.
    md = md.replace("&nbsp;", " ");
    md = md.replace("&quot;", "\"");
    md = md.replace("&#39;", "'");
    md = md.replace("&lt;", "<");
    md = md.replace("&gt;", ">");
    md = md.replace("&amp;", "&");

    md = EXTRA_NEWLINES_RE.replace_all(&md, "\n\n").into_owned();
    md.trim().to_string()
}
