//! Resolution of WordPress media URLs into Grav asset locations.
//!
//! WordPress serves media from `<base_url>/wp-content/uploads/...` and
//! embeds resized derivatives whose filenames carry a `-WIDTHxHEIGHT`
//! suffix. Exported pages must reference the full-size original instead,
//! with the requested dimensions preserved as a `?resize=W,H` query so the
//! target site can still render the image at the intended size. The
//! relocator maps each canonical upload URL onto the on-disk file to copy
//! and the relative path it takes inside the export tree.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// URL path under which WordPress keeps uploaded media.
const UPLOADS_PATH: &str = "/wp-content/uploads";

/// Relative directory inside the export tree that mirrors the upload tree.
const DATA_PREFIX: &str = "data/wp-content/uploads";

static SIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-(?P<w>\d+)x(?P<h>\d+)(?P<ext>\.\w{3,4})$").unwrap()
});

/// A media URL taken apart into its canonical form and, when the filename
/// carried a WordPress size suffix, the dimensions that suffix encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// The URL exactly as it appeared in the source.
    pub original: String,
    /// The URL with any `-WxH` derivative suffix removed.
    pub canonical: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MediaReference {
    /// Parses a media URL, stripping a trailing `-WIDTHxHEIGHT` size
    /// suffix from the filename when one is present. URLs without the
    /// suffix pass through unchanged, so parsing is idempotent.
    pub fn parse(url: &str) -> Self {
        if let Some(caps) = SIZE_SUFFIX_RE.captures(url) {
            let width = caps["w"].parse().ok();
            let height = caps["h"].parse().ok();
            let canonical = SIZE_SUFFIX_RE.replace(url, "${ext}").into_owned();
            MediaReference {
                original: url.to_owned(),
                canonical,
                width,
                height,
            }
        } else {
            MediaReference {
                original: url.to_owned(),
                canonical: url.to_owned(),
                width: None,
                height: None,
            }
        }
    }

    /// Both dimensions, when the reference was a sized derivative.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// Where a relocated asset comes from and where it goes.
///
/// `source_path` points into the WordPress content directory on disk,
/// `dest_rel` is relative to the export root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMapping {
    pub canonical_url: String,
    pub source_path: PathBuf,
    pub dest_rel: PathBuf,
}

impl AssetMapping {
    /// The path Grav uses to address the relocated file from inside a
    /// field descriptor, rooted at the site's `user/` directory.
    pub fn grav_file_path(&self) -> String {
        format!("user/{}", self.dest_rel.display())
    }
}

/// Maps upload URLs onto source files and export destinations.
#[derive(Debug, Clone)]
pub struct AssetRelocator {
    base_url: String,
    content_dir: PathBuf,
}

impl AssetRelocator {
    pub fn new(base_url: &str, content_dir: &Path) -> Self {
        AssetRelocator {
            base_url: base_url.trim_end_matches('/').to_owned(),
            content_dir: content_dir.to_owned(),
        }
    }

    /// The absolute URL prefix of the WordPress upload tree.
    pub fn uploads_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOADS_PATH)
    }

    /// Stream reference Grav pages use for the relocated upload tree.
    pub fn grav_uploads_ref(&self) -> &'static str {
        "user://data/wp-content/uploads"
    }

    /// Resolves a canonical media URL to its relocation mapping. Returns
    /// `None` for URLs outside this site's upload tree; those are left
    /// alone rather than copied.
    pub fn resolve(&self, url: &str) -> Option<AssetMapping> {
        let rel = url.strip_prefix(&self.uploads_url())?;
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() {
            return None;
        }
        Some(AssetMapping {
            canonical_url: url.to_owned(),
            source_path: self.content_dir.join("uploads").join(rel),
            dest_rel: Path::new(DATA_PREFIX).join(rel),
        })
    }
}
