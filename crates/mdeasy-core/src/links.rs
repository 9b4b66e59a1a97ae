//! Rewriting of document links in rendered HTML.
//!
//! The viewer is a single page that shows documents under `#/{path}`. Links
//! that point at other documents in the tree are rewritten to that form so
//! following them stays inside the viewer. Everything else passes through.
//!
//! This is a text pass over double-quoted `href="..."` attributes, not an
//! HTML parse. Single-quoted and unquoted attribute values are left alone;
//! the renderer never emits them. Attribute values are entity-decoded before
//! resolution and re-escaped on output.

use std::sync::LazyLock;

use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::{Captures, Regex};
use url::Url;

use crate::html::{escape_attr, unescape};
use crate::path::{DocPath, has_extension};

/// Extension of documents served by the viewer.
pub const DEFAULT_EXTENSION: &str = "md";

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("href pattern is valid"));

/// Base for resolving tree-relative links; only the path component is used.
static TREE_ROOT: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://tree.invalid/").expect("tree root URL is valid"));

/// Rewrites in-tree document links to viewer navigation links.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    base_url: String,
    extension: String,
}

impl LinkRewriter {
    /// Create a rewriter producing links under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Treat files with `ext` (no dot) as documents.
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    /// Base URL used in rewritten links, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rewrite every document link in `html` relative to `current`.
    pub fn rewrite(&self, html: &str, current: &DocPath) -> String {
        HREF.replace_all(html, |caps: &Captures<'_>| {
            match self.target(&unescape(&caps[1]), current) {
                Some(target) => format!("href=\"{}\"", escape_attr(&target)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }

    /// Viewer link for `href`, or `None` when it must stay unchanged.
    fn target(&self, href: &str, current: &DocPath) -> Option<String> {
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("mailto:")
            || href.starts_with("//")
            || Url::parse(href).is_ok()
        {
            return None;
        }

        let fragment = href.split_once('#').map(|(_, fragment)| fragment);

        // The query and fragment are split off by the URL parser; the
        // extension check only sees the path.
        let document = TREE_ROOT.join(&encode_segments(current.as_str())).ok()?;
        let resolved = document.join(href).ok()?;

        // Paths come back percent-encoded; the tree lists them decoded.
        let decoded = percent_decode_str(resolved.path()).decode_utf8().ok()?;
        let candidate = decoded.trim_start_matches('/').trim_end_matches('/');
        if candidate.is_empty() || !has_extension(candidate, &self.extension) {
            return None;
        }

        let mut target = format!("{}/#/{}", self.base_url, candidate);
        if let Some(fragment) = fragment {
            target.push('#');
            target.push_str(fragment);
        }
        Some(target)
    }
}

/// Percent-encode each segment so `#`, `?` and friends in directory names
/// stay part of the path.
fn encode_segments(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
