//! Traversal-safe document paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Errors from parsing a document path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Nothing left after normalization.
    #[error("document path is empty")]
    Empty,

    /// A `..` segment would leave the document root.
    #[error("document path escapes the document root: {0}")]
    Traversal(String),
}

/// Relative, slash-separated path of a document under the document root.
///
/// Always normalized: no leading slash, no empty or `.` segments and no `..`
/// segments, so it resolves at or under the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocPath(String);

impl DocPath {
    /// Parse and normalize a client-supplied path.
    ///
    /// Backslashes count as separators. `a//./b.md` becomes `a/b.md`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let normalized = raw.replace('\\', "/");
        let mut segments = Vec::new();

        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::Traversal(raw.to_string())),
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self(segments.join("/")))
    }

    /// The normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory portion without trailing slash; empty at the root.
    pub fn dir(&self) -> &str {
        self.0.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, name)| name).unwrap_or(&self.0)
    }

    /// Whether the file name ends in `.{ext}`, ignoring ASCII case.
    pub fn extension_is(&self, ext: &str) -> bool {
        has_extension(&self.0, ext)
    }

    /// Join onto a filesystem root.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

/// Case-insensitive `.{ext}` suffix check on a slash-separated path.
pub(crate) fn has_extension(path: &str, ext: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, found)) => !stem.is_empty() && found.eq_ignore_ascii_case(ext),
        None => false,
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(DocPath::parse("/a//./b.md").unwrap().as_str(), "a/b.md");
        assert_eq!(DocPath::parse("docs\\guide\\setup.md").unwrap().as_str(), "docs/guide/setup.md");
        assert_eq!(DocPath::parse("readme.md/").unwrap().as_str(), "readme.md");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert!(matches!(
            DocPath::parse("../etc/passwd"),
            Err(PathError::Traversal(_))
        ));
        assert!(matches!(
            DocPath::parse("docs/../../secret.md"),
            Err(PathError::Traversal(_))
        ));
        assert!(matches!(
            DocPath::parse("..\\secret.md"),
            Err(PathError::Traversal(_))
        ));
    }

    #[test]
    fn test_parse_allows_dots_inside_names() {
        let path = DocPath::parse("notes/v1..2.md").unwrap();
        assert_eq!(path.as_str(), "notes/v1..2.md");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(DocPath::parse(""), Err(PathError::Empty));
        assert_eq!(DocPath::parse("/./"), Err(PathError::Empty));
    }

    #[test]
    fn test_dir_and_file_name() {
        let nested = DocPath::parse("docs/guide/setup.md").unwrap();
        assert_eq!(nested.dir(), "docs/guide");
        assert_eq!(nested.file_name(), "setup.md");

        let top = DocPath::parse("README.md").unwrap();
        assert_eq!(top.dir(), "");
        assert_eq!(top.file_name(), "README.md");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(DocPath::parse("a/B.MD").unwrap().extension_is("md"));
        assert!(!DocPath::parse("a/b.png").unwrap().extension_is("md"));
        assert!(!DocPath::parse("a/.md").unwrap().extension_is("md"));
        assert!(!DocPath::parse("md").unwrap().extension_is("md"));
    }

    #[test]
    fn test_to_fs_path() {
        let path = DocPath::parse("docs/guide/setup.md").unwrap();
        let root = Path::new("/srv/docs");
        assert_eq!(
            path.to_fs_path(root),
            Path::new("/srv/docs").join("docs").join("guide").join("setup.md")
        );
    }

    #[test]
    fn test_serializes_as_string() {
        let path = DocPath::parse("a/b.md").unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"a/b.md\"");
    }
}
