//! The document tree on disk: listing and reading documents.

use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::links::DEFAULT_EXTENSION;
use crate::path::{DocPath, has_extension};

/// Directories never descended into.
const IGNORED_DIRS: &[&str] = &["node_modules"];

/// Result type alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from resolving or reading a document.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// No regular file at this path.
    #[error("document not found: {0}")]
    NotFound(DocPath),

    /// The path resolves outside the root (through a symlink).
    #[error("document is outside the document root: {0}")]
    OutsideRoot(DocPath),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Documents under a root directory.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    root: PathBuf,
    extension: String,
}

impl DocumentTree {
    /// Open the tree at `root`, creating the directory if it does not exist.
    pub fn open(root: impl AsRef<Path>) -> TreeResult<Self> {
        let root = root.as_ref();
        if !root.exists() {
            std::fs::create_dir_all(root)?;
            tracing::info!(root = %root.display(), "Created document root");
        }

        Ok(Self {
            root: root.canonicalize()?,
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Document extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// All documents under the root as slash-separated relative paths.
    ///
    /// Ordered depth-first with siblings sorted by name. Dot-entries and
    /// `node_modules` are skipped, as are directories that cannot be read.
    pub fn list(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .sort(true)
            .skip_hidden(true)
            .process_read_dir(|_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => !IGNORED_DIRS.iter().any(|d| entry.file_name() == *d),
                    Err(_) => true,
                });
            })
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.relative(&entry.path()))
            .filter(|rel| has_extension(rel, &self.extension))
            .collect()
    }

    /// Canonical filesystem path of a document.
    pub fn resolve(&self, doc: &DocPath) -> TreeResult<PathBuf> {
        let canonical = match doc.to_fs_path(&self.root).canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TreeError::NotFound(doc.clone()));
            }
            Err(e) => return Err(TreeError::Io(e)),
        };

        if !canonical.starts_with(&self.root) {
            tracing::warn!(path = %doc, "Document resolves outside the root");
            return Err(TreeError::OutsideRoot(doc.clone()));
        }
        if !canonical.is_file() {
            return Err(TreeError::NotFound(doc.clone()));
        }

        Ok(canonical)
    }

    /// Read a document as text, replacing invalid UTF-8.
    pub fn read(&self, doc: &DocPath) -> TreeResult<String> {
        let bytes = std::fs::read(self.resolve(doc)?)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, DocumentTree) {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "# Readme");
        write(dir.path(), "docs/guide/setup.md", "# Setup");
        write(dir.path(), "docs/intro.MD", "# Intro");
        write(dir.path(), "docs/image.png", "png");
        write(dir.path(), ".hidden/secret.md", "hidden");
        write(dir.path(), "docs/.draft.md", "draft");
        write(dir.path(), "node_modules/pkg/README.md", "vendored");
        write(dir.path(), "a.md", "a");
        let tree = DocumentTree::open(dir.path()).unwrap();
        (dir, tree)
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let (_dir, tree) = fixture();
        assert_eq!(
            tree.list(),
            vec!["README.md", "a.md", "docs/guide/setup.md", "docs/intro.MD"]
        );
    }

    #[test]
    fn test_list_empty_root() {
        let dir = TempDir::new().unwrap();
        let tree = DocumentTree::open(dir.path()).unwrap();
        assert!(tree.list().is_empty());
    }

    #[test]
    fn test_open_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("not").join("yet");
        let tree = DocumentTree::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(tree.root(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_read_document() {
        let (_dir, tree) = fixture();
        let doc = DocPath::parse("docs/guide/setup.md").unwrap();
        assert_eq!(tree.read(&doc).unwrap(), "# Setup");
    }

    #[test]
    fn test_read_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.md"), b"ok \xff end").unwrap();
        let tree = DocumentTree::open(dir.path()).unwrap();
        let text = tree.read(&DocPath::parse("bad.md").unwrap()).unwrap();
        assert_eq!(text, "ok \u{fffd} end");
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let (_dir, tree) = fixture();
        let doc = DocPath::parse("nope.md").unwrap();
        assert!(matches!(tree.read(&doc), Err(TreeError::NotFound(_))));
    }

    #[test]
    fn test_directory_is_not_found() {
        let (_dir, tree) = fixture();
        let doc = DocPath::parse("docs/guide").unwrap();
        assert!(matches!(tree.resolve(&doc), Err(TreeError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_outside_root_is_rejected() {
        let outside = TempDir::new().unwrap();
        write(outside.path(), "secret.md", "secret");

        let (dir, tree) = fixture();
        std::os::unix::fs::symlink(outside.path().join("secret.md"), dir.path().join("link.md"))
            .unwrap();

        let doc = DocPath::parse("link.md").unwrap();
        assert!(matches!(tree.read(&doc), Err(TreeError::OutsideRoot(_))));
    }
}
