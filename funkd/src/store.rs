//! Filesystem collaborators: document-root lookups, templates and uploads.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only access to files below the document root.
pub trait FileStore: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Template text retrieval.
pub trait TemplateStore: Send + Sync {
    fn read_template(&self, root: &Path, name: &str) -> io::Result<String>;
}

/// Persists uploaded file parts; returns the path the bytes were stored at.
pub trait UploadStore: Send + Sync {
    fn store(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Join a request path onto `root`, keeping only plain segments so that `..`,
/// drive prefixes and absolute components can never leave the root.
pub fn under_root(root: &Path, request_path: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    for part in request_path.split(['/', '\\']) {
        for c in Path::new(part).components() {
            if let Component::Normal(seg) = c {
                out.push(seg);
            }
        }
    }
    out
}

/// Disk-backed store rooted at a document directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    doc_root: PathBuf,
}

impl DiskStore {
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        Self { doc_root: doc_root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        under_root(&self.doc_root, path)
    }
}

impl FileStore for DiskStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

impl TemplateStore for DiskStore {
    /// Templates live at `<root>/<name>.html`.
    fn read_template(&self, root: &Path, name: &str) -> io::Result<String> {
        std::fs::read_to_string(under_root(root, &format!("{name}.html")))
    }
}

impl UploadStore for DiskStore {
    fn store(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
