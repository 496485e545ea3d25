//! Mapping of request URLs onto files under the document root.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

/// A regular file that may be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    /// Size in bytes at resolution time
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Why a URL did not resolve to a servable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Normalized path lies outside the document root
    EscapesRoot,
    /// Nothing exists at the path (or it could not be inspected)
    Missing,
    /// The path names a directory
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedFile),
    NotFound(NotFoundReason),
}

/// Resolves URLs against a fixed document root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for `root`, which must be an existing directory.
    ///
    /// The root is canonicalized so that containment checks compare
    /// absolute, symlink-free paths.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("document root {} does not exist", root.display()))?;

        if !root.is_dir() {
            anyhow::bail!("document root {} is not a directory", root.display());
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `url` onto the root, collapsing `.` and `..` segments.
    ///
    /// The result is purely lexical and may lie outside the root.
    pub fn normalize(&self, url: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in url.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    path.pop();
                }
                name => path.push(name),
            }
        }
        path
    }

    /// Component-wise containment, so `/srv/www2` is not inside `/srv/www`.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    pub async fn resolve(&self, url: &str) -> Resolution {
        let path = self.normalize(url);
        if !self.contains(&path) {
            return Resolution::NotFound(NotFoundReason::EscapesRoot);
        }

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(_) => return Resolution::NotFound(NotFoundReason::Missing),
        };

        if metadata.is_dir() {
            return Resolution::NotFound(NotFoundReason::Directory);
        }

        Resolution::Found(ResolvedFile {
            path,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}
