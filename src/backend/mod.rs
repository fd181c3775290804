pub mod sandboxed;

pub use sandboxed::SandboxedBackend;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether a worker may mutate the storage it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    FullAccess,
    ReadOnly,
}

/// File operations an agent performs, addressed by virtual path (`/` is the
/// backend's own root).
pub trait StorageBackend: Send + Sync {
    /// Map a virtual path to a real path inside the root, or fail with
    /// `PathTraversal` before any I/O happens.
    fn resolve(&self, virtual_path: &str) -> Result<PathBuf>;

    /// List a directory. Directories are suffixed with `/`.
    fn ls(&self, path: &str) -> Result<Vec<String>>;

    /// Read `limit` lines starting at line `offset`, numbered from 1.
    fn read(&self, path: &str, offset: usize, limit: usize) -> Result<String>;

    /// Create a new file. Fails if it already exists.
    fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Replace `old` with `new`. Returns the number of replacements.
    fn edit(&self, path: &str, old: &str, new: &str, replace_all: bool) -> Result<usize>;

    /// Files under `path` whose root-relative path matches `pattern`.
    fn glob(&self, pattern: &str, path: &str) -> Result<Vec<String>>;

    /// Literal search for `pattern` in files under `path`.
    fn grep(&self, pattern: &str, path: &str, glob: Option<&str>) -> Result<Vec<GrepMatch>>;
}

/// A single grep hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrepMatch {
    pub path: String,
    pub line: usize,
    pub text: String,
}

impl std::fmt::Display for GrepMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path, self.line, self.text)
    }
}
