pub mod rewrite;

pub use rewrite::ScopeRewriter;

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{BridgeError, Result};

/// A named sandbox: the on-disk root one worker sees as `/`.
///
/// The root is made absolute and normalized once at construction and is
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    name: String,
    root: PathBuf,
    #[serde(skip)]
    rewriter: ScopeRewriter,
}

impl Scope {
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(BridgeError::Configuration {
                reason: format!("invalid scope name: {name:?}"),
            });
        }
        let root = absolute_root(root.as_ref())?;
        if !root.is_dir() {
            tracing::warn!(scope = %name, root = %root.display(), "scope root does not exist yet");
        }
        let rewriter = ScopeRewriter::new(&name)?;
        Ok(Self {
            name,
            root,
            rewriter,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `/<name>/...` references in caller text onto this scope's `/`.
    pub fn rewrite(&self, text: &str) -> String {
        self.rewriter.rewrite(text)
    }
}

fn absolute_root(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    match std::fs::canonicalize(&absolute) {
        Ok(canonical) => Ok(canonical),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(lexical_normalize(&absolute)),
        Err(err) => Err(err.into()),
    }
}

/// Collapse `.` and `..` without touching the filesystem.
pub(crate) fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}
