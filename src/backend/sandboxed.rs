use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use super::{AccessPolicy, GrepMatch, StorageBackend};
use crate::error::{BridgeError, Result};
use crate::scope::Scope;

/// Filesystem backend confined to one scope root.
#[derive(Debug, Clone)]
pub struct SandboxedBackend {
    scope: Scope,
    policy: AccessPolicy,
}

impl SandboxedBackend {
    pub fn new(scope: Scope, policy: AccessPolicy) -> Self {
        Self { scope, policy }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        match self.policy {
            AccessPolicy::FullAccess => Ok(()),
            AccessPolicy::ReadOnly => {
                tracing::warn!(
                    scope = %self.scope.name(),
                    operation,
                    "mutation refused on read-only scope"
                );
                Err(BridgeError::ReadOnlyScope {
                    scope: self.scope.name().to_string(),
                    operation: operation.to_string(),
                })
            }
        }
    }

    fn traversal(&self, virtual_path: &str) -> BridgeError {
        tracing::warn!(
            scope = %self.scope.name(),
            path = %virtual_path,
            "path traversal attempt rejected"
        );
        BridgeError::PathTraversal {
            path: virtual_path.to_string(),
        }
    }

    /// Real path back to the virtual form the agent sees.
    fn to_virtual(&self, real: &Path) -> String {
        match real.strip_prefix(self.scope.root()) {
            Ok(rel) => format!("/{}", slash_join(rel)),
            Err(_) => real.display().to_string(),
        }
    }

    fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
        Glob::new(pattern)
            .map(|g| g.compile_matcher())
            .map_err(|e| BridgeError::GlobPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }
}

impl StorageBackend for SandboxedBackend {
    fn resolve(&self, virtual_path: &str) -> Result<PathBuf> {
        let trimmed = virtual_path.trim();
        if trimmed.starts_with('~') {
            return Err(self.traversal(virtual_path));
        }

        let mut parts = Vec::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Prefix(_) => return Err(self.traversal(virtual_path)),
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(self.traversal(virtual_path));
                    }
                }
                Component::Normal(part) => parts.push(part),
            }
        }

        let root = self.scope.root();
        let mut real = root.to_path_buf();
        real.extend(&parts);

        // Every symlink on the way, dangling or not, must land inside the root.
        let mut prefix = root.to_path_buf();
        for part in parts {
            prefix.push(part);
            match fs::symlink_metadata(&prefix) {
                Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(&prefix) {
                    Ok(target) if target.starts_with(root) => {}
                    _ => return Err(self.traversal(virtual_path)),
                },
                Ok(_) => {}
                // Nothing below a missing or unreadable component can exist.
                Err(_) => break,
            }
        }

        Ok(real)
    }

    fn ls(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.resolve(path)?;
        if !dir.is_dir() {
            return Err(BridgeError::NotFound {
                path: path.to_string(),
            });
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let mut shown = self.to_virtual(&entry.path());
            if entry.file_type()?.is_dir() {
                shown.push('/');
            }
            entries.push(shown);
        }
        entries.sort();
        Ok(entries)
    }

    fn read(&self, path: &str, offset: usize, limit: usize) -> Result<String> {
        let file = self.resolve(path)?;
        if !file.is_file() {
            return Err(BridgeError::NotFound {
                path: path.to_string(),
            });
        }
        let contents = fs::read_to_string(&file)?;
        let numbered: Vec<String> = contents
            .lines()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(i, line)| format!("{:>6}\t{}", i + 1, line))
            .collect();
        Ok(numbered.join("\n"))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        self.ensure_writable("write_file")?;
        let file = self.resolve(path)?;
        if file.exists() {
            return Err(BridgeError::AlreadyExists {
                path: path.to_string(),
            });
        }
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, content)?;
        tracing::debug!(scope = %self.scope.name(), path, "file written");
        Ok(())
    }

    fn edit(&self, path: &str, old: &str, new: &str, replace_all: bool) -> Result<usize> {
        self.ensure_writable("edit_file")?;
        let file = self.resolve(path)?;
        if !file.is_file() {
            return Err(BridgeError::NotFound {
                path: path.to_string(),
            });
        }
        let contents = fs::read_to_string(&file)?;
        let occurrences = if old.is_empty() {
            0
        } else {
            contents.matches(old).count()
        };
        if occurrences == 0 {
            return Err(BridgeError::EditConflict {
                path: path.to_string(),
                reason: "string not found in file".into(),
            });
        }
        if occurrences > 1 && !replace_all {
            return Err(BridgeError::EditConflict {
                path: path.to_string(),
                reason: format!(
                    "string appears {occurrences} times; pass replace_all or add context"
                ),
            });
        }
        let updated = if replace_all {
            contents.replace(old, new)
        } else {
            contents.replacen(old, new, 1)
        };
        fs::write(&file, updated)?;
        Ok(if replace_all { occurrences } else { 1 })
    }

    fn glob(&self, pattern: &str, path: &str) -> Result<Vec<String>> {
        let matcher = Self::compile_glob(pattern.trim_start_matches('/'))?;
        let base = self.resolve(path)?;
        let mut hits = Vec::new();
        for file in walk_files(&base)? {
            let rel = file.strip_prefix(&base).map(slash_join).unwrap_or_default();
            if matcher.is_match(&rel) {
                hits.push(self.to_virtual(&file));
            }
        }
        hits.sort();
        Ok(hits)
    }

    fn grep(&self, pattern: &str, path: &str, glob: Option<&str>) -> Result<Vec<GrepMatch>> {
        let filter = glob.map(Self::compile_glob).transpose()?;
        let base = self.resolve(path)?;
        let files = if base.is_file() {
            vec![base.clone()]
        } else {
            walk_files(&base)?
        };

        let mut matches = Vec::new();
        for file in files {
            if let Some(filter) = &filter {
                let rel = file.strip_prefix(&base).map(slash_join).unwrap_or_default();
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !filter.is_match(&rel) && !filter.is_match(&name) {
                    continue;
                }
            }
            // Skip binary/unreadable files
            let Ok(contents) = fs::read_to_string(&file) else {
                continue;
            };
            for (i, line) in contents.lines().enumerate() {
                if line.contains(pattern) {
                    matches.push(GrepMatch {
                        path: self.to_virtual(&file),
                        line: i + 1,
                        text: line.to_string(),
                    });
                }
            }
        }
        Ok(matches)
    }
}

/// All regular files under `dir`, recursively. Symlinks are not followed.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn slash_join(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(policy: AccessPolicy) -> (TempDir, SandboxedBackend) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("docs");
        fs::create_dir_all(root.join("research")).unwrap();
        fs::write(root.join("guide.txt"), "public-doc-content\nsecond line\n").unwrap();
        fs::write(root.join("research/note.md"), "research-note\n").unwrap();
        let scope = Scope::new("docs", &root).unwrap();
        (tmp, SandboxedBackend::new(scope, policy))
    }

    #[test]
    fn read_numbers_lines() {
        let (_tmp, b) = backend(AccessPolicy::ReadOnly);
        let out = b.read("/guide.txt", 0, 100).unwrap();
        assert_eq!(out, "     1\tpublic-doc-content\n     2\tsecond line");
        let tail = b.read("/guide.txt", 1, 1).unwrap();
        assert_eq!(tail, "     2\tsecond line");
    }

    #[test]
    fn ls_marks_directories() {
        let (_tmp, b) = backend(AccessPolicy::ReadOnly);
        assert_eq!(b.ls("/").unwrap(), vec!["/guide.txt", "/research/"]);
    }

    #[test]
    fn glob_and_grep_report_virtual_paths() {
        let (_tmp, b) = backend(AccessPolicy::ReadOnly);
        assert_eq!(b.glob("**/*.md", "/").unwrap(), vec!["/research/note.md"]);
        let hits = b.grep("note", "/", Some("*.md")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].to_string(), "/research/note.md:1: research-note");
    }

    #[test]
    fn read_only_refuses_mutation() {
        let (tmp, b) = backend(AccessPolicy::ReadOnly);
        assert!(matches!(
            b.write("/new.txt", "x"),
            Err(BridgeError::ReadOnlyScope { .. })
        ));
        assert!(matches!(
            b.edit("/guide.txt", "public", "private", false),
            Err(BridgeError::ReadOnlyScope { .. })
        ));
        assert!(!tmp.path().join("docs/new.txt").exists());
    }

    #[test]
    fn full_access_write_and_edit() {
        let (tmp, b) = backend(AccessPolicy::FullAccess);
        b.write("/notes/a.md", "alpha beta alpha").unwrap();
        assert!(matches!(
            b.write("/notes/a.md", "again"),
            Err(BridgeError::AlreadyExists { .. })
        ));
        assert!(matches!(
            b.edit("/notes/a.md", "alpha", "gamma", false),
            Err(BridgeError::EditConflict { .. })
        ));
        assert_eq!(b.edit("/notes/a.md", "alpha", "gamma", true).unwrap(), 2);
        let written = fs::read_to_string(tmp.path().join("docs/notes/a.md")).unwrap();
        assert_eq!(written, "gamma beta gamma");
    }
}
