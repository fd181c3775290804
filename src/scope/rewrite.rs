use regex::Regex;

use crate::error::{BridgeError, Result};

/// Rewrites scope-qualified references so a worker sees them root-relative.
///
/// Two substitutions, applied in order:
/// 1. `/<scope>/` becomes `/` when not glued to a preceding word character.
/// 2. A bare `/<scope>` followed by whitespace, `.,;:!?` or end of text
///    becomes `/`.
///
/// Text without such references is returned unchanged.
#[derive(Debug, Clone)]
pub struct ScopeRewriter {
    scope_name: String,
    dir_prefix: Regex,
    bare: Regex,
}

impl ScopeRewriter {
    pub fn new(scope_name: &str) -> Result<Self> {
        if scope_name.is_empty() {
            return Err(BridgeError::Configuration {
                reason: "scope name must not be empty".into(),
            });
        }
        let escaped = regex::escape(scope_name);
        // '/' is a non-word character, so \B before it means "no word character
        // immediately to the left".
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| BridgeError::Configuration {
                reason: format!("invalid scope name {scope_name:?}: {e}"),
            })
        };
        Ok(Self {
            scope_name: scope_name.to_string(),
            dir_prefix: compile(format!(r"\B/{escaped}/"))?,
            bare: compile(format!(r"\B/{escaped}"))?,
        })
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn rewrite(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let once = self.dir_prefix.replace_all(text, "/");
        replace_bare_tokens(&self.bare, &once)
    }
}

impl PartialEq for ScopeRewriter {
    fn eq(&self, other: &Self) -> bool {
        self.scope_name == other.scope_name
    }
}

impl Eq for ScopeRewriter {}

fn replace_bare_tokens(bare: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;
    while let Some(m) = bare.find_at(text, pos) {
        if ends_token(&text[m.end()..]) {
            out.push_str(&text[last..m.start()]);
            out.push('/');
            last = m.end();
            pos = m.end();
        } else {
            // Needle starts with '/', a single byte.
            pos = m.start() + 1;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn ends_token(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '!' | '?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite_references(text: &str, scope_name: &str) -> String {
        ScopeRewriter::new(scope_name).unwrap().rewrite(text)
    }

    #[test]
    fn replaces_directory_prefix() {
        assert_eq!(
            rewrite_references("read_file /admin/README.md", "admin"),
            "read_file /README.md"
        );
    }

    #[test]
    fn replaces_bare_trailing_token() {
        assert_eq!(
            rewrite_references("list files under /admin", "admin"),
            "list files under /"
        );
        assert_eq!(rewrite_references("see /docs.", "docs"), "see /.");
    }

    #[test]
    fn leaves_embedded_references_alone() {
        assert_eq!(rewrite_references("x/admin/y", "admin"), "x/admin/y");
        assert_eq!(rewrite_references("/administrator", "admin"), "/administrator");
        assert_eq!(rewrite_references("/admin-tools", "admin"), "/admin-tools");
    }

    #[test]
    fn adjacent_references_are_all_rewritten() {
        assert_eq!(rewrite_references("/admin//admin/a", "admin"), "//a");
    }
}
