//! File tools exposed to agents, and their execution against a backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::StorageBackend;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsTool {
    Ls,
    ReadFile,
    WriteFile,
    EditFile,
    Glob,
    Grep,
}

impl FsTool {
    pub const ALL: [FsTool; 6] = [
        FsTool::Ls,
        FsTool::ReadFile,
        FsTool::WriteFile,
        FsTool::EditFile,
        FsTool::Glob,
        FsTool::Grep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FsTool::Ls => "ls",
            FsTool::ReadFile => "read_file",
            FsTool::WriteFile => "write_file",
            FsTool::EditFile => "edit_file",
            FsTool::Glob => "glob",
            FsTool::Grep => "grep",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn spec(&self) -> ToolSpec {
        let (description, parameters) = match self {
            FsTool::Ls => (
                "List files in a directory.",
                json!({
                    "type": "object",
                    "properties": { "path": { "type": "string" } },
                }),
            ),
            FsTool::ReadFile => (
                "Read a file with line numbers.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string" },
                        "offset": { "type": "integer" },
                        "limit": { "type": "integer" },
                    },
                    "required": ["file_path"],
                }),
            ),
            FsTool::WriteFile => (
                "Create a new file with the given content.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string" },
                        "content": { "type": "string" },
                    },
                    "required": ["file_path", "content"],
                }),
            ),
            FsTool::EditFile => (
                "Replace a string in an existing file.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string" },
                        "old_string": { "type": "string" },
                        "new_string": { "type": "string" },
                        "replace_all": { "type": "boolean" },
                    },
                    "required": ["file_path", "old_string", "new_string"],
                }),
            ),
            FsTool::Glob => (
                "Find files matching a glob pattern.",
                json!({
                    "type": "object",
                    "properties": {
                        "pattern": { "type": "string" },
                        "path": { "type": "string" },
                    },
                    "required": ["pattern"],
                }),
            ),
            FsTool::Grep => (
                "Search file contents for a literal string.",
                json!({
                    "type": "object",
                    "properties": {
                        "pattern": { "type": "string" },
                        "path": { "type": "string" },
                        "glob": { "type": "string" },
                    },
                    "required": ["pattern"],
                }),
            ),
        };
        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

impl std::fmt::Display for FsTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tool invocation requested by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool: FsTool, args: Value) -> Self {
        Self {
            id: id.into(),
            name: tool.name().to_string(),
            args,
        }
    }

    pub fn tool(&self) -> Option<FsTool> {
        FsTool::from_name(&self.name)
    }
}

/// JSON-schema description of a tool, as sent to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

fn default_root() -> String {
    "/".into()
}

fn default_limit() -> usize {
    2000
}

#[derive(Deserialize)]
struct LsArgs {
    #[serde(default = "default_root")]
    path: String,
}

#[derive(Deserialize)]
struct ReadArgs {
    file_path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Deserialize)]
struct WriteArgs {
    file_path: String,
    content: String,
}

#[derive(Deserialize)]
struct EditArgs {
    file_path: String,
    old_string: String,
    new_string: String,
    #[serde(default)]
    replace_all: bool,
}

#[derive(Deserialize)]
struct GlobArgs {
    pattern: String,
    #[serde(default = "default_root")]
    path: String,
}

#[derive(Deserialize)]
struct GrepArgs {
    pattern: String,
    #[serde(default = "default_root")]
    path: String,
    glob: Option<String>,
}

fn parse<T: DeserializeOwned>(call: &ToolCall) -> Result<T> {
    let args = if call.args.is_null() {
        json!({})
    } else {
        call.args.clone()
    };
    Ok(serde_json::from_value(args)?)
}

/// Run a tool call and render its result as text for the model.
///
/// Failures (traversal, missing files, read-only scopes) come back as
/// `Error: ...` text so the agent can correct itself.
pub fn execute(backend: &dyn StorageBackend, call: &ToolCall) -> String {
    let Some(tool) = call.tool() else {
        return format!("Error: unknown tool '{}'", call.name);
    };
    match run(backend, tool, call) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(tool = %tool, error = %e, "tool call failed");
            format!("Error: {e}")
        }
    }
}

fn run(backend: &dyn StorageBackend, tool: FsTool, call: &ToolCall) -> Result<String> {
    match tool {
        FsTool::Ls => {
            let args: LsArgs = parse(call)?;
            Ok(backend.ls(&args.path)?.join("\n"))
        }
        FsTool::ReadFile => {
            let args: ReadArgs = parse(call)?;
            backend.read(&args.file_path, args.offset, args.limit)
        }
        FsTool::WriteFile => {
            let args: WriteArgs = parse(call)?;
            backend.write(&args.file_path, &args.content)?;
            Ok(format!("Updated file {}", args.file_path))
        }
        FsTool::EditFile => {
            let args: EditArgs = parse(call)?;
            let n = backend.edit(
                &args.file_path,
                &args.old_string,
                &args.new_string,
                args.replace_all,
            )?;
            Ok(format!(
                "Successfully replaced {n} instance(s) in '{}'",
                args.file_path
            ))
        }
        FsTool::Glob => {
            let args: GlobArgs = parse(call)?;
            Ok(backend.glob(&args.pattern, &args.path)?.join("\n"))
        }
        FsTool::Grep => {
            let args: GrepArgs = parse(call)?;
            let hits = backend.grep(&args.pattern, &args.path, args.glob.as_deref())?;
            if hits.is_empty() {
                return Ok(format!("No matches found for '{}'", args.pattern));
            }
            Ok(hits
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
