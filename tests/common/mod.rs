//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use scopebridge::model::{ChatModel, Message};
use scopebridge::tools::{FsTool, ToolCall, ToolSpec};
use scopebridge::Result;

/// Model that replays a fixed list of replies and records every transcript
/// it was shown. Once the script runs out it answers `"done"`.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Message>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn transcripts(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }

    /// Every message content this model has been shown, flattened.
    pub fn seen_text(&self) -> String {
        self.transcripts()
            .iter()
            .flatten()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<Message> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| Message::assistant("done")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Assistant reply that requests a single tool call.
pub fn tool_reply(id: &str, tool: FsTool, args: serde_json::Value) -> Message {
    Message::assistant("").with_tool_calls(vec![ToolCall::new(id, tool, args)])
}

pub fn write_call(id: &str, path: &str) -> Message {
    tool_reply(
        id,
        FsTool::WriteFile,
        json!({ "file_path": path, "content": "overwritten" }),
    )
}

/// Base directory with an `admin/` and a `docs/` sandbox.
pub fn sandboxes(base: &Path) {
    std::fs::create_dir_all(base.join("admin")).unwrap();
    std::fs::create_dir_all(base.join("docs")).unwrap();
    std::fs::write(base.join("admin/secrets.txt"), "root password\n").unwrap();
    std::fs::write(base.join("docs/guide.txt"), "Reset your password from Settings.\n").unwrap();
}
