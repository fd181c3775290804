use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatModel, Message, Role};
use crate::error::{BridgeError, Result};
use crate::tools::{ToolCall, ToolSpec};

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint
/// (OpenRouter by default).
pub struct OnlineModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OnlineModel {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BridgeError::Configuration {
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
            timeout_secs,
        })
    }

    fn request_body(&self, messages: &[Message], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
        });
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
        }
        body
    }
}

fn wire_message(message: &Message) -> Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    let mut wire = json!({ "role": role, "content": message.content });
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "type": "function",
                    "function": { "name": c.name, "arguments": c.args.to_string() },
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    wire
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Flatten string or content-part array into plain text.
fn content_text(content: Option<&Value>) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| match p {
                Value::String(s) => Some(s.as_str()),
                Value::Object(o) => o.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl ChatModel for OnlineModel {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, tools))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BridgeError::ModelTimeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    BridgeError::Model {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| BridgeError::Model {
            reason: format!("invalid completion JSON: {e}"),
        })?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Model {
                reason: "completion had no choices".into(),
            })?
            .message;

        let calls = reply
            .tool_calls
            .into_iter()
            .map(|c| ToolCall {
                id: c.id,
                name: c.function.name,
                args: serde_json::from_str(&c.function.arguments)
                    .unwrap_or(Value::String(c.function.arguments)),
            })
            .collect();

        tracing::debug!(model = %self.model, "completion received");
        Ok(Message::assistant(content_text(reply.content.as_ref())).with_tool_calls(calls))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FsTool;

    #[test]
    fn content_parts_are_flattened() {
        let parts = json!([{ "type": "text", "text": "a" }, "b", { "type": "image" }]);
        assert_eq!(content_text(Some(&parts)), "a b");
        assert_eq!(content_text(None), "");
    }

    #[test]
    fn tool_calls_serialize_as_functions() {
        let call = ToolCall::new("c1", FsTool::ReadFile, json!({ "file_path": "/a" }));
        let msg = Message::assistant("").with_tool_calls(vec![call]);
        let wire = wire_message(&msg);
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "read_file");
        assert_eq!(
            wire["tool_calls"][0]["function"]["arguments"],
            r#"{"file_path":"/a"}"#
        );
    }
}
