use async_trait::async_trait;

use super::{ChatModel, Message};
use crate::classifier::{KeywordSignal, LABEL_INSTRUCTION};
use crate::error::Result;
use crate::state::RouteDecision;
use crate::tools::ToolSpec;

/// Deterministic stand-in used when no model endpoint is configured.
///
/// Classification prompts get a route label chosen by the bridge-keyword
/// heuristic; everything else is echoed back as `"<role> handled: <text>"`.
/// It never requests tools.
pub struct OfflineModel {
    role: String,
    signal: KeywordSignal,
}

impl OfflineModel {
    pub fn new(role: impl Into<String>, signal: KeywordSignal) -> Self {
        Self {
            role: role.into(),
            signal,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    fn reply_to(&self, last_text: &str) -> String {
        let lowered = last_text.to_lowercase();
        let instruction = LABEL_INSTRUCTION.to_lowercase();
        if lowered.contains(&instruction) {
            if let Some((_, task)) = lowered.split_once("task:") {
                let route = if self.signal.matches(task) {
                    RouteDecision::RouteBridge
                } else {
                    RouteDecision::RespondAdmin
                };
                return route.label().to_string();
            }
        }
        format!("{} handled: {}", self.role, last_text)
    }
}

#[async_trait]
impl ChatModel for OfflineModel {
    async fn invoke(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<Message> {
        let last_text = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(Message::assistant(self.reply_to(last_text)))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(role: &str) -> OfflineModel {
        OfflineModel::new(role, KeywordSignal::default())
    }

    #[test]
    fn echoes_with_role() {
        assert_eq!(
            model("supervisor").reply_to("hello admin"),
            "supervisor handled: hello admin"
        );
    }

    #[test]
    fn labels_classification_prompts() {
        let m = model("classifier");
        let prompt = format!("{LABEL_INSTRUCTION}.\n\nTASK: Read docs for user");
        assert_eq!(m.reply_to(&prompt), "route_bridge");
        let prompt = format!("{LABEL_INSTRUCTION}.\n\nTASK: fix login.rs");
        assert_eq!(m.reply_to(&prompt), "respond_admin");
    }

    #[test]
    fn instruction_without_task_marker_is_echoed() {
        let m = model("classifier");
        let text = format!("{LABEL_INSTRUCTION} please");
        assert_eq!(m.reply_to(&text), format!("classifier handled: {text}"));
    }
}
