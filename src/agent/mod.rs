pub mod tool_agent;

pub use tool_agent::ToolAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::decision::ToolDecision;
use crate::error::Result;
use crate::model::Message;
use crate::tools::ToolCall;

/// Per-turn key under which a suspended run's conversation is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A run paused on a tool call that needs a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Suspension {
    pub token: CorrelationToken,
    pub pending: ToolCall,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Completed { messages: Vec<Message> },
    Suspended(Suspension),
}

/// A tool-using conversational agent whose runs can pause on gated tools.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Start a run under `token`.
    async fn invoke(&self, messages: Vec<Message>, token: &CorrelationToken)
        -> Result<AgentOutcome>;

    /// Continue a suspended run from where it paused, applying `decision`
    /// to the pending tool call.
    async fn resume(&self, token: &CorrelationToken, decision: ToolDecision)
        -> Result<AgentOutcome>;
}

/// Text of the last message, or empty if there are none.
pub fn final_text(messages: &[Message]) -> String {
    messages
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default()
}
