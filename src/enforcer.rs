use std::collections::HashSet;

use crate::agent::{final_text, Agent, AgentOutcome, CorrelationToken};
use crate::decision::ToolDecision;
use crate::error::Result;
use crate::model::Message;
use crate::tools::{FsTool, ToolCall};

/// Tools a read-only worker may never run.
pub const BLOCKED_TOOLS: [FsTool; 4] = [
    FsTool::WriteFile,
    FsTool::EditFile,
    FsTool::Glob,
    FsTool::Grep,
];

/// Returned to the agent in place of any blocked tool's result.
pub const SECURITY_ALERT: &str = "SECURITY ALERT: this workspace is read-only for the \
customer-facing assistant. The requested tool is blocked and was not executed. Do not retry it, \
and do not retry the same operation under a different path or file name. Answer using read_file \
and ls only.";

/// Final text of an enforced run plus every decision delivered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcedResponse {
    pub text: String,
    pub decisions: Vec<ToolDecision>,
}

/// Drives a gated agent to completion, answering every blocked tool attempt
/// with an explicit rejection.
#[derive(Debug, Clone)]
pub struct ReadOnlyEnforcer {
    blocked: HashSet<FsTool>,
}

impl Default for ReadOnlyEnforcer {
    fn default() -> Self {
        Self {
            blocked: BLOCKED_TOOLS.into_iter().collect(),
        }
    }
}

impl ReadOnlyEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self, tool_name: &str) -> bool {
        FsTool::from_name(tool_name).is_some_and(|t| self.blocked.contains(&t))
    }

    /// Decision for one intercepted call.
    pub fn decide(&self, call: &ToolCall) -> ToolDecision {
        if self.is_blocked(&call.name) {
            ToolDecision::reject(&call.name, SECURITY_ALERT)
        } else {
            ToolDecision::allow(&call.name)
        }
    }

    /// Run `input` through `agent` and return its final text.
    pub async fn respond_read_only(&self, agent: &dyn Agent, input: &str) -> Result<String> {
        Ok(self.run(agent, input).await?.text)
    }

    /// Like [`Self::respond_read_only`], keeping the decisions made.
    pub async fn run(&self, agent: &dyn Agent, input: &str) -> Result<EnforcedResponse> {
        let token = CorrelationToken::fresh();
        let mut decisions = Vec::new();
        let mut outcome = agent.invoke(vec![Message::user(input)], &token).await?;

        loop {
            match outcome {
                AgentOutcome::Completed { messages } => {
                    tracing::debug!(%token, rejected = decisions.len(), "read-only run completed");
                    return Ok(EnforcedResponse {
                        text: final_text(&messages),
                        decisions,
                    });
                }
                AgentOutcome::Suspended(suspension) => {
                    let decision = self.decide(&suspension.pending);
                    if decision.is_reject() {
                        tracing::warn!(
                            %token,
                            tool = %suspension.pending.name,
                            "blocked tool attempt on read-only worker"
                        );
                    }
                    decisions.push(decision.clone());
                    outcome = agent.resume(&suspension.token, decision).await?;
                }
            }
        }
    }
}
