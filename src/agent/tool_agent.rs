use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Agent, AgentOutcome, CorrelationToken, Suspension};
use crate::backend::StorageBackend;
use crate::decision::{ToolDecision, Verdict};
use crate::error::{BridgeError, Result};
use crate::model::{ChatModel, Message};
use crate::tools::{self, FsTool, ToolCall, ToolSpec};

const DEFAULT_MAX_STEPS: usize = 25;

/// Saved state of a suspended run.
struct Checkpoint {
    messages: Vec<Message>,
    /// Tool calls from the last model reply not yet executed. The front is
    /// the call the run is paused on.
    queued: VecDeque<ToolCall>,
    steps: usize,
}

/// Agent that loops model -> tool calls -> tool results over a storage
/// backend until the model answers without calling tools.
pub struct ToolAgent {
    model: Arc<dyn ChatModel>,
    backend: Arc<dyn StorageBackend>,
    system_prompt: String,
    tools: Vec<ToolSpec>,
    interrupt_on: HashSet<FsTool>,
    max_steps: usize,
    checkpoints: DashMap<CorrelationToken, Checkpoint>,
}

impl ToolAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        backend: Arc<dyn StorageBackend>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            backend,
            system_prompt: system_prompt.into(),
            tools: FsTool::ALL.iter().map(FsTool::spec).collect(),
            interrupt_on: HashSet::new(),
            max_steps: DEFAULT_MAX_STEPS,
            checkpoints: DashMap::new(),
        }
    }

    /// Suspend the run whenever one of these tools is requested.
    pub fn with_interrupts(mut self, tools: impl IntoIterator<Item = FsTool>) -> Self {
        self.interrupt_on.extend(tools);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn interrupts(&self) -> &HashSet<FsTool> {
        &self.interrupt_on
    }

    /// Number of runs currently suspended.
    pub fn pending_runs(&self) -> usize {
        self.checkpoints.len()
    }

    fn is_gated(&self, call: &ToolCall) -> bool {
        call.tool().is_some_and(|t| self.interrupt_on.contains(&t))
    }

    fn transcript(&self, messages: &[Message]) -> Vec<Message> {
        let mut transcript = Vec::with_capacity(messages.len() + 1);
        transcript.push(Message::system(self.system_prompt.clone()));
        transcript.extend(messages.iter().cloned());
        transcript
    }

    async fn drive(&self, token: &CorrelationToken, mut cp: Checkpoint) -> Result<AgentOutcome> {
        loop {
            while let Some(call) = cp.queued.pop_front() {
                if self.is_gated(&call) {
                    let pending = call.clone();
                    cp.queued.push_front(call);
                    self.checkpoints.insert(token.clone(), cp);
                    tracing::debug!(%token, tool = %pending.name, "run suspended on gated tool");
                    return Ok(AgentOutcome::Suspended(Suspension {
                        token: token.clone(),
                        pending,
                    }));
                }
                let output = tools::execute(self.backend.as_ref(), &call);
                cp.messages.push(Message::tool_result(&call.id, output));
            }

            if cp.steps >= self.max_steps {
                return Err(BridgeError::StepLimit {
                    limit: self.max_steps,
                });
            }
            cp.steps += 1;

            let reply = self
                .model
                .invoke(&self.transcript(&cp.messages), &self.tools)
                .await?;
            let calls = reply.tool_calls.clone();
            cp.messages.push(reply);
            if calls.is_empty() {
                return Ok(AgentOutcome::Completed {
                    messages: cp.messages,
                });
            }
            cp.queued.extend(calls);
        }
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn invoke(
        &self,
        messages: Vec<Message>,
        token: &CorrelationToken,
    ) -> Result<AgentOutcome> {
        if self.checkpoints.remove(token).is_some() {
            tracing::warn!(%token, "discarding suspended run replaced by a new invocation");
        }
        let cp = Checkpoint {
            messages,
            queued: VecDeque::new(),
            steps: 0,
        };
        self.drive(token, cp).await
    }

    async fn resume(
        &self,
        token: &CorrelationToken,
        decision: ToolDecision,
    ) -> Result<AgentOutcome> {
        let Some((_, mut cp)) = self.checkpoints.remove(token) else {
            return Err(BridgeError::UnknownCheckpoint {
                token: token.to_string(),
            });
        };
        let Some(call) = cp.queued.pop_front() else {
            return Err(BridgeError::Agent {
                reason: format!("suspended run {token} has no pending tool call"),
            });
        };

        // A decision meant for some other tool never approves this one.
        let verdict = if decision.tool == call.name {
            decision.verdict
        } else {
            tracing::warn!(
                %token,
                pending = %call.name,
                decided = %decision.tool,
                "decision does not match pending tool, rejecting"
            );
            Verdict::Reject
        };

        let output = match verdict {
            Verdict::Allow => tools::execute(self.backend.as_ref(), &call),
            Verdict::Reject => decision
                .reason
                .unwrap_or_else(|| format!("Tool call {} was rejected.", call.name)),
        };
        cp.messages.push(Message::tool_result(&call.id, output));
        self.drive(token, cp).await
    }
}
