use std::sync::Arc;

use crate::agent::{final_text, Agent, AgentOutcome, CorrelationToken, ToolAgent};
use crate::backend::{AccessPolicy, SandboxedBackend};
use crate::enforcer::{ReadOnlyEnforcer, BLOCKED_TOOLS};
use crate::error::{BridgeError, Result};
use crate::model::{ChatModel, Message};
use crate::scope::Scope;

/// An agent bound to one scope and one access policy.
pub struct DomainWorker {
    scope: Scope,
    policy: AccessPolicy,
    agent: Arc<dyn Agent>,
    enforcer: ReadOnlyEnforcer,
}

impl DomainWorker {
    /// Build a worker over a sandboxed backend for `scope`. Read-only
    /// workers get an agent that pauses on every blocked tool.
    pub fn create(
        scope: Scope,
        model: Arc<dyn ChatModel>,
        system_prompt: &str,
        policy: AccessPolicy,
        max_steps: usize,
    ) -> Self {
        let backend = Arc::new(SandboxedBackend::new(scope.clone(), policy));
        let mut agent = ToolAgent::new(model, backend, system_prompt).with_max_steps(max_steps);
        if policy == AccessPolicy::ReadOnly {
            agent = agent.with_interrupts(BLOCKED_TOOLS);
        }
        Self::new(scope, policy, Arc::new(agent))
    }

    pub fn new(scope: Scope, policy: AccessPolicy, agent: Arc<dyn Agent>) -> Self {
        Self {
            scope,
            policy,
            agent,
            enforcer: ReadOnlyEnforcer::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    pub async fn respond(&self, input: &str) -> Result<String> {
        let text = self.scope.rewrite(input);
        tracing::debug!(scope = %self.scope.name(), policy = ?self.policy, "worker responding");

        match self.policy {
            AccessPolicy::ReadOnly => {
                self.enforcer
                    .respond_read_only(self.agent.as_ref(), &text)
                    .await
            }
            AccessPolicy::FullAccess => {
                let token = CorrelationToken::fresh();
                match self.agent.invoke(vec![Message::user(text)], &token).await? {
                    AgentOutcome::Completed { messages } => Ok(final_text(&messages)),
                    AgentOutcome::Suspended(s) => Err(BridgeError::Agent {
                        reason: format!(
                            "full-access worker {} suspended on {}",
                            self.scope.name(),
                            s.pending.name
                        ),
                    }),
                }
            }
        }
    }
}
