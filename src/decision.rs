use serde::{Deserialize, Serialize};

/// Outcome delivered back to a suspended agent for one gated tool attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Allow => write!(f, "allow"),
            Verdict::Reject => write!(f, "reject"),
        }
    }
}

/// A decision on a single intercepted tool attempt.
///
/// Created per attempt and consumed when the agent is resumed with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDecision {
    /// The tool the agent tried to call (write_file, edit_file, ...).
    pub tool: String,

    pub verdict: Verdict,

    /// Message handed to the agent in place of the tool result.
    pub reason: Option<String>,
}

impl ToolDecision {
    pub fn allow(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            verdict: Verdict::Allow,
            reason: None,
        }
    }

    pub fn reject(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            verdict: Verdict::Reject,
            reason: Some(reason.into()),
        }
    }

    pub fn is_reject(&self) -> bool {
        self.verdict == Verdict::Reject
    }
}
