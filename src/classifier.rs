//! Routing of admin input: handle it in the admin domain, or forward it
//! through the bridge to the customer-facing domain.

use std::sync::Arc;

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::model::{ChatModel, Message};
use crate::state::RouteDecision;

/// Phrase that marks a prompt as a classification request.
pub const LABEL_INSTRUCTION: &str = "Return exactly one label";

pub const DEFAULT_BRIDGE_KEYWORDS: [&str; 5] = [
    "docs",
    "documentation",
    "customer",
    "user document",
    "knowledge base",
];

/// How the model label and the keyword heuristic combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// `route_bridge` only when the heuristic agrees.
    #[default]
    Conjunctive,
    /// Trust the model label alone.
    ModelOnly,
}

/// Result of reading a route label out of free-form model text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelParse {
    Label(RouteDecision),
    Unparseable,
}

/// Case-insensitive substring match; `route_bridge` wins if both appear.
pub fn parse_label(text: &str) -> LabelParse {
    let lowered = text.to_lowercase();
    if lowered.contains(RouteDecision::RouteBridge.label()) {
        LabelParse::Label(RouteDecision::RouteBridge)
    } else if lowered.contains(RouteDecision::RespondAdmin.label()) {
        LabelParse::Label(RouteDecision::RespondAdmin)
    } else {
        LabelParse::Unparseable
    }
}

/// Combine a parsed label with the heuristic signal.
pub fn resolve(policy: ResolutionPolicy, label: LabelParse, bridge_intent: bool) -> RouteDecision {
    match (label, policy) {
        (LabelParse::Label(RouteDecision::RouteBridge), ResolutionPolicy::ModelOnly) => {
            RouteDecision::RouteBridge
        }
        (LabelParse::Label(RouteDecision::RouteBridge), ResolutionPolicy::Conjunctive) => {
            heuristic_route(bridge_intent)
        }
        (LabelParse::Label(RouteDecision::RespondAdmin), _) => RouteDecision::RespondAdmin,
        (LabelParse::Unparseable, _) => heuristic_route(bridge_intent),
    }
}

fn heuristic_route(bridge_intent: bool) -> RouteDecision {
    if bridge_intent {
        RouteDecision::RouteBridge
    } else {
        RouteDecision::RespondAdmin
    }
}

/// Customer-documentation indicator phrases, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct KeywordSignal {
    automaton: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordSignal {
    pub fn new(keywords: Vec<String>) -> Result<Self> {
        let keywords: Vec<String> = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        let automaton = AhoCorasick::new(&keywords).map_err(|e| BridgeError::Configuration {
            reason: format!("invalid bridge keywords: {e}"),
        })?;
        Ok(Self {
            automaton,
            keywords,
        })
    }

    pub fn default_keywords() -> Vec<String> {
        DEFAULT_BRIDGE_KEYWORDS.iter().map(|k| k.to_string()).collect()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, text: &str) -> bool {
        self.automaton.is_match(&text.to_lowercase())
    }
}

impl Default for KeywordSignal {
    fn default() -> Self {
        let keywords = Self::default_keywords();
        let automaton =
            AhoCorasick::new(&keywords).expect("default bridge keywords should compile");
        Self {
            automaton,
            keywords,
        }
    }
}

/// Decides where a piece of admin text is handled. Never fails: every
/// input resolves to a decision.
#[async_trait]
pub trait TaskClassifier: Send + Sync {
    async fn classify(&self, admin_input: &str) -> RouteDecision;

    /// Name of this classifier (for logging/debugging).
    fn name(&self) -> &str;
}

/// Classifier that asks a model for a label and reconciles it with the
/// keyword heuristic.
pub struct ModelClassifier {
    model: Arc<dyn ChatModel>,
    signal: KeywordSignal,
    policy: ResolutionPolicy,
}

impl ModelClassifier {
    pub fn new(model: Arc<dyn ChatModel>, signal: KeywordSignal, policy: ResolutionPolicy) -> Self {
        Self {
            model,
            signal,
            policy,
        }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }
}

#[async_trait]
impl TaskClassifier for ModelClassifier {
    async fn classify(&self, admin_input: &str) -> RouteDecision {
        let bridge_intent = self.signal.matches(admin_input);
        let prompt = routing_prompt(admin_input);

        let label = match self.model.invoke(&[Message::user(prompt)], &[]).await {
            Ok(reply) => parse_label(&reply.content),
            Err(e) => {
                tracing::warn!(
                    model = %self.model.name(),
                    error = %e,
                    "classifier model failed, using heuristic"
                );
                LabelParse::Unparseable
            }
        };
        if label == LabelParse::Unparseable {
            tracing::debug!("unparseable classifier output, falling back to heuristic");
        }

        let route = resolve(self.policy, label, bridge_intent);
        tracing::info!(
            ?label,
            bridge_intent,
            policy = ?self.policy,
            route = %route,
            "admin input classified"
        );
        route
    }

    fn name(&self) -> &str {
        "model"
    }
}

/// Deterministic classifier using the keyword heuristic only.
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    signal: KeywordSignal,
}

impl HeuristicClassifier {
    pub fn new(signal: KeywordSignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl TaskClassifier for HeuristicClassifier {
    async fn classify(&self, admin_input: &str) -> RouteDecision {
        heuristic_route(self.signal.matches(admin_input))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// The routing prompt. The request text comes last, after `TASK:`.
pub fn routing_prompt(admin_input: &str) -> String {
    format!(
        "You are a router for an admin assistant system. Analyze the request and classify it into one of two routes.

ROUTES:
1. respond_admin - Handle directly as administrative/system work (coding, debugging, system operations, data analysis)
2. route_bridge - Forward to the customer-facing documentation assistant

DECISION CRITERIA:
- Use 'route_bridge' if the request involves:
  * Reading, writing, or updating customer-facing documentation
  * Searching knowledge bases or help articles
  * Answering questions based on user manuals or guides
  * Creating content for end-users or customers
  * Handling support documentation queries

- Use 'respond_admin' if the request involves:
  * Writing or debugging code
  * System administration
  * Data processing or analysis
  * Internal tooling or automation
  * Development-related queries
  * General conversation or questions not requiring specialized docs

EXAMPLES:
- \"Fix the authentication bug in login.py\" -> respond_admin
- \"Update the API reference docs for customers\" -> route_bridge
- \"Search our knowledge base for password reset instructions\" -> route_bridge
- \"Analyze this CSV file and generate a report\" -> respond_admin
- \"Write a help article about how users can export data\" -> route_bridge

OUTPUT FORMAT: {LABEL_INSTRUCTION}, either 'route_bridge' or 'respond_admin'. No explanation.

TASK: {admin_input}"
    )
}
