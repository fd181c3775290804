//! Turn orchestration: the fixed admin and user flows over the nodes.
//!
//! Admin turn: `Start -> Supervisor -> End`, or
//! `Start -> Supervisor -> Bridge -> CustomerFromBridge -> End` when the
//! supervisor routes to the bridge. User turn: `Start -> Customer -> End`.
//! Nothing carries over between turns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::AccessPolicy;
use crate::classifier::{ModelClassifier, TaskClassifier};
use crate::config::{ModelMode, ModelSettings, RuntimeConfig};
use crate::error::{BridgeError, Result};
use crate::model::{ChatModel, OfflineModel, OnlineModel};
use crate::nodes::customer::CUSTOMER_SYSTEM_PROMPT;
use crate::nodes::supervisor::ADMIN_SYSTEM_PROMPT;
use crate::nodes::{BridgeGate, CustomerNode, SupervisorNode};
use crate::scope::Scope;
use crate::state::{PrivilegedOrigin, PrivilegedState, RestrictedState, RouteDecision};
use crate::worker::DomainWorker;

/// Where the worker models come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Online,
    Offline,
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Online => write!(f, "online"),
            ModelSource::Offline => write!(f, "offline"),
        }
    }
}

/// The three models a runtime needs.
pub struct RuntimeModels {
    pub supervisor: Arc<dyn ChatModel>,
    pub customer: Arc<dyn ChatModel>,
    pub classifier: Arc<dyn ChatModel>,
    pub source: ModelSource,
}

impl RuntimeModels {
    /// Deterministic offline models.
    pub fn offline(config: &RuntimeConfig) -> Result<Self> {
        let signal = config.classifier.signal()?;
        Ok(Self {
            supervisor: Arc::new(OfflineModel::new("supervisor", signal.clone())),
            customer: Arc::new(OfflineModel::new("customer-service", signal.clone())),
            classifier: Arc::new(OfflineModel::new("classifier", signal)),
            source: ModelSource::Offline,
        })
    }
}

/// Pick online or offline models for `mode`.
pub fn resolve_runtime_models(
    settings: &ModelSettings,
    mode: ModelMode,
    config: &RuntimeConfig,
) -> Result<RuntimeModels> {
    let wants_online = matches!(mode, ModelMode::Auto | ModelMode::Online);
    if let (true, Some(api_key), Some(supervisor), Some(customer)) = (
        wants_online,
        settings.api_key.as_deref(),
        settings.supervisor_model.as_deref(),
        settings.customer_model.as_deref(),
    ) {
        let classifier = settings.classifier_model.as_deref().unwrap_or(supervisor);
        let timeout = config.model.timeout_secs;
        let online = |model: &str, temperature: f32| -> Result<Arc<dyn ChatModel>> {
            Ok(Arc::new(OnlineModel::new(
                &settings.base_url,
                api_key,
                model,
                temperature,
                timeout,
            )?))
        };
        return Ok(RuntimeModels {
            supervisor: online(supervisor, settings.temperature)?,
            customer: online(customer, settings.temperature)?,
            classifier: online(classifier, 0.0)?,
            source: ModelSource::Online,
        });
    }

    if mode == ModelMode::Online {
        return Err(BridgeError::Configuration {
            reason: "online model mode requested but required settings are missing; \
                     expected at least OPENROUTER_API_KEY and OPENROUTER_MODEL"
                .into(),
        });
    }

    RuntimeModels::offline(config)
}

enum AdminStep {
    Start,
    Supervisor,
    Bridge,
    CustomerFromBridge(RestrictedState),
    End,
}

enum UserStep {
    Start,
    Customer,
    End,
}

/// Transition out of the supervisor, keyed by its route.
fn after_supervisor(route: Option<RouteDecision>) -> AdminStep {
    match route {
        Some(RouteDecision::RouteBridge) => AdminStep::Bridge,
        Some(RouteDecision::RespondAdmin) | None => AdminStep::End,
    }
}

/// The composed two-domain system.
pub struct Runtime {
    base_dir: PathBuf,
    model_source: ModelSource,
    supervisor: SupervisorNode,
    bridge: BridgeGate,
    customer: CustomerNode,
}

impl Runtime {
    /// Resolve configuration once and build the runtime. `classifier`
    /// overrides the default model-backed classifier.
    pub fn create(
        base_dir: impl AsRef<Path>,
        mode: ModelMode,
        classifier: Option<Arc<dyn TaskClassifier>>,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config = RuntimeConfig::load_project(base_dir)?;
        let settings = ModelSettings::load(base_dir)?;
        let models = resolve_runtime_models(&settings, mode, &config)?;
        tracing::info!(mode = %mode, source = %models.source, "runtime models resolved");
        Self::from_parts(base_dir, &config, models, classifier)
    }

    /// Build from already-resolved parts.
    pub fn from_parts(
        base_dir: &Path,
        config: &RuntimeConfig,
        models: RuntimeModels,
        classifier: Option<Arc<dyn TaskClassifier>>,
    ) -> Result<Self> {
        let admin_scope = Scope::new(&config.scopes.admin, base_dir.join(&config.scopes.admin))?;
        let customer_scope =
            Scope::new(&config.scopes.customer, base_dir.join(&config.scopes.customer))?;
        let max_steps = config.agent.max_steps;

        let classifier: Arc<dyn TaskClassifier> = match classifier {
            Some(c) => c,
            None => Arc::new(ModelClassifier::new(
                models.classifier.clone(),
                config.classifier.signal()?,
                config.classifier.policy,
            )),
        };

        let admin_worker = DomainWorker::create(
            admin_scope,
            models.supervisor,
            ADMIN_SYSTEM_PROMPT,
            AccessPolicy::FullAccess,
            max_steps,
        );
        let customer_worker = DomainWorker::create(
            customer_scope,
            models.customer,
            CUSTOMER_SYSTEM_PROMPT,
            AccessPolicy::ReadOnly,
            max_steps,
        );

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            model_source: models.source,
            supervisor: SupervisorNode::new(classifier, admin_worker),
            bridge: BridgeGate::new(),
            customer: CustomerNode::new(customer_worker),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn model_source(&self) -> ModelSource {
        self.model_source
    }

    pub fn supervisor(&self) -> &SupervisorNode {
        &self.supervisor
    }

    pub fn bridge(&self) -> &BridgeGate {
        &self.bridge
    }

    pub fn customer(&self) -> &CustomerNode {
        &self.customer
    }

    /// Run an admin turn and return the text the admin sees.
    pub async fn run_admin_turn(&self, admin_input: &str) -> Result<String> {
        let state = self
            .execute_admin(PrivilegedState::from_admin(admin_input))
            .await?;
        let text = match state.route {
            Some(RouteDecision::RouteBridge) => state.customer_response,
            _ => state.supervisor_response,
        };
        Ok(text.unwrap_or_default())
    }

    /// Run a customer-facing user turn.
    pub async fn run_user_turn(&self, user_input: &str) -> Result<String> {
        let state = self
            .execute_user(RestrictedState::from_user(user_input))
            .await?;
        Ok(state.response().unwrap_or_default().to_string())
    }

    /// Drive the admin flow from `Start` to `End`.
    pub async fn execute_admin(&self, mut state: PrivilegedState) -> Result<PrivilegedState> {
        let mut step = AdminStep::Start;
        loop {
            step = match step {
                AdminStep::Start => AdminStep::Supervisor,
                AdminStep::Supervisor => {
                    state = self.supervisor.invoke(state).await?;
                    after_supervisor(state.route)
                }
                AdminStep::Bridge => {
                    let payload = self.bridge.invoke(&state)?;
                    state.origin = PrivilegedOrigin::Bridge;
                    state.bridge_admin_input = payload.bridge_input().map(str::to_string);
                    AdminStep::CustomerFromBridge(payload)
                }
                AdminStep::CustomerFromBridge(payload) => {
                    let result = self.customer.invoke(payload).await?;
                    state.customer_response =
                        Some(result.response().unwrap_or_default().to_string());
                    AdminStep::End
                }
                AdminStep::End => return Ok(state),
            };
        }
    }

    /// Drive the user flow from `Start` to `End`.
    pub async fn execute_user(&self, mut state: RestrictedState) -> Result<RestrictedState> {
        let mut step = UserStep::Start;
        loop {
            step = match step {
                UserStep::Start => UserStep::Customer,
                UserStep::Customer => {
                    state = self.customer.invoke(state).await?;
                    UserStep::End
                }
                UserStep::End => return Ok(state),
            };
        }
    }
}
