use std::sync::Arc;

use crate::classifier::TaskClassifier;
use crate::error::Result;
use crate::state::{PrivilegedOrigin, PrivilegedState, RouteDecision};
use crate::worker::DomainWorker;

pub const EMPTY_ADMIN_INPUT: &str = "Empty admin input.";

pub const ADMIN_SYSTEM_PROMPT: &str = "You are the supervisor agent for administrator workflows. \
Use the built-in filesystem tools for file operations.";

/// Admin-side entry: classifies the request and either answers it with the
/// admin worker or marks it for the bridge.
pub struct SupervisorNode {
    classifier: Arc<dyn TaskClassifier>,
    worker: DomainWorker,
}

impl SupervisorNode {
    pub fn new(classifier: Arc<dyn TaskClassifier>, worker: DomainWorker) -> Self {
        Self { classifier, worker }
    }

    pub fn worker(&self) -> &DomainWorker {
        &self.worker
    }

    pub fn classifier(&self) -> &dyn TaskClassifier {
        self.classifier.as_ref()
    }

    pub async fn invoke(&self, mut state: PrivilegedState) -> Result<PrivilegedState> {
        state.origin = PrivilegedOrigin::Supervisor;

        let admin_input = state.admin_input.trim().to_string();
        if admin_input.is_empty() {
            state.route = Some(RouteDecision::RespondAdmin);
            state.supervisor_response = Some(EMPTY_ADMIN_INPUT.to_string());
            return Ok(state);
        }

        let route = self.classifier.classify(&admin_input).await;
        state.route = Some(route);
        match route {
            // Nothing privileged is produced for content headed to the customer side.
            RouteDecision::RouteBridge => {}
            RouteDecision::RespondAdmin => {
                state.supervisor_response = Some(self.worker.respond(&admin_input).await?);
            }
        }
        Ok(state)
    }
}
