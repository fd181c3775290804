use crate::error::Result;
use crate::state::RestrictedState;
use crate::worker::DomainWorker;

pub const EMPTY_USER_INPUT: &str = "Empty user input.";

pub const CUSTOMER_SYSTEM_PROMPT: &str = "You are a customer-facing documentation assistant. \
Use the built-in filesystem tools for file operations. The documentation is read-only.";

/// Customer-side node, fed by a user directly or by the bridge.
pub struct CustomerNode {
    worker: DomainWorker,
}

impl CustomerNode {
    pub fn new(worker: DomainWorker) -> Self {
        Self { worker }
    }

    pub fn worker(&self) -> &DomainWorker {
        &self.worker
    }

    pub async fn invoke(&self, state: RestrictedState) -> Result<RestrictedState> {
        let input = state.input_text().to_string();
        if input.is_empty() {
            return Ok(state.with_response(EMPTY_USER_INPUT));
        }
        let response = self.worker.respond(&input).await?;
        Ok(state.with_response(response))
    }
}
