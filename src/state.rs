//! Per-turn state for the two trust domains.
//!
//! `PrivilegedState` lives on the admin side and may carry secret material.
//! `RestrictedState` is what the customer domain sees. It has no field that
//! could hold a secret, and its bridge constructor is crate-private, so the
//! only way admin-originated text becomes restricted input is through
//! [`crate::nodes::BridgeGate`].

use serde::{Deserialize, Serialize};

/// Where admin input should be handled. Produced only by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    RespondAdmin,
    RouteBridge,
}

impl RouteDecision {
    pub fn label(&self) -> &'static str {
        match self {
            RouteDecision::RespondAdmin => "respond_admin",
            RouteDecision::RouteBridge => "route_bridge",
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegedOrigin {
    AdminCaller,
    Supervisor,
    Bridge,
}

impl std::fmt::Display for PrivilegedOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivilegedOrigin::AdminCaller => write!(f, "admin_caller"),
            PrivilegedOrigin::Supervisor => write!(f, "supervisor"),
            PrivilegedOrigin::Bridge => write!(f, "bridge"),
        }
    }
}

/// Admin-domain turn state.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivilegedState {
    pub origin: PrivilegedOrigin,
    pub admin_input: String,
    pub route: Option<RouteDecision>,
    pub supervisor_response: Option<String>,
    pub customer_response: Option<String>,
    pub bridge_admin_input: Option<String>,

    // Admin-only. Never copied into anything the customer domain receives.
    pub secret_context: Option<String>,
    pub secret_key_ref: Option<String>,
}

impl PrivilegedState {
    /// Fresh state for an admin turn.
    pub fn from_admin(admin_input: impl Into<String>) -> Self {
        Self {
            origin: PrivilegedOrigin::AdminCaller,
            admin_input: admin_input.into(),
            route: None,
            supervisor_response: None,
            customer_response: None,
            bridge_admin_input: None,
            secret_context: None,
            secret_key_ref: None,
        }
    }

    pub fn with_secrets(
        mut self,
        secret_context: impl Into<String>,
        secret_key_ref: impl Into<String>,
    ) -> Self {
        self.secret_context = Some(secret_context.into());
        self.secret_key_ref = Some(secret_key_ref.into());
        self
    }
}

impl std::fmt::Debug for PrivilegedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<REDACTED>");
        f.debug_struct("PrivilegedState")
            .field("origin", &self.origin)
            .field("admin_input", &self.admin_input)
            .field("route", &self.route)
            .field("supervisor_response", &self.supervisor_response)
            .field("customer_response", &self.customer_response)
            .field("bridge_admin_input", &self.bridge_admin_input)
            .field("secret_context", &redact(&self.secret_context))
            .field("secret_key_ref", &redact(&self.secret_key_ref))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictedOrigin {
    UserCaller,
    Bridge,
}

/// Customer-domain turn state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictedState {
    origin: RestrictedOrigin,
    user_input: Option<String>,
    bridge_input: Option<String>,
    response: Option<String>,
}

impl RestrictedState {
    /// State for a turn typed directly by a customer-facing user.
    pub fn from_user(user_input: impl Into<String>) -> Self {
        Self {
            origin: RestrictedOrigin::UserCaller,
            user_input: Some(user_input.into()),
            bridge_input: None,
            response: None,
        }
    }

    pub(crate) fn bridged(bridge_input: String) -> Self {
        Self {
            origin: RestrictedOrigin::Bridge,
            user_input: None,
            bridge_input: Some(bridge_input),
            response: None,
        }
    }

    pub fn origin(&self) -> RestrictedOrigin {
        self.origin
    }

    pub fn user_input(&self) -> Option<&str> {
        self.user_input.as_deref()
    }

    pub fn bridge_input(&self) -> Option<&str> {
        self.bridge_input.as_deref()
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Text the customer worker should act on: user input first, else the
    /// bridged input. Blank values count as absent.
    pub fn input_text(&self) -> &str {
        [self.user_input.as_deref(), self.bridge_input.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .trim()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let state = PrivilegedState::from_admin("rotate keys").with_secrets("ctx-9", "kms://k1");
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("ctx-9"));
        assert!(!rendered.contains("kms://k1"));
        assert!(rendered.contains("<REDACTED>"));
        assert!(rendered.contains("rotate keys"));
    }

    #[test]
    fn input_text_prefers_user_input() {
        let state = RestrictedState::from_user("  hi  ");
        assert_eq!(state.input_text(), "hi");

        let bridged = RestrictedState::bridged("from admin".into());
        assert_eq!(bridged.input_text(), "from admin");

        let blank = RestrictedState::from_user("");
        assert_eq!(blank.input_text(), "");
    }
}
