use crate::error::{BridgeError, Result};
use crate::state::{PrivilegedOrigin, PrivilegedState, RestrictedState};

/// The single crossing from the admin domain into the customer domain.
///
/// Only supervisor-originated state passes, and only `admin_input` is
/// carried across. The result type has no field that could hold
/// `secret_context` or `secret_key_ref`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeGate;

impl BridgeGate {
    pub fn new() -> Self {
        Self
    }

    pub fn invoke(&self, state: &PrivilegedState) -> Result<RestrictedState> {
        if state.origin != PrivilegedOrigin::Supervisor {
            tracing::warn!(origin = %state.origin, "bridge access denied");
            return Err(BridgeError::AccessDenied {
                origin: state.origin.to_string(),
            });
        }
        tracing::info!("admin input forwarded across bridge");
        Ok(RestrictedState::bridged(state.admin_input.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RestrictedOrigin;

    #[test]
    fn forwards_only_admin_input() {
        let mut state = PrivilegedState::from_admin("read_file /docs/guide.txt")
            .with_secrets("never-forward-this", "key-1");
        state.origin = PrivilegedOrigin::Supervisor;
        state.supervisor_response = Some("privileged".into());

        let payload = BridgeGate::new().invoke(&state).unwrap();
        assert_eq!(
            payload,
            RestrictedState::bridged("read_file /docs/guide.txt".into())
        );
        assert_eq!(payload.origin(), RestrictedOrigin::Bridge);
    }

    #[test]
    fn denies_non_supervisor_origins() {
        for origin in [PrivilegedOrigin::AdminCaller, PrivilegedOrigin::Bridge] {
            let mut state = PrivilegedState::from_admin("x");
            state.origin = origin;
            assert!(matches!(
                BridgeGate::new().invoke(&state),
                Err(BridgeError::AccessDenied { .. })
            ));
        }
    }
}
