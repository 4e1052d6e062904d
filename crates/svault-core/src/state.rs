//! Explicit application state threaded through the coordinating components

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, VaultError};
use crate::modal::ModalController;
use crate::store::SecretStore;

/// At most one user-visible error message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState(Option<String>);

impl ErrorState {
    pub fn set(&mut self, message: impl Into<String>) {
        self.0 = Some(message.into());
    }

    pub fn dismiss(&mut self) {
        self.0 = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_none()
    }
}

/// What an outstanding request is about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The full secret list
    List,
    /// A secret that does not exist yet
    NewSecret,
    /// An existing secret, by id
    Secret(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::List => write!(f, "the secret list"),
            Target::NewSecret => write!(f, "a new secret"),
            Target::Secret(id) => write!(f, "secret {}", id),
        }
    }
}

/// Per-target in-flight flags. A second request for a target that is
/// already outstanding is rejected.
#[derive(Debug, Clone, Default)]
pub struct InFlight(HashSet<Target>);

impl InFlight {
    pub fn acquire(&mut self, target: Target) -> Result<()> {
        if self.0.contains(&target) {
            return Err(VaultError::RequestInFlight {
                target: target.to_string(),
            });
        }
        self.0.insert(target);
        Ok(())
    }

    pub fn release(&mut self, target: &Target) {
        self.0.remove(target);
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.0.contains(target)
    }

    pub fn is_idle(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the client knows: cached list, dialog, error slot and
/// outstanding requests.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub store: SecretStore,
    pub modal: ModalController,
    pub error: ErrorState,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_state_set_and_dismiss() {
        let mut error = ErrorState::default();
        assert!(error.is_clean());

        error.set("Failed to create secret");
        error.set("Failed to update secret");
        assert_eq!(error.message(), Some("Failed to update secret"));

        error.dismiss();
        assert!(error.is_clean());
    }

    #[test]
    fn test_in_flight_rejects_same_target() {
        let mut in_flight = InFlight::default();
        in_flight.acquire(Target::NewSecret).unwrap();
        in_flight
            .acquire(Target::Secret("a".to_string()))
            .unwrap();

        assert!(matches!(
            in_flight.acquire(Target::NewSecret),
            Err(VaultError::RequestInFlight { .. })
        ));

        in_flight.release(&Target::NewSecret);
        assert!(in_flight.acquire(Target::NewSecret).is_ok());
        assert!(in_flight.contains(&Target::Secret("a".to_string())));
    }
}
