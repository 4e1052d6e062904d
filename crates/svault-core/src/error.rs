use miette::Diagnostic;
use thiserror::Error;

/// A network operation the client performs against the vault.
///
/// Each operation carries the fixed message shown to the user when it fails.
/// Server error bodies are never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Load,
    Get,
    Create,
    Update,
    Delete,
    Access,
    Health,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Load => "Failed to fetch secrets",
            Operation::Get => "Failed to fetch secret",
            Operation::Create => "Failed to create secret",
            Operation::Update => "Failed to update secret",
            Operation::Delete => "Failed to delete secret",
            Operation::Access => "Failed to access secret",
            Operation::Health => "Failed to check server health",
        }
    }
}

#[derive(Error, Debug, Clone, Diagnostic)]
pub enum VaultError {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    #[error("{}", operation.failure_message())]
    #[diagnostic(
        code(svault::network::unreachable),
        help("Could not reach the vault: {details}\nCheck --api-url / SVAULT_API_URL and that the server is running")
    )]
    Network { operation: Operation, details: String },

    #[error("{}", operation.failure_message())]
    #[diagnostic(
        code(svault::server::status),
        help("The vault answered with HTTP {status}")
    )]
    Server { operation: Operation, status: u16 },

    #[error("{}", operation.failure_message())]
    #[diagnostic(
        code(svault::server::decode),
        help("The vault response could not be parsed: {details}")
    )]
    Decode { operation: Operation, details: String },

    #[error("Vault is unhealthy")]
    #[diagnostic(code(svault::server::unhealthy), help("{details}"))]
    Unhealthy { details: String },

    // ========================================================================
    // Client State Errors
    // ========================================================================
    #[error("A request for {target} is already in progress")]
    #[diagnostic(
        code(svault::request::in_flight),
        help("Wait for the outstanding request to finish before submitting again")
    )]
    RequestInFlight { target: String },

    #[error("A dialog is already open")]
    #[diagnostic(code(svault::dialog::already_open))]
    DialogAlreadyOpen,

    #[error("No dialog is open")]
    #[diagnostic(code(svault::dialog::not_open))]
    NoDialogOpen,

    #[error("Name is required")]
    #[diagnostic(code(svault::form::name_required))]
    NameRequired,

    #[error("Secret '{reference}' not found")]
    #[diagnostic(
        code(svault::secret::not_found),
        help("Run 'svault list' to see available secrets and their ids")
    )]
    SecretNotFound { reference: String },

    #[error("Secret name '{name}' is ambiguous")]
    #[diagnostic(
        code(svault::secret::ambiguous),
        help("{count} secrets share this name; refer to one by id instead")
    )]
    AmbiguousName { name: String, count: usize },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Configuration error: {0}")]
    #[diagnostic(code(svault::config::error))]
    Config(String),
}

impl VaultError {
    /// The operation whose fixed message this error should surface as, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            VaultError::Network { operation, .. }
            | VaultError::Server { operation, .. }
            | VaultError::Decode { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_display_fixed_message() {
        let err = VaultError::Server {
            operation: Operation::Update,
            status: 500,
        };
        assert_eq!(err.to_string(), "Failed to update secret");

        let err = VaultError::Network {
            operation: Operation::Load,
            details: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch secrets");
        assert_eq!(err.operation(), Some(Operation::Load));
    }

    #[test]
    fn test_operation_names_and_decode_failures() {
        assert_eq!(Operation::Load.to_string(), "load");
        assert_eq!(Operation::Delete.to_string(), "delete");

        let err = VaultError::Decode {
            operation: Operation::Get,
            details: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch secret");
        assert_eq!(err.operation(), Some(Operation::Get));
    }

    #[test]
    fn test_state_errors_have_no_operation() {
        assert_eq!(VaultError::NameRequired.operation(), None);
        assert_eq!(VaultError::DialogAlreadyOpen.operation(), None);
    }
}
