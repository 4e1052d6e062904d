// Client core for svault: the state machine behind the dashboard and the
// one-shot commands, plus the REST boundary to the vault service.
pub mod api;
pub mod coordinator;
pub mod editor;
pub mod error;
pub mod modal;
pub mod model;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used items
pub use api::{DEFAULT_API_URL, HttpVaultApi, VaultApi};
pub use coordinator::{Completion, Confirmation, Request, RequestCoordinator};
pub use editor::{KeyValueEditor, PendingEntry};
pub use error::{Operation, Result, VaultError};
pub use modal::{FormState, Modal, ModalController, ModalKind};
pub use model::{MASK, Secret, SecretData, SecretPayload};
pub use state::{AppState, ErrorState, InFlight, Target};
pub use store::SecretStore;
