//! Sequencing of create/update/delete calls against the vault.
//!
//! Every operation runs in three phases so an interactive front end never
//! holds application state across a network await:
//!
//! 1. `begin_*` checks the transition, takes the in-flight flag and
//!    snapshots the payload into a [`Request`]. It also numbers the reload
//!    the request will end with.
//! 2. [`Request::execute`] performs the call and, only when the mutation
//!    succeeded, the full reload of the list.
//! 3. [`RequestCoordinator::complete`] applies the [`Completion`]: on
//!    failure the operation's fixed message goes into the error slot and
//!    nothing else changes; on success the reloaded list replaces the store
//!    and then the dialog closes, dropping its draft. A reload older than
//!    the last one applied is dropped instead of replacing the store.
//!
//! The `load`/`create`/`update`/`remove` helpers chain the three phases.

use std::sync::Arc;

use crate::api::VaultApi;
use crate::error::{Operation, Result, VaultError};
use crate::modal::Modal;
use crate::model::{Secret, SecretPayload};
use crate::state::{AppState, Target};

/// The user's answer to the delete confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone)]
enum Action {
    Reload,
    Create(SecretPayload),
    Update { id: String, payload: SecretPayload },
    Delete { id: String },
}

/// An outbound call, detached from application state
#[derive(Debug, Clone)]
pub struct Request {
    operation: Operation,
    target: Target,
    generation: u64,
    reload_seq: u64,
    action: Action,
}

impl Request {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Run the call. A mutation that succeeds is followed by a full reload,
    /// awaited before the completion is handed back.
    pub async fn execute(self, api: &dyn VaultApi) -> Completion {
        let mutation = match &self.action {
            Action::Reload => None,
            Action::Create(payload) => Some(api.create_secret(payload).await),
            Action::Update { id, payload } => Some(api.update_secret(id, payload).await),
            Action::Delete { id } => Some(api.delete_secret(id).await),
        };

        let reload = match &mutation {
            None | Some(Ok(())) => Some(api.list_secrets().await),
            Some(Err(_)) => None,
        };

        Completion {
            operation: self.operation,
            target: self.target,
            generation: self.generation,
            reload_seq: self.reload_seq,
            mutation,
            reload,
        }
    }
}

/// Result of an executed [`Request`]
#[derive(Debug, Clone)]
pub struct Completion {
    operation: Operation,
    target: Target,
    generation: u64,
    reload_seq: u64,
    mutation: Option<Result<()>>,
    reload: Option<Result<Vec<Secret>>>,
}

impl Completion {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Whether the mutation (or, for a plain reload, the load) succeeded
    pub fn succeeded(&self) -> bool {
        match &self.mutation {
            Some(result) => result.is_ok(),
            None => matches!(self.reload, Some(Ok(_))),
        }
    }
}

#[derive(Clone)]
pub struct RequestCoordinator {
    api: Arc<dyn VaultApi>,
}

impl RequestCoordinator {
    pub fn new(api: Arc<dyn VaultApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> Arc<dyn VaultApi> {
        self.api.clone()
    }

    pub fn begin_load(&self, state: &mut AppState) -> Result<Request> {
        state.in_flight.acquire(Target::List)?;
        state.store.mark_loading();
        Ok(Request {
            operation: Operation::Load,
            target: Target::List,
            generation: state.modal.generation(),
            reload_seq: state.store.next_reload(),
            action: Action::Reload,
        })
    }

    /// Submit whichever dialog is open
    pub fn begin_submit(&self, state: &mut AppState) -> Result<Request> {
        match state.modal.modal() {
            Modal::Closed => Err(VaultError::NoDialogOpen),
            Modal::Create { .. } => self.begin_create(state),
            Modal::Edit { .. } => self.begin_update(state),
        }
    }

    pub fn begin_create(&self, state: &mut AppState) -> Result<Request> {
        let Modal::Create { form } = state.modal.modal() else {
            return Err(VaultError::NoDialogOpen);
        };
        if form.name.is_empty() {
            return Err(VaultError::NameRequired);
        }
        let payload = form.to_payload();

        state.in_flight.acquire(Target::NewSecret)?;
        tracing::debug!(
            "Submitting new secret '{}' with {} keys",
            payload.name,
            payload.data.len()
        );
        Ok(Request {
            operation: Operation::Create,
            target: Target::NewSecret,
            generation: state.modal.generation(),
            reload_seq: state.store.next_reload(),
            action: Action::Create(payload),
        })
    }

    pub fn begin_update(&self, state: &mut AppState) -> Result<Request> {
        let Modal::Edit { secret_id, form } = state.modal.modal() else {
            return Err(VaultError::NoDialogOpen);
        };
        if form.name.is_empty() {
            return Err(VaultError::NameRequired);
        }
        let id = secret_id.clone();
        let payload = form.to_payload();

        state.in_flight.acquire(Target::Secret(id.clone()))?;
        tracing::debug!(
            "Submitting update of secret {} with {} keys",
            id,
            payload.data.len()
        );
        Ok(Request {
            operation: Operation::Update,
            target: Target::Secret(id.clone()),
            generation: state.modal.generation(),
            reload_seq: state.store.next_reload(),
            action: Action::Update { id, payload },
        })
    }

    /// Delete `id` once the user has confirmed. A declined confirmation
    /// issues nothing and leaves state untouched.
    pub fn begin_remove(
        &self,
        state: &mut AppState,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<Option<Request>> {
        if confirmation == Confirmation::Declined {
            tracing::debug!("Deletion of secret {} declined", id);
            return Ok(None);
        }

        let target = Target::Secret(id.to_string());
        state.in_flight.acquire(target.clone())?;
        Ok(Some(Request {
            operation: Operation::Delete,
            target,
            generation: state.modal.generation(),
            reload_seq: state.store.next_reload(),
            action: Action::Delete { id: id.to_string() },
        }))
    }

    /// Apply a completion to the state.
    ///
    /// Returns the mutation's error when it failed, or the load error for a
    /// plain reload. A reload failing after a successful mutation is only
    /// recorded in the error slot.
    pub fn complete(&self, state: &mut AppState, completion: Completion) -> Result<()> {
        let Completion {
            operation,
            target,
            generation,
            reload_seq,
            mutation,
            reload,
        } = completion;

        state.in_flight.release(&target);
        if target == Target::List {
            state.store.finish_loading();
        }

        if let Some(Err(e)) = &mutation {
            tracing::debug!("{} of {} failed: {:?}", operation, target, e);
            state.error.set(operation.failure_message());
            return Err(e.clone());
        }

        let reload_error = match reload {
            Some(result) => {
                let error = result.as_ref().err().cloned();
                state
                    .store
                    .apply_reload(reload_seq, result, &mut state.error);
                error
            }
            None => None,
        };

        if mutation.is_some() {
            tracing::debug!("{} of {} succeeded", operation, target);
            state.modal.close_if_generation(generation);
            return Ok(());
        }

        match reload_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Execute a request and apply its completion
    pub async fn run(&self, state: &mut AppState, request: Request) -> Result<()> {
        let completion = request.execute(self.api.as_ref()).await;
        self.complete(state, completion)
    }

    pub async fn load(&self, state: &mut AppState) -> Result<()> {
        let request = self.begin_load(state)?;
        self.run(state, request).await
    }

    pub async fn create(&self, state: &mut AppState) -> Result<()> {
        let request = self.begin_create(state)?;
        self.run(state, request).await
    }

    pub async fn update(&self, state: &mut AppState) -> Result<()> {
        let request = self.begin_update(state)?;
        self.run(state, request).await
    }

    /// Returns false when the user declined and nothing was sent
    pub async fn remove(
        &self,
        state: &mut AppState,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool> {
        match self.begin_remove(state, id, confirmation)? {
            Some(request) => self.run(state, request).await.map(|_| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVault;
    use crate::modal::ModalKind;
    use crate::model::SecretData;

    fn setup() -> (Arc<MemoryVault>, RequestCoordinator, AppState) {
        let vault = Arc::new(MemoryVault::new());
        let coordinator = RequestCoordinator::new(vault.clone());
        (vault, coordinator, AppState::new())
    }

    fn payload(name: &str, pairs: &[(&str, &str)]) -> SecretPayload {
        SecretPayload {
            name: name.to_string(),
            description: String::new(),
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn fill_create(state: &mut AppState, name: &str, pairs: &[(&str, &str)]) {
        state.modal.open_create().unwrap();
        let form = state.modal.form_mut().unwrap();
        form.name = name.to_string();
        for (k, v) in pairs {
            form.editor.add(k, v);
        }
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let (_vault, coordinator, mut state) = setup();
        fill_create(&mut state, "api", &[("a", "1")]);

        coordinator.create(&mut state).await.unwrap();
        coordinator.load(&mut state).await.unwrap();

        assert_eq!(state.store.len(), 1);
        let expected: SecretData = [("a".to_string(), "1".to_string())].into_iter().collect();
        assert_eq!(state.store.secrets()[0].data, expected);
    }

    #[tokio::test]
    async fn test_create_success_reloads_then_closes() {
        let (vault, coordinator, mut state) = setup();
        state.error.set("Failed to fetch secrets");
        fill_create(&mut state, "db", &[("user", "root"), ("pass", "x")]);

        coordinator.create(&mut state).await.unwrap();

        assert_eq!(vault.calls(Operation::Create), 1);
        assert_eq!(vault.calls(Operation::Load), 1);
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.store.secrets()[0].name, "db");
        assert_eq!(state.store.secrets()[0].key_count(), 2);
        assert_eq!(state.modal.kind(), ModalKind::Closed);
        assert!(state.modal.form().is_none());
        assert!(state.error.is_clean());
        assert!(state.in_flight.is_idle());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (vault, coordinator, mut state) = setup();
        fill_create(&mut state, "db", &[("user", "root"), ("pass", "x")]);
        coordinator.create(&mut state).await.unwrap();
        let id = state.store.secrets()[0].id.clone();

        let sent = coordinator
            .remove(&mut state, &id, Confirmation::Declined)
            .await
            .unwrap();
        assert!(!sent);
        assert_eq!(vault.calls(Operation::Delete), 0);
        assert_eq!(state.store.len(), 1);

        let sent = coordinator
            .remove(&mut state, &id, Confirmation::Confirmed)
            .await
            .unwrap();
        assert!(sent);
        assert_eq!(state.store.len(), 0);

        coordinator.load(&mut state).await.unwrap();
        assert_eq!(state.store.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_update_is_non_destructive() {
        let (vault, coordinator, mut state) = setup();
        vault.seed(payload("db", &[("user", "root")]));
        coordinator.load(&mut state).await.unwrap();

        let secret = state.store.secrets()[0].clone();
        state.modal.open_edit(&secret).unwrap();
        let form = state.modal.form_mut().unwrap();
        form.editor.add("pass", "x");
        form.editor.remove("user");
        let draft_before = state.modal.form().cloned();
        let list_before = state.store.secrets().to_vec();

        vault.fail_next(Operation::Update, 500);
        let result = coordinator.update(&mut state).await;

        assert!(matches!(result, Err(VaultError::Server { status: 500, .. })));
        assert_eq!(state.error.message(), Some("Failed to update secret"));
        assert_eq!(state.store.secrets(), list_before.as_slice());
        assert_eq!(state.modal.kind(), ModalKind::Edit);
        assert_eq!(state.modal.form().cloned(), draft_before);
        // No reload after a failed mutation
        assert_eq!(vault.calls(Operation::Load), 1);
        assert!(state.in_flight.is_idle());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_create_dialog_open() {
        let (vault, coordinator, mut state) = setup();
        fill_create(&mut state, "db", &[("user", "root")]);
        vault.set_offline(true);

        let result = coordinator.create(&mut state).await;

        assert!(matches!(result, Err(VaultError::Network { .. })));
        assert_eq!(state.error.message(), Some("Failed to create secret"));
        assert_eq!(state.modal.kind(), ModalKind::Create);
        assert_eq!(state.modal.form().unwrap().editor.len(), 1);

        // Resubmitting after recovery succeeds and clears the error
        vault.set_offline(false);
        coordinator.create(&mut state).await.unwrap();
        assert!(state.error.is_clean());
        assert_eq!(state.store.len(), 1);
    }

    #[tokio::test]
    async fn test_draft_isolated_from_store_until_submit() {
        let (vault, coordinator, mut state) = setup();
        vault.seed(payload("db", &[("user", "root"), ("pass", "x")]));
        coordinator.load(&mut state).await.unwrap();

        let secret = state.store.secrets()[0].clone();
        state.modal.open_edit(&secret).unwrap();
        state.modal.form_mut().unwrap().editor.remove("user");

        assert_eq!(state.store.secrets()[0].key_count(), 2);

        coordinator.update(&mut state).await.unwrap();
        assert_eq!(state.store.secrets()[0].key_count(), 1);
        assert!(!state.store.secrets()[0].data.contains_key("user"));
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected_while_in_flight() {
        let (vault, coordinator, mut state) = setup();
        fill_create(&mut state, "db", &[("a", "1")]);

        let first = coordinator.begin_submit(&mut state).unwrap();
        assert!(matches!(
            coordinator.begin_submit(&mut state),
            Err(VaultError::RequestInFlight { .. })
        ));

        coordinator.run(&mut state, first).await.unwrap();
        assert_eq!(vault.calls(Operation::Create), 1);
        assert_eq!(vault.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_name_is_refused_without_a_call() {
        let (vault, coordinator, mut state) = setup();
        fill_create(&mut state, "", &[("a", "1")]);

        assert!(matches!(
            coordinator.create(&mut state).await,
            Err(VaultError::NameRequired)
        ));
        assert_eq!(vault.calls(Operation::Create), 0);
        assert!(state.error.is_clean());
        assert!(state.in_flight.is_idle());
    }

    #[tokio::test]
    async fn test_late_completion_does_not_close_newer_dialog() {
        let (_vault, coordinator, mut state) = setup();
        fill_create(&mut state, "db", &[("a", "1")]);
        let request = coordinator.begin_submit(&mut state).unwrap();

        state.modal.cancel().unwrap();
        state.modal.open_create().unwrap();
        state.modal.form_mut().unwrap().name = "next".to_string();

        let completion = request.execute(coordinator.api().as_ref()).await;
        coordinator.complete(&mut state, completion).unwrap();

        assert_eq!(state.store.len(), 1);
        assert_eq!(state.modal.kind(), ModalKind::Create);
        assert_eq!(state.modal.form().unwrap().name, "next");
    }

    #[tokio::test]
    async fn test_reload_failure_after_mutation_still_closes() {
        let (vault, coordinator, mut state) = setup();
        fill_create(&mut state, "db", &[("a", "1")]);
        vault.fail_next(Operation::Load, 502);

        coordinator.create(&mut state).await.unwrap();

        assert_eq!(state.modal.kind(), ModalKind::Closed);
        assert_eq!(state.error.message(), Some("Failed to fetch secrets"));
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let (vault, coordinator, mut state) = setup();
        let secret = vault.seed(payload("db", &[("a", "1")]));
        coordinator.load(&mut state).await.unwrap();

        vault.fail_next(Operation::Delete, 403);
        let result = coordinator
            .remove(&mut state, &secret.id, Confirmation::Confirmed)
            .await;

        assert!(result.is_err());
        assert_eq!(state.error.message(), Some("Failed to delete secret"));
        assert_eq!(state.store.len(), 1);
    }

    #[tokio::test]
    async fn test_manual_reload_finishing_after_create_is_dropped() {
        let (vault, coordinator, mut state) = setup();
        coordinator.load(&mut state).await.unwrap();

        // Reload started before the create, answered with the empty list
        let manual = coordinator.begin_load(&mut state).unwrap();
        let stale = manual.execute(coordinator.api().as_ref()).await;

        fill_create(&mut state, "db", &[("a", "1")]);
        coordinator.create(&mut state).await.unwrap();
        assert_eq!(state.store.len(), 1);

        coordinator.complete(&mut state, stale).unwrap();

        assert_eq!(state.store.len(), vault.snapshot().len());
        assert_eq!(state.store.secrets()[0].name, "db");
        assert!(!state.store.is_loading());
        assert!(state.in_flight.is_idle());
    }

    #[tokio::test]
    async fn test_concurrent_load_is_rejected() {
        let (_vault, coordinator, mut state) = setup();
        let first = coordinator.begin_load(&mut state).unwrap();
        assert!(state.store.is_loading());
        assert!(coordinator.begin_load(&mut state).is_err());

        coordinator.run(&mut state, first).await.unwrap();
        assert!(!state.store.is_loading());
        assert!(coordinator.begin_load(&mut state).is_ok());
    }
}
