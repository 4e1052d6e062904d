//! Authoritative local cache of the vault's secrets.
//!
//! The cached list is only ever replaced wholesale with the server's current
//! list. There is no incremental patching: every mutation is followed by a
//! full reload, so the visible list cannot drift from server truth.
//!
//! Reloads are numbered when they are issued. A reload that finishes after a
//! newer one has been applied is dropped, so completions arriving out of
//! order never roll the list back.

use crate::api::VaultApi;
use crate::error::{Operation, Result, VaultError};
use crate::model::Secret;
use crate::state::ErrorState;

#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    secrets: Vec<Secret>,
    loading: bool,
    loaded: bool,
    issued: u64,
    applied: u64,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Whether a load is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether at least one load has succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &str) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.id == id)
    }

    /// Look a secret up by id, falling back to a unique name match
    pub fn find(&self, reference: &str) -> Result<&Secret> {
        if let Some(secret) = self.get(reference) {
            return Ok(secret);
        }
        let mut by_name = self.secrets.iter().filter(|s| s.name == reference);
        match (by_name.next(), by_name.next()) {
            (Some(secret), None) => Ok(secret),
            (None, _) => Err(VaultError::SecretNotFound {
                reference: reference.to_string(),
            }),
            (Some(_), Some(_)) => Err(VaultError::AmbiguousName {
                name: reference.to_string(),
                count: self.secrets.iter().filter(|s| s.name == reference).count(),
            }),
        }
    }

    pub(crate) fn mark_loading(&mut self) {
        self.loading = true;
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// Number the next reload. Later reloads always get larger numbers.
    pub(crate) fn next_reload(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply the reload numbered `seq`, unless a newer one already landed.
    /// Returns whether the result was applied.
    pub fn apply_reload(
        &mut self,
        seq: u64,
        result: Result<Vec<Secret>>,
        errors: &mut ErrorState,
    ) -> bool {
        if seq < self.applied {
            tracing::debug!("Dropping reload {} behind applied reload {}", seq, self.applied);
            return false;
        }
        self.applied = seq;
        self.apply(result, errors);
        true
    }

    /// Replace the cached list with `result`, or keep the previous list and
    /// record the failure. A successful load clears any prior error.
    pub fn apply(&mut self, result: Result<Vec<Secret>>, errors: &mut ErrorState) {
        match result {
            Ok(secrets) => {
                tracing::debug!("Loaded {} secrets", secrets.len());
                self.secrets = secrets;
                self.loaded = true;
                errors.dismiss();
            }
            Err(e) => {
                tracing::debug!("Loading secrets failed: {:?}", e);
                errors.set(Operation::Load.failure_message());
            }
        }
    }

    /// Fetch the full list from the vault and apply it
    pub async fn load(&mut self, api: &dyn VaultApi, errors: &mut ErrorState) -> Result<()> {
        self.mark_loading();
        let seq = self.next_reload();
        let result = api.list_secrets().await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_loading();
        self.apply_reload(seq, result, errors);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVault;
    use crate::model::SecretPayload;

    fn payload(name: &str) -> SecretPayload {
        SecretPayload {
            name: name.to_string(),
            description: String::new(),
            data: [("a".to_string(), "1".to_string())].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_load_replaces_list_and_clears_error() {
        let vault = MemoryVault::new();
        vault.seed(payload("one"));
        vault.seed(payload("two"));

        let mut store = SecretStore::new();
        let mut errors = ErrorState::default();
        errors.set("stale");

        store.load(&vault, &mut errors).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.is_loaded());
        assert!(!store.is_loading());
        assert!(errors.is_clean());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_list() {
        let vault = MemoryVault::new();
        vault.seed(payload("one"));

        let mut store = SecretStore::new();
        let mut errors = ErrorState::default();
        store.load(&vault, &mut errors).await.unwrap();

        vault.seed(payload("two"));
        vault.set_offline(true);
        let result = store.load(&vault, &mut errors).await;

        assert!(matches!(result, Err(VaultError::Network { .. })));
        assert_eq!(store.len(), 1);
        assert_eq!(errors.message(), Some("Failed to fetch secrets"));
    }

    #[test]
    fn test_older_reload_is_dropped() {
        let vault = MemoryVault::new();
        let mut store = SecretStore::new();
        let mut errors = ErrorState::default();

        let older = store.next_reload();
        vault.seed(payload("one"));
        let newer = store.next_reload();

        assert!(store.apply_reload(newer, Ok(vault.snapshot()), &mut errors));
        assert!(!store.apply_reload(older, Ok(Vec::new()), &mut errors));
        assert_eq!(store.len(), 1);

        // A dropped failure leaves the error slot alone too
        assert!(!store.apply_reload(
            older,
            Err(VaultError::Server {
                operation: Operation::Load,
                status: 500,
            }),
            &mut errors,
        ));
        assert!(errors.is_clean());
    }

    #[test]
    fn test_find_by_id_then_unique_name() {
        let vault = MemoryVault::new();
        let a = vault.seed(payload("db"));
        let b = vault.seed(payload("cache"));
        vault.seed(payload("cache"));

        let mut store = SecretStore::new();
        let mut errors = ErrorState::default();
        store.apply(Ok(vault.snapshot()), &mut errors);

        assert_eq!(store.find(&a.id).unwrap().name, "db");
        assert_eq!(store.find("db").unwrap().id, a.id);
        assert_eq!(store.find(&b.id).unwrap().id, b.id);
        assert!(matches!(
            store.find("cache"),
            Err(VaultError::AmbiguousName { count: 2, .. })
        ));
        assert!(matches!(
            store.find("nope"),
            Err(VaultError::SecretNotFound { .. })
        ));
    }
}
