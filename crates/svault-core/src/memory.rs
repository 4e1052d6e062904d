//! In-process vault used by tests.
//!
//! Behaves like the real service for the calls the client makes: ids and
//! timestamps are assigned server-side, unknown ids answer 404. Failures can
//! be injected per operation, and every call is counted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;

use crate::api::VaultApi;
use crate::error::{Operation, Result, VaultError};
use crate::model::{AccessRequest, AccessedSecret, HealthReport, Secret, SecretPayload};

#[derive(Default)]
pub struct MemoryVault {
    secrets: Mutex<IndexMap<String, Secret>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    unhealthy: AtomicBool,
    failures: Mutex<HashMap<Operation, u16>>,
    calls: Mutex<HashMap<Operation, usize>>,
    access_keys: Mutex<Option<(String, String)>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret directly, bypassing call counting and failures
    pub fn seed(&self, payload: SecretPayload) -> Secret {
        let id = format!("sec-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = Utc::now();
        let secret = Secret {
            id: id.clone(),
            user_id: Some("user-1".to_string()),
            name: payload.name,
            description: Some(payload.description),
            data: payload.data,
            created_at: now,
            updated_at: Some(now),
        };
        self.secrets.lock().unwrap().insert(id, secret.clone());
        secret
    }

    /// Current server-side contents
    pub fn snapshot(&self) -> Vec<Secret> {
        self.secrets.lock().unwrap().values().cloned().collect()
    }

    /// Every call fails as if the server were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// The next call of `operation` answers with `status`
    pub fn fail_next(&self, operation: Operation, status: u16) {
        self.failures.lock().unwrap().insert(operation, status);
    }

    /// Accept this access/secret key pair for the access-key lookup
    pub fn allow_access_keys(&self, access_key: &str, secret_key: &str) {
        *self.access_keys.lock().unwrap() = Some((access_key.to_string(), secret_key.to_string()));
    }

    pub fn calls(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    fn enter(&self, operation: Operation) -> Result<()> {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(VaultError::Network {
                operation,
                details: "connection refused".to_string(),
            });
        }
        if let Some(status) = self.failures.lock().unwrap().remove(&operation) {
            return Err(VaultError::Server { operation, status });
        }
        Ok(())
    }
}

#[async_trait]
impl VaultApi for MemoryVault {
    async fn list_secrets(&self) -> Result<Vec<Secret>> {
        self.enter(Operation::Load)?;
        Ok(self.snapshot())
    }

    async fn get_secret(&self, id: &str) -> Result<Secret> {
        self.enter(Operation::Get)?;
        self.secrets
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(VaultError::Server {
                operation: Operation::Get,
                status: 404,
            })
    }

    async fn create_secret(&self, payload: &SecretPayload) -> Result<()> {
        self.enter(Operation::Create)?;
        self.seed(payload.clone());
        Ok(())
    }

    async fn update_secret(&self, id: &str, payload: &SecretPayload) -> Result<()> {
        self.enter(Operation::Update)?;
        let mut secrets = self.secrets.lock().unwrap();
        let Some(secret) = secrets.get_mut(id) else {
            return Err(VaultError::Server {
                operation: Operation::Update,
                status: 404,
            });
        };
        secret.name = payload.name.clone();
        secret.description = Some(payload.description.clone());
        secret.data = payload.data.clone();
        secret.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_secret(&self, id: &str) -> Result<()> {
        self.enter(Operation::Delete)?;
        match self.secrets.lock().unwrap().shift_remove(id) {
            Some(_) => Ok(()),
            None => Err(VaultError::Server {
                operation: Operation::Delete,
                status: 404,
            }),
        }
    }

    async fn health(&self) -> Result<HealthReport> {
        self.enter(Operation::Health)?;
        if self.unhealthy.load(Ordering::SeqCst) {
            return Ok(HealthReport {
                status: "unhealthy".to_string(),
                error: Some("database connection failed".to_string()),
            });
        }
        Ok(HealthReport {
            status: "healthy".to_string(),
            error: None,
        })
    }

    async fn access_secret(&self, request: &AccessRequest) -> Result<AccessedSecret> {
        self.enter(Operation::Access)?;
        let allowed = self.access_keys.lock().unwrap().clone();
        if allowed != Some((request.access_key.clone(), request.secret_key.clone())) {
            return Err(VaultError::Server {
                operation: Operation::Access,
                status: 401,
            });
        }
        self.secrets
            .lock()
            .unwrap()
            .values()
            .find(|s| s.name == request.name)
            .map(|s| AccessedSecret {
                name: s.name.clone(),
                description: s.description.clone(),
                data: s.data.clone(),
            })
            .ok_or(VaultError::Server {
                operation: Operation::Access,
                status: 404,
            })
    }
}
