//! Wire and domain types shared by the store, the dialogs and the REST client

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder rendered in place of every secret value
pub const MASK: &str = "••••••••";

/// Key/value payload of a secret. Keys are unique by construction.
pub type SecretData = IndexMap<String, String>;

/// A secret as returned by the vault. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SecretData,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Secret {
    /// Description, or None when the server sent an empty one
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn key_count(&self) -> usize {
        self.data.len()
    }

    /// Copy with every value replaced by [`MASK`]
    pub fn masked(&self) -> Secret {
        Secret {
            data: self
                .data
                .keys()
                .map(|k| (k.clone(), MASK.to_string()))
                .collect(),
            ..self.clone()
        }
    }
}

/// Body of `GET /secrets`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub secrets: Vec<Secret>,
}

/// Body of `POST /secrets` and `PUT /secrets/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretPayload {
    pub name: String,
    pub description: String,
    pub data: SecretData,
}

/// Body of `POST /secrets/access`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub access_key: String,
    pub secret_key: String,
    pub name: String,
}

/// Secret returned by the access-key lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessedSecret {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SecretData,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
