//! REST boundary to the vault service

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{Operation, Result, VaultError};
use crate::model::{
    AccessRequest, AccessedSecret, HealthReport, Secret, SecretList, SecretPayload,
};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Operations the vault exposes over HTTP.
///
/// Any non-success status is a uniform failure of that operation; error
/// bodies are never parsed.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// `GET /secrets`
    async fn list_secrets(&self) -> Result<Vec<Secret>>;

    /// `GET /secrets/{id}`
    async fn get_secret(&self, id: &str) -> Result<Secret>;

    /// `POST /secrets`. The created secret is not needed by callers.
    async fn create_secret(&self, payload: &SecretPayload) -> Result<()>;

    /// `PUT /secrets/{id}`. The updated secret is not needed by callers.
    async fn update_secret(&self, id: &str, payload: &SecretPayload) -> Result<()>;

    /// `DELETE /secrets/{id}`
    async fn delete_secret(&self, id: &str) -> Result<()>;

    /// `GET /health` at the server root
    async fn health(&self) -> Result<HealthReport>;

    /// `POST /secrets/access`, authenticated by the key pair in the body
    async fn access_secret(&self, request: &AccessRequest) -> Result<AccessedSecret>;
}

pub struct HttpVaultApi {
    client: reqwest::Client,
    base_url: String,
    health_url: Url,
    token: Option<String>,
}

impl HttpVaultApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        // Normalize base_url (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| VaultError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        let health_url = parsed
            .join("/health")
            .map_err(|e| VaultError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("svault/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VaultError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            health_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn secrets_url(&self) -> String {
        format!("{}/secrets", self.base_url)
    }

    fn secret_url(&self, id: &str) -> String {
        format!("{}/secrets/{}", self.base_url, urlencoding::encode(id))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, operation: Operation, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| VaultError::Network {
            operation,
            details: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} failed with HTTP {}", operation, status);
            return Err(VaultError::Server {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(operation: Operation, response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| VaultError::Decode {
            operation,
            details: e.to_string(),
        })
    }
}

#[async_trait]
impl VaultApi for HttpVaultApi {
    async fn list_secrets(&self) -> Result<Vec<Secret>> {
        let url = self.secrets_url();
        tracing::debug!("Listing secrets from: {}", url);

        let response = self
            .send(Operation::Load, self.authorized(self.client.get(&url)))
            .await?;
        let list: SecretList = Self::decode(Operation::Load, response).await?;
        Ok(list.secrets)
    }

    async fn get_secret(&self, id: &str) -> Result<Secret> {
        let url = self.secret_url(id);
        tracing::debug!("Fetching secret from: {}", url);

        let response = self
            .send(Operation::Get, self.authorized(self.client.get(&url)))
            .await?;
        Self::decode(Operation::Get, response).await
    }

    async fn create_secret(&self, payload: &SecretPayload) -> Result<()> {
        tracing::debug!(
            "Creating secret '{}' with {} keys",
            payload.name,
            payload.data.len()
        );

        let builder = self.client.post(self.secrets_url()).json(payload);
        self.send(Operation::Create, self.authorized(builder))
            .await?;
        Ok(())
    }

    async fn update_secret(&self, id: &str, payload: &SecretPayload) -> Result<()> {
        tracing::debug!(
            "Updating secret {} ('{}') with {} keys",
            id,
            payload.name,
            payload.data.len()
        );

        let builder = self.client.put(self.secret_url(id)).json(payload);
        self.send(Operation::Update, self.authorized(builder))
            .await?;
        Ok(())
    }

    async fn delete_secret(&self, id: &str) -> Result<()> {
        tracing::debug!("Deleting secret {}", id);

        let builder = self.client.delete(self.secret_url(id));
        self.send(Operation::Delete, self.authorized(builder))
            .await?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthReport> {
        tracing::debug!("Checking vault health: {}", self.health_url);

        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| VaultError::Network {
                operation: Operation::Health,
                details: e.to_string(),
            })?;

        // An unhealthy server still answers with a report (HTTP 503)
        let status = response.status();
        match response.json::<HealthReport>().await {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(VaultError::Server {
                operation: Operation::Health,
                status: status.as_u16(),
            }),
            Err(e) => Err(VaultError::Decode {
                operation: Operation::Health,
                details: e.to_string(),
            }),
        }
    }

    async fn access_secret(&self, request: &AccessRequest) -> Result<AccessedSecret> {
        let url = format!("{}/access", self.secrets_url());
        tracing::debug!("Looking up secret '{}' by access key", request.name);

        let response = self
            .send(Operation::Access, self.client.post(&url).json(request))
            .await?;
        Self::decode(Operation::Access, response).await
    }
}
