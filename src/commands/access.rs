use crate::commands::Cli;
use crate::env;
use crate::error::{Result, SvaultError};
use clap::Args;
use svault_core::VaultApi;
use svault_core::model::{AccessRequest, AccessedSecret};

#[derive(Debug, Args)]
pub struct AccessCommand {
    /// Name of the secret to read
    pub name: String,

    /// Access key (default: SVAULT_ACCESS_KEY)
    #[arg(long)]
    pub access_key: Option<String>,

    /// Secret key (default: SVAULT_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Print the secret as JSON
    #[arg(long)]
    pub json: bool,
}

impl AccessCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let request = self.request(
            env::SVAULT_ACCESS_KEY.clone(),
            env::SVAULT_SECRET_KEY.clone(),
        )?;
        let api = cli.api()?;
        let secret = fetch(&api, &request).await?;
        println!("{}", self.render(&secret)?);
        Ok(())
    }

    /// Build the lookup body, falling back to the environment for the keys
    fn request(
        &self,
        env_access_key: Option<String>,
        env_secret_key: Option<String>,
    ) -> Result<AccessRequest> {
        let access_key = self
            .access_key
            .clone()
            .or(env_access_key)
            .ok_or_else(|| SvaultError::MissingCredential {
                name: "access key".to_string(),
                help: "Pass --access-key or set SVAULT_ACCESS_KEY".to_string(),
            })?;
        let secret_key = self
            .secret_key
            .clone()
            .or(env_secret_key)
            .ok_or_else(|| SvaultError::MissingCredential {
                name: "secret key".to_string(),
                help: "Pass --secret-key or set SVAULT_SECRET_KEY".to_string(),
            })?;

        Ok(AccessRequest {
            access_key,
            secret_key,
            name: self.name.clone(),
        })
    }

    fn render(&self, secret: &AccessedSecret) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(secret)?);
        }
        Ok(secret
            .data
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

async fn fetch(api: &dyn VaultApi, request: &AccessRequest) -> Result<AccessedSecret> {
    tracing::debug!("Looking up secret '{}' by access key", request.name);
    Ok(api.access_secret(request).await?)
}
