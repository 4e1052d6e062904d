use crate::commands::Cli;
use crate::error::Result;
use clap::Args;
use svault_core::{VaultApi, VaultError};

#[derive(Debug, Args)]
pub struct HealthCommand;

impl HealthCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let api = cli.api()?;
        tracing::debug!("Checking health of {}", api.base_url());
        check(&api).await?;

        let check = console::style("✓").green();
        println!("{check} Vault at {} is healthy", api.base_url());
        Ok(())
    }
}

async fn check(api: &dyn VaultApi) -> Result<()> {
    let report = api.health().await?;
    if report.is_healthy() {
        Ok(())
    } else {
        Err(VaultError::Unhealthy {
            details: report.error.unwrap_or(report.status),
        }
        .into())
    }
}
