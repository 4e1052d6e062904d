use crate::commands::{Cli, load_state};
use crate::error::Result;
use clap::Args;
use svault_core::{RequestCoordinator, Secret};

#[derive(Debug, Args)]
#[command(visible_aliases = ["show"])]
pub struct GetCommand {
    /// Secret id, or a name that matches exactly one secret
    pub reference: String,

    /// Print the stored values instead of the mask
    #[arg(short = 'V', long)]
    pub values: bool,

    /// Print the secret as JSON
    #[arg(long)]
    pub json: bool,
}

impl GetCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let secret = self.fetch(&coordinator).await?;
        println!("{}", self.render(&secret)?);
        Ok(())
    }

    /// Resolve the reference against the listing, then read the secret itself
    async fn fetch(&self, coordinator: &RequestCoordinator) -> Result<Secret> {
        let state = load_state(coordinator).await?;
        let id = state.store.find(&self.reference)?.id.clone();
        tracing::debug!("Fetching secret {}", id);
        Ok(coordinator.api().get_secret(&id).await?)
    }

    fn render(&self, secret: &Secret) -> Result<String> {
        let secret = if self.values {
            secret.clone()
        } else {
            secret.masked()
        };

        if self.json {
            return Ok(serde_json::to_string_pretty(&secret)?);
        }

        let mut lines = vec![format!(
            "{} {}",
            console::style(&secret.name).cyan().bold(),
            console::style(format!("({})", secret.id)).dim()
        )];
        if let Some(description) = secret.description() {
            lines.push(description.to_string());
        }
        lines.push(format!(
            "{} {}",
            console::style("created:").dim(),
            secret.created_at.to_rfc3339()
        ));
        if let Some(updated_at) = secret.updated_at {
            lines.push(format!(
                "{} {}",
                console::style("updated:").dim(),
                updated_at.to_rfc3339()
            ));
        }
        lines.push(String::new());
        if secret.data.is_empty() {
            lines.push(console::style("(no keys)").dim().to_string());
        }
        for (key, value) in &secret.data {
            lines.push(format!("{}={}", key, value));
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use clap::Parser;
    use svault_core::memory::MemoryVault;
    use svault_core::{MASK, Operation, SecretPayload, VaultError};

    use crate::commands::Commands;
    use crate::error::SvaultError;

    fn command(args: &[&str]) -> GetCommand {
        let mut argv = vec!["svault", "get"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Some(Commands::Get(cmd)) => cmd,
            _ => unreachable!(),
        }
    }

    fn setup() -> (Arc<MemoryVault>, RequestCoordinator) {
        let vault = Arc::new(MemoryVault::new());
        vault.seed(SecretPayload {
            name: "db".to_string(),
            description: String::new(),
            data: [("pass".to_string(), "hunter2".to_string())]
                .into_iter()
                .collect(),
        });
        let coordinator = RequestCoordinator::new(vault.clone());
        (vault, coordinator)
    }

    #[tokio::test]
    async fn test_get_by_name_masks_values() {
        console::set_colors_enabled(false);
        let (vault, coordinator) = setup();
        let cmd = command(&["db"]);

        let secret = cmd.fetch(&coordinator).await.unwrap();
        let output = cmd.render(&secret).unwrap();

        assert_eq!(vault.calls(Operation::Get), 1);
        assert!(output.contains(&format!("pass={}", MASK)));
        assert!(!output.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_get_by_id_with_values() {
        let (_vault, coordinator) = setup();
        let cmd = command(&["sec-0001", "--values", "--json"]);

        let secret = cmd.fetch(&coordinator).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&cmd.render(&secret).unwrap()).unwrap();

        assert_eq!(parsed["data"]["pass"], "hunter2");
    }

    #[tokio::test]
    async fn test_get_unknown_reference() {
        let (vault, coordinator) = setup();
        let result = command(&["nope"]).fetch(&coordinator).await;

        assert!(matches!(
            result,
            Err(SvaultError::Vault(VaultError::SecretNotFound { .. }))
        ));
        assert_eq!(vault.calls(Operation::Get), 0);
    }
}
