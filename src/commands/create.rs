use crate::commands::{Cli, parse_pair};
use crate::error::Result;
use clap::Args;
use svault_core::{AppState, RequestCoordinator, VaultError};

#[derive(Debug, Args)]
#[command(visible_aliases = ["new", "add"])]
pub struct CreateCommand {
    /// Name of the new secret
    pub name: String,

    /// Free-form description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Key/value pair to store (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub pairs: Vec<String>,
}

impl CreateCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let mut state = AppState::new();
        self.execute(&coordinator, &mut state).await?;

        let check = console::style("✓").green();
        let styled_name = console::style(&self.name).cyan();
        match state.store.find(&self.name) {
            Ok(secret) => println!(
                "{check} Created secret {styled_name} {}",
                console::style(format!("({})", secret.id)).dim()
            ),
            Err(_) => println!("{check} Created secret {styled_name}"),
        }
        Ok(())
    }

    /// Compose the secret in a create dialog and submit it
    async fn execute(&self, coordinator: &RequestCoordinator, state: &mut AppState) -> Result<()> {
        let pairs = self
            .pairs
            .iter()
            .map(|p| parse_pair(p))
            .collect::<Result<Vec<_>>>()?;

        state.modal.open_create()?;
        let form = state.modal.form_mut().ok_or(VaultError::NoDialogOpen)?;
        form.name = self.name.clone();
        form.description = self.description.clone().unwrap_or_default();
        for (key, value) in &pairs {
            if !form.editor.add(key, value) {
                tracing::warn!("Skipping '{}': empty values are not stored", key);
            }
        }

        tracing::debug!("Creating secret '{}'", self.name);
        coordinator.create(state).await?;
        Ok(())
    }
}
