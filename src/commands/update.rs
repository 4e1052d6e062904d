use crate::commands::{Cli, load_state, parse_pair};
use crate::error::Result;
use clap::Args;
use svault_core::{AppState, RequestCoordinator, VaultError};

#[derive(Debug, Args)]
#[command(visible_aliases = ["edit"])]
pub struct UpdateCommand {
    /// Secret id, or a name that matches exactly one secret
    pub reference: String,

    /// Free-form description (pass "" to clear)
    #[arg(short, long)]
    pub description: Option<String>,

    /// Rename the secret
    #[arg(long)]
    pub name: Option<String>,

    /// Key/value pair to add or overwrite (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub pairs: Vec<String>,

    /// Key to remove (repeatable)
    #[arg(short = 'u', long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

impl UpdateCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let mut state = load_state(&coordinator).await?;
        let name = self.execute(&coordinator, &mut state).await?;

        let check = console::style("✓").green();
        println!("{check} Updated secret {}", console::style(name).cyan());
        Ok(())
    }

    /// Open an edit dialog on the loaded secret, apply the changes and
    /// submit. Returns the secret's name after the update.
    async fn execute(
        &self,
        coordinator: &RequestCoordinator,
        state: &mut AppState,
    ) -> Result<String> {
        let pairs = self
            .pairs
            .iter()
            .map(|p| parse_pair(p))
            .collect::<Result<Vec<_>>>()?;

        let secret = state.store.find(&self.reference)?.clone();
        state.modal.open_edit(&secret)?;
        let form = state.modal.form_mut().ok_or(VaultError::NoDialogOpen)?;

        if let Some(name) = &self.name {
            form.name = name.clone();
        }
        if let Some(description) = &self.description {
            form.description = description.clone();
        }
        for key in &self.unset {
            if !form.editor.remove(key) {
                tracing::warn!("Key '{}' is not set on '{}'", key, secret.name);
            }
        }
        for (key, value) in &pairs {
            if !form.editor.add(key, value) {
                tracing::warn!("Skipping '{}': empty values are not stored", key);
            }
        }
        let name = form.name.clone();

        tracing::debug!("Updating secret {}", secret.id);
        coordinator.update(state).await?;
        Ok(name)
    }
}
