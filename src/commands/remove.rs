use crate::commands::{Cli, load_state};
use crate::error::{Result, SvaultError};
use clap::Args;
use demand::Confirm;
use svault_core::{AppState, Confirmation, RequestCoordinator, Secret};

#[derive(Debug, Args)]
#[command(visible_aliases = ["rm", "delete"])]
pub struct RemoveCommand {
    /// Secret id, or a name that matches exactly one secret
    pub reference: String,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl RemoveCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let mut state = load_state(&coordinator).await?;

        let deleted = self
            .execute(&coordinator, &mut state, |secret| self.confirm(secret))
            .await?;

        if deleted {
            let check = console::style("✓").green();
            println!("{check} Deleted secret {}", console::style(&self.reference).cyan());
        } else {
            println!("Cancelled");
        }
        Ok(())
    }

    fn confirm(&self, secret: &Secret) -> Result<Confirmation> {
        if self.yes {
            return Ok(Confirmation::Confirmed);
        }
        if !atty::is(atty::Stream::Stdin) {
            return Err(SvaultError::ConfirmationRequired);
        }

        let confirmed = Confirm::new(format!("Delete secret '{}' ({})?", secret.name, secret.id))
            .affirmative("Yes")
            .negative("No")
            .run()
            .map_err(|e| SvaultError::Prompt(e.to_string()))?;
        Ok(confirmed.into())
    }

    /// Resolve the secret and delete it once `confirm` agrees. Returns
    /// whether a delete was sent.
    async fn execute<F>(
        &self,
        coordinator: &RequestCoordinator,
        state: &mut AppState,
        confirm: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Secret) -> Result<Confirmation>,
    {
        let secret = state.store.find(&self.reference)?.clone();
        let confirmation = confirm(&secret)?;

        tracing::debug!("Removing secret {} ({:?})", secret.id, confirmation);
        Ok(coordinator.remove(state, &secret.id, confirmation).await?)
    }
}
