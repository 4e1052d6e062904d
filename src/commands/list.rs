use crate::commands::{Cli, load_state};
use crate::error::Result;
use clap::Args;
use svault_core::Secret;
use tabled::settings::{
    Color, Format, Modify, Style, Width,
    object::{Columns, Rows},
};
use tabled::{Table, Tabled};

#[derive(Debug, Args)]
#[command(visible_aliases = ["ls"])]
pub struct ListCommand {
    /// Print the secrets as JSON (values masked)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Tabled)]
struct SecretRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Keys")]
    keys: usize,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Secret> for SecretRow {
    fn from(secret: &Secret) -> Self {
        Self {
            name: secret.name.clone(),
            id: secret.id.clone(),
            keys: secret.key_count(),
            created: secret.created_at.format("%Y-%m-%d %H:%M").to_string(),
            description: secret.description().unwrap_or("").to_string(),
        }
    }
}

impl ListCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let state = load_state(&coordinator).await?;
        let secrets = state.store.secrets();
        tracing::debug!("Loaded {} secrets", secrets.len());

        if self.json {
            println!("{}", render_json(secrets)?);
            return Ok(());
        }

        if secrets.is_empty() {
            println!("No secrets found");
            return Ok(());
        }

        println!("{}", render_table(secrets));
        Ok(())
    }
}

fn render_json(secrets: &[Secret]) -> Result<String> {
    let masked: Vec<Secret> = secrets.iter().map(Secret::masked).collect();
    Ok(serde_json::to_string_pretty(&masked)?)
}

fn render_table(secrets: &[Secret]) -> String {
    let rows: Vec<SecretRow> = secrets.iter().map(SecretRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::empty());

    // Apply colors only if enabled
    if console::colors_enabled() {
        table.with(
            Modify::new(Rows::first())
                .with(Color::FG_BRIGHT_BLUE)
                .with(Format::content(|s| format!("\x1b[1m{}\x1b[0m", s))),
        );
    }

    table.with(Modify::new(Columns::last()).with(Width::wrap(40)));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use svault_core::memory::MemoryVault;
    use svault_core::{MASK, RequestCoordinator, SecretPayload};

    async fn seeded() -> Vec<Secret> {
        let vault = Arc::new(MemoryVault::new());
        vault.seed(SecretPayload {
            name: "db".to_string(),
            description: "primary database".to_string(),
            data: [
                ("user".to_string(), "root".to_string()),
                ("pass".to_string(), "hunter2".to_string()),
            ]
            .into_iter()
            .collect(),
        });
        let state = load_state(&RequestCoordinator::new(vault)).await.unwrap();
        state.store.secrets().to_vec()
    }

    #[tokio::test]
    async fn test_table_lists_metadata_without_values() {
        console::set_colors_enabled(false);
        let table = render_table(&seeded().await);

        assert!(table.contains("Name"));
        assert!(table.contains("db"));
        assert!(table.contains("primary database"));
        assert!(table.contains("sec-0001"));
        assert!(!table.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_json_masks_values() {
        let json = render_json(&seeded().await).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["name"], "db");
        assert_eq!(parsed[0]["data"]["pass"], MASK);
        assert!(!json.contains("hunter2"));
    }
}
