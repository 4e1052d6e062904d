use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use svault_core::{AppState, HttpVaultApi, RequestCoordinator};

use crate::error::{Result, SvaultError};
use crate::settings::{CliSnapshot, Settings};

pub mod access;
pub mod create;
pub mod get;
pub mod health;
pub mod list;
pub mod remove;
pub mod tui;
pub mod update;
pub mod version;

#[derive(Parser)]
#[command(name = "svault")]
#[command(about = "Terminal client for the secrets vault", long_about = None)]
#[command(version)]
#[command(help_expected = true)]
pub struct Cli {
    /// Base URL of the vault API (default: http://localhost:8080/api/v1)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding config.toml (default: ~/.config/svault)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Bearer token for the secrets API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn snapshot(&self) -> CliSnapshot {
        CliSnapshot {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            config_dir: self.config_dir.clone(),
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.snapshot())
    }

    pub fn api(&self) -> Result<HttpVaultApi> {
        let settings = self.settings()?;
        Ok(HttpVaultApi::new(&settings.api_url, settings.token)?)
    }

    pub fn coordinator(&self) -> Result<RequestCoordinator> {
        Ok(RequestCoordinator::new(Arc::new(self.api()?)))
    }

    /// Whether the dashboard is what will run
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui(_)))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a secret with an access key pair
    Access(access::AccessCommand),

    /// Create a new secret
    Create(create::CreateCommand),

    /// Show one secret
    Get(get::GetCommand),

    /// Check that the vault server is healthy
    Health(health::HealthCommand),

    /// List all secrets
    List(list::ListCommand),

    /// Delete a secret
    Remove(remove::RemoveCommand),

    /// Interactive dashboard for managing secrets (default)
    Tui(tui::TuiCommand),

    /// Edit an existing secret
    Update(update::UpdateCommand),

    /// Show version information
    Version(version::VersionCommand),
}

impl Commands {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        match self {
            Commands::Version(cmd) => cmd.run(cli).await,
            Commands::Access(cmd) => cmd.run(cli).await,
            Commands::Create(cmd) => cmd.run(cli).await,
            Commands::Get(cmd) => cmd.run(cli).await,
            Commands::Health(cmd) => cmd.run(cli).await,
            Commands::List(cmd) => cmd.run(cli).await,
            Commands::Remove(cmd) => cmd.run(cli).await,
            Commands::Tui(cmd) => cmd.run(cli).await,
            Commands::Update(cmd) => cmd.run(cli).await,
        }
    }
}

/// Fresh state with the store loaded from the vault
pub async fn load_state(coordinator: &RequestCoordinator) -> Result<AppState> {
    let mut state = AppState::new();
    coordinator.load(&mut state).await?;
    Ok(state)
}

/// Parse a `KEY=VALUE` argument. Only the first `=` splits, so values may
/// contain `=`.
pub fn parse_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(SvaultError::InvalidPair {
            pair: pair.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_tui() {
        let cli = Cli::parse_from(["svault"]);
        assert!(cli.command.is_none());
        assert!(cli.is_tui());

        let cli = Cli::parse_from(["svault", "list"]);
        assert!(!cli.is_tui());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["svault", "list", "--api-url", "http://vault/api/v1"]);
        assert_eq!(cli.snapshot().api_url.as_deref(), Some("http://vault/api/v1"));
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("user=root").unwrap(),
            ("user".to_string(), "root".to_string())
        );
        assert_eq!(
            parse_pair("url=postgres://h/db?a=b").unwrap(),
            ("url".to_string(), "postgres://h/db?a=b".to_string())
        );
        assert_eq!(
            parse_pair("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(matches!(
            parse_pair("novalue"),
            Err(SvaultError::InvalidPair { .. })
        ));
        assert!(matches!(
            parse_pair("=x"),
            Err(SvaultError::InvalidPair { .. })
        ));
    }
}
