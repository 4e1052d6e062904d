use crate::commands::Cli;
use crate::error::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(visible_aliases = ["v"])]
pub struct VersionCommand;

impl VersionCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        if cli.verbose {
            let settings = cli.settings()?;
            println!("core   {}", svault_core::VERSION);
            println!("api    {}", settings.api_url);
            println!("config {}", settings.config_path.display());
        }
        Ok(())
    }
}
