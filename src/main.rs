use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svault::commands::{Cli, tui::TuiCommand};

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    // Initialize rustls crypto provider for the HTTPS client
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    // Handle --no-color flag
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Initialize tracing. Log lines would tear the dashboard's alternate
    // screen, so the TUI stays quiet unless asked.
    let default_filter = if cli.verbose {
        "svault=debug,svault_core=debug"
    } else if cli.is_tui() {
        "off"
    } else {
        "svault=info,svault_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Some(command) => command.run(&cli).await,
        None => TuiCommand.run(&cli).await,
    };
    result.map_err(miette::Report::new)
}
