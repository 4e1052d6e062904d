//! TUI command - Interactive secrets dashboard

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use svault_core::{Request, VaultApi};
use tokio::sync::mpsc;

use crate::commands::Cli;
use crate::error::{Result, SvaultError};
use crate::tui::ui;
use crate::tui::{
    App, Event, EventHandler, Message, TerminalGuard, enter_terminal, install_panic_hook,
};

#[derive(Debug, Args)]
pub struct TuiCommand;

impl TuiCommand {
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let coordinator = cli.coordinator()?;
        let api = coordinator.api();

        // Install panic hook to restore terminal on panic
        install_panic_hook();

        let mut terminal = enter_terminal()
            .map_err(|e| SvaultError::Terminal(format!("Failed to initialize terminal: {}", e)))?;
        let _guard = TerminalGuard;

        let mut app = App::new(coordinator);
        let mut events = EventHandler::new(Duration::from_millis(250));

        // Initial load
        app.refresh();

        while app.running {
            spawn_requests(&api, app.drain_requests(), &events.message_tx());

            terminal
                .draw(|frame| ui::render(&mut app, frame))
                .map_err(|e| SvaultError::Terminal(format!("Failed to render: {}", e)))?;

            match events.next().await {
                Some(Event::Key(key)) => app.handle_key(key),
                Some(Event::Mouse(mouse)) => app.handle_mouse(mouse),
                Some(Event::Tick) => {}
                Some(Event::Message(msg)) => app.handle_message(msg),
                None => break,
            }
        }

        // Guard will restore terminal when dropped
        Ok(())
    }
}

/// Run each request in the background and post its completion back to the
/// event loop
fn spawn_requests(
    api: &Arc<dyn VaultApi>,
    requests: Vec<Request>,
    tx: &mpsc::UnboundedSender<Event>,
) {
    for request in requests {
        let api = api.clone();
        let tx = tx.clone();
        tracing::debug!("Dispatching {} of {}", request.operation(), request.target());
        tokio::spawn(async move {
            let completion = request.execute(api.as_ref()).await;
            let _ = tx.send(Event::Message(Message::Completed(completion)));
        });
    }
}
