//! Event handling for TUI
//!
//! Terminal input, a periodic tick and messages from background requests
//! are merged into one channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::tui::app::Message;

/// Events that can occur in the TUI
#[derive(Debug)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),
    /// Mouse input event
    Mouse(MouseEvent),
    /// Periodic tick, also sent on resize to trigger a redraw
    Tick,
    /// Async message from background tasks
    Message(Message),
}

/// Handles event collection from multiple sources
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input_tx = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticker = tokio::time::interval(tick_rate);

            loop {
                let event = tokio::select! {
                    _ = ticker.tick() => Event::Tick,
                    maybe = reader.next() => match maybe {
                        // Ignore key release/repeat events reported on some platforms
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Some(Ok(CrosstermEvent::Mouse(mouse))) => Event::Mouse(mouse),
                        Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Tick,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::debug!("Terminal input error: {}", e);
                            break;
                        }
                        None => break,
                    },
                };
                if input_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Get a sender for sending messages from async tasks
    pub fn message_tx(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
