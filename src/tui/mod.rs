//! Terminal dashboard for browsing and editing vault secrets

mod app;
mod event;
pub mod terminal;
pub mod ui;

pub use app::{App, DialogField, Message, Popup};
pub use event::{Event, EventHandler};
pub use terminal::{TerminalGuard, enter_terminal, install_panic_hook};
