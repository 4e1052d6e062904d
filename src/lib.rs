// Library interface for svault
pub mod commands;
pub mod env;
pub mod error;
pub mod settings;
pub mod tui;

// Re-export commonly used items
pub use error::{Result, SvaultError};
