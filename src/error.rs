use miette::Diagnostic;
use svault_core::VaultError;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum SvaultError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Failed to read configuration file")]
    #[diagnostic(
        code(svault::config::read_failed),
        help("Ensure the config file is readable: {}", path.display())
    )]
    ConfigReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in configuration file")]
    #[diagnostic(
        code(svault::config::invalid_toml),
        help("Check the TOML syntax in {}", path.display())
    )]
    ConfigParseError {
        path: std::path::PathBuf,
        #[source]
        source: toml_edit::de::Error,
    },

    // ========================================================================
    // Command Errors
    // ========================================================================
    #[error("Invalid key/value pair: {pair}")]
    #[diagnostic(
        code(svault::command::invalid_pair),
        help("Pass pairs as KEY=VALUE, e.g. --set user=root")
    )]
    InvalidPair { pair: String },

    #[error("Refusing to delete without confirmation")]
    #[diagnostic(
        code(svault::command::confirmation_required),
        help("stdin is not a terminal; pass --yes to delete non-interactively")
    )]
    ConfirmationRequired,

    #[error("Missing credential: {name}")]
    #[diagnostic(code(svault::command::missing_credential), help("{help}"))]
    MissingCredential { name: String, help: String },

    #[error("Failed to show prompt: {0}")]
    #[diagnostic(code(svault::command::prompt_failed))]
    Prompt(String),

    // ========================================================================
    // Terminal Errors
    // ========================================================================
    #[error("Terminal error: {0}")]
    #[diagnostic(code(svault::tui::terminal))]
    Terminal(String),

    // ========================================================================
    // Vault Errors
    // ========================================================================
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vault(#[from] VaultError),

    #[error("JSON error: {0}")]
    #[diagnostic(code(svault::json::error))]
    Json(String),
}

impl From<serde_json::Error> for SvaultError {
    fn from(err: serde_json::Error) -> Self {
        SvaultError::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SvaultError>;
