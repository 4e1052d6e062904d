// Settings management for svault
//
// Settings are merged from, lowest to highest precedence:
// 1. Default values
// 2. Config file ($SVAULT_CONFIG_DIR/config.toml)
// 3. Environment variables
// 4. CLI flags

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use svault_core::DEFAULT_API_URL;

use crate::env;
use crate::error::{Result, SvaultError};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of the optional config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    /// Base URL of the vault API (e.g. https://vault.example.com/api/v1)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Bearer token sent with every secrets call
    #[serde(default)]
    pub token: Option<String>,
}

/// Values taken from the environment
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            api_url: env::SVAULT_API_URL.clone(),
            token: env::SVAULT_TOKEN.clone(),
        }
    }
}

/// CLI snapshot captured from parsed command-line arguments
#[derive(Debug, Clone, Default)]
pub struct CliSnapshot {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub config_dir: Option<PathBuf>,
}

/// Effective settings after merging every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub config_path: PathBuf,
}

impl Settings {
    pub fn load(cli: &CliSnapshot) -> Result<Self> {
        let config_dir = cli
            .config_dir
            .clone()
            .unwrap_or_else(|| env::SVAULT_CONFIG_DIR.clone());
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let file = Self::read_file(&config_path)?;

        let settings = Self::merge(file, EnvSnapshot::capture(), cli, config_path);
        tracing::debug!(
            "Using vault API at {} (token: {})",
            settings.api_url,
            if settings.token.is_some() { "set" } else { "none" }
        );
        Ok(settings)
    }

    /// Read the config file. A missing file is the same as an empty one.
    pub fn read_file(path: &Path) -> Result<FileSettings> {
        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(FileSettings::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SvaultError::ConfigReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml_edit::de::from_str(&content).map_err(|source| SvaultError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge(
        file: FileSettings,
        env: EnvSnapshot,
        cli: &CliSnapshot,
        config_path: PathBuf,
    ) -> Self {
        let api_url = cli
            .api_url
            .clone()
            .or(env.api_url)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = cli
            .token
            .clone()
            .or(env.token)
            .or(file.token)
            .filter(|t| !t.is_empty());

        Self {
            api_url,
            token,
            config_path,
        }
    }
}
