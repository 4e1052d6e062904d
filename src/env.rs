pub use std::env::*;
use std::{path::PathBuf, sync::LazyLock};

// Directory configuration
pub static HOME_DIR: LazyLock<PathBuf> = LazyLock::new(|| dirs::home_dir().unwrap_or_default());
pub static SVAULT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    var_path("SVAULT_CONFIG_DIR").unwrap_or_else(|| {
        #[cfg(unix)]
        let default = HOME_DIR.join(".config").join("svault");
        #[cfg(windows)]
        let default = HOME_DIR.join("AppData").join("Local").join("svault");
        default
    })
});

// Vault endpoint and credentials
pub static SVAULT_API_URL: LazyLock<Option<String>> = LazyLock::new(|| var_non_empty("SVAULT_API_URL"));
pub static SVAULT_TOKEN: LazyLock<Option<String>> = LazyLock::new(|| var_non_empty("SVAULT_TOKEN"));

// Access-key lookup credentials
pub static SVAULT_ACCESS_KEY: LazyLock<Option<String>> =
    LazyLock::new(|| var_non_empty("SVAULT_ACCESS_KEY"));
pub static SVAULT_SECRET_KEY: LazyLock<Option<String>> =
    LazyLock::new(|| var_non_empty("SVAULT_SECRET_KEY"));

// Helper functions for parsing environment variables
fn var_path(name: &str) -> Option<PathBuf> {
    var(name).map(PathBuf::from).ok()
}

fn var_non_empty(name: &str) -> Option<String> {
    var(name).ok().filter(|v| !v.is_empty())
}
