//! Store and verifier configuration.
//!
//! # Invariants
//! - `SHORTCUTS_STORE_PATH` overrides the default save file location.
//! - Defaults keep URL checks bounded: 10 s timeout, 10 redirect hops.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the default save file path.
pub const STORE_PATH_ENV: &str = "SHORTCUTS_STORE_PATH";
/// File name used when no path is configured.
pub const DEFAULT_STORE_FILE_NAME: &str = "save.json";

const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// HTTP request settings for URL verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Whole-request timeout for one hop.
    pub timeout: Duration,
    /// Maximum redirect hops followed before giving up.
    pub max_redirects: u32,
    pub user_agent: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_VERIFY_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: format!("shortcuts/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Everything needed to open a file-backed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub verifier: VerifierConfig,
    /// Skip network requests; URLs only get the scheme prefix.
    pub offline: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verifier: VerifierConfig::default(),
            offline: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(default_store_path())
    }
}

/// Resolves the save file path from the environment or the working directory.
pub fn default_store_path() -> PathBuf {
    match std::env::var_os(STORE_PATH_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_STORE_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, VerifierConfig};
    use std::time::Duration;

    #[test]
    fn verifier_defaults_are_bounded() {
        let config = VerifierConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("shortcuts/"));
    }

    #[test]
    fn store_config_starts_online() {
        let config = StoreConfig::new("/tmp/save.json");
        assert!(!config.offline);
        assert_eq!(config.path.to_str(), Some("/tmp/save.json"));
    }
}
