use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Result of loading a `ClientConfig`
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Optional client settings handed to the `ClientFactory`
///
/// The provider never looks inside; it only tracks whether the same `Arc`
/// is passed on each render.
///
/// ```toml
/// base_url = "https://api.dolivroo.test/v1"
/// timeout = 15
/// sandbox = true
///
/// [headers]
/// x-client = "storefront"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Override of the API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds, enforced by the client
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Target the sandbox environment
    #[serde(default)]
    pub sandbox: bool,
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loading client config from: {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_toml_str_full() {
        let config = ClientConfig::from_toml_str(
            r#"
base_url = "https://api.dolivroo.test/v1"
timeout = 15
sandbox = true

[headers]
x-client = "storefront"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://api.dolivroo.test/v1"));
        assert_eq!(config.timeout, Some(15));
        assert!(config.sandbox);
        assert_eq!(config.headers.get("x-client").map(String::as_str), Some("storefront"));
    }

    #[test]
    fn test_from_toml_str_empty_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_from_toml_str_rejects_bad_types() {
        let result = ClientConfig::from_toml_str("timeout = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://127.0.0.1:8080\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(!config.sandbox);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::from_file(&dir.path().join("config.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
