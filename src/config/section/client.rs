//! `[client]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [client]
//! base_url = "https://adventofcode.com"
//! session_env = "AOC_SESSION"   # Environment variable holding the session cookie
//! ```

use serde::{Deserialize, Serialize};

/// Puzzle platform client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Platform base URL.
    pub base_url: String,

    /// Name of the environment variable with the session token.
    pub session_env: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://adventofcode.com".into(),
            session_env: "AOC_SESSION".into(),
            user_agent: concat!("aockit/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    /// Read the session token from the configured environment variable.
    pub fn session(&self) -> Option<String> {
        std::env::var(&self.session_env)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_client_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.client.base_url, "https://adventofcode.com");
        assert_eq!(config.client.session_env, "AOC_SESSION");
    }

    #[test]
    fn test_client_session_missing_env() {
        let config = test_parse_config("[client]\nsession_env = \"AOCKIT_TEST_UNSET_SESSION\"");
        assert_eq!(config.client.session(), None);
    }
}
