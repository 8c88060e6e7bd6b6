//! Connection configuration for the gateway.
//!
//! Configuration is loaded once at startup from (in priority order):
//! 1. Environment variables (`NEO4J_` prefix, e.g. `NEO4J_URI`)
//! 2. Config file (`graphgate.toml` unless another prefix is given)
//! 3. Defaults
//!
//! The resulting [`ConnectionConfig`] is immutable and handed to the
//! connection manager by the entry point.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// Environment variable prefix for connection settings.
pub const ENV_PREFIX: &str = "NEO4J";

/// Settings for reaching the graph database over Bolt.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Bolt endpoint, e.g. `bolt://localhost:7687`. Empty means "not configured".
    #[serde(default)]
    pub uri: String,

    /// Username for basic auth. Only used when a password is also present.
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic auth. Only used when a username is also present.
    #[serde(default)]
    pub password: Option<String>,

    /// Rows fetched per Bolt PULL.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    /// Upper bound on connecting plus the liveness probe.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_fetch_size() -> usize {
    256
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            username: None,
            password: None,
            fetch_size: default_fetch_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ConnectionConfig {
    /// Build a config for `uri` with no credentials and default tuning.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Load from an optional config file and `NEO4J_*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(environment());
        Self::from_builder(builder)
    }

    /// Deserialize from an already assembled config builder.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Self>())
            .map_err(|e| GatewayError::Configuration(e.to_string()))
    }

    /// The endpoint URI, or a configuration error if it is absent or blank.
    pub fn endpoint(&self) -> Result<&str> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return Err(GatewayError::Configuration(format!(
                "{ENV_PREFIX}_URI is not set; provide the database endpoint \
                 (for containers, pass it with -e {ENV_PREFIX}_URI=bolt://host:7687)"
            )));
        }
        Ok(uri)
    }

    /// Username and password, when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Password rendered for diagnostics: a fixed mask when set, `<unset>` otherwise.
    pub fn masked_password(&self) -> &'static str {
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => "********",
            _ => "<unset>",
        }
    }

    /// Log the effective connection settings. The password is never printed.
    pub fn log_summary(&self) {
        tracing::info!(
            uri = %self.uri,
            username = self.username.as_deref().unwrap_or("<unset>"),
            password = self.masked_password(),
            fetch_size = self.fetch_size,
            connect_timeout_secs = self.connect_timeout_secs,
            "Connection settings loaded"
        );
    }
}

/// `NEO4J_*` variables, with numeric values parsed rather than kept as strings.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("fetch_size", &self.fetch_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_source(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert!(config.uri.is_empty());
        assert_eq!(config.fetch_size, 256);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_load_from_environment() {
        let builder = config::Config::builder().add_source(env_source(&[
            ("NEO4J_URI", "bolt://memgraph:7687"),
            ("NEO4J_USERNAME", "memgraph"),
            ("NEO4J_PASSWORD", "secret"),
            ("NEO4J_CONNECT_TIMEOUT_SECS", "3"),
        ]));
        let config = ConnectionConfig::from_builder(builder).unwrap();

        assert_eq!(config.uri, "bolt://memgraph:7687");
        assert_eq!(config.credentials(), Some(("memgraph", "secret")));
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.fetch_size, 256);
    }

    #[test]
    fn test_numeric_environment_values() {
        let builder = config::Config::builder().add_source(env_source(&[
            ("NEO4J_URI", "bolt://localhost:7687"),
            ("NEO4J_FETCH_SIZE", "64"),
            ("NEO4J_USERNAME", "neo4j"),
            ("NEO4J_PASSWORD", "1234"),
        ]));
        let config = ConnectionConfig::from_builder(builder).unwrap();

        assert_eq!(config.fetch_size, 64);
        assert_eq!(config.credentials(), Some(("neo4j", "1234")));
    }

    #[test]
    fn test_environment_overrides_file() {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(
                "uri = \"bolt://from-file:7687\"\nfetch_size = 64",
                config::FileFormat::Toml,
            ))
            .add_source(env_source(&[("NEO4J_URI", "bolt://from-env:7687")]));
        let config = ConnectionConfig::from_builder(builder).unwrap();

        assert_eq!(config.uri, "bolt://from-env:7687");
        assert_eq!(config.fetch_size, 64);
    }

    #[test]
    fn test_missing_uri_is_configuration_error() {
        let config = ConnectionConfig::from_builder(config::Config::builder()).unwrap();
        assert!(matches!(
            config.endpoint(),
            Err(GatewayError::Configuration(_))
        ));

        let blank = ConnectionConfig::new("   ");
        assert!(matches!(blank.endpoint(), Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let only_user = ConnectionConfig {
            username: Some("neo4j".to_string()),
            ..ConnectionConfig::new("bolt://localhost:7687")
        };
        assert!(only_user.credentials().is_none());

        let empty_password =
            ConnectionConfig::new("bolt://localhost:7687").with_credentials("neo4j", "");
        assert!(empty_password.credentials().is_none());

        let both = ConnectionConfig::new("bolt://localhost:7687").with_credentials("neo4j", "pw");
        assert_eq!(both.credentials(), Some(("neo4j", "pw")));
    }

    #[test]
    fn test_debug_masks_password() {
        let config =
            ConnectionConfig::new("bolt://localhost:7687").with_credentials("neo4j", "hunter2");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("********"));
    }
}
