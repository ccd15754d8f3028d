// Configuration structs

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use super::constants::*;

/// Configuration that could not be turned into a usable value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where the inference backend lives and which model it should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Hostname, or a full `http(s)://host` prefix
    pub host: String,
    pub port: u16,
    /// Model identifier passed on every request
    pub name: String,
    /// Bound on a single inference call
    pub timeout: Duration,
}

impl ModelConfig {
    /// Base URL of the backend, e.g. `http://ollama:11434`.
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.contains("://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MODEL_HOST.to_string(),
            port: DEFAULT_MODEL_PORT,
            name: DEFAULT_MODEL_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
        }
    }
}

/// Gateway configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8000")
    pub bind_address: String,
    /// Chat log location (`sqlite://path`, `sqlite::memory:` or a plain path)
    pub database_url: String,
    pub model: ModelConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDR.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            model: ModelConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unset or blank variables fall back to their defaults. Variables that
    /// are set but do not parse are rejected rather than silently replaced.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let model = ModelConfig {
            host: var("MODEL_HOST").unwrap_or_else(|| DEFAULT_MODEL_HOST.to_string()),
            port: parse_var(
                "MODEL_PORT",
                var("MODEL_PORT"),
                DEFAULT_MODEL_PORT,
                "a port number",
            )?,
            name: var("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            timeout: Duration::from_secs(parse_var(
                "MODEL_TIMEOUT_SECS",
                var("MODEL_TIMEOUT_SECS"),
                DEFAULT_MODEL_TIMEOUT_SECS,
                "a whole number of seconds",
            )?),
        };

        if model.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "MODEL_TIMEOUT_SECS",
                expected: "greater than zero",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_address: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            model,
        })
    }
}

fn parse_var<T: FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.model.base_url(), "http://ollama:11434");
        assert_eq!(config.model.name, "llama3.2");
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite:///var/lib/chat/logs.db"),
            ("MODEL_HOST", "localhost"),
            ("MODEL_PORT", "9000"),
            ("MODEL_NAME", "mistral"),
            ("MODEL_TIMEOUT_SECS", "5"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite:///var/lib/chat/logs.db");
        assert_eq!(config.model.base_url(), "http://localhost:9000");
        assert_eq!(config.model.name, "mistral");
        assert_eq!(config.model.timeout, Duration::from_secs(5));
        assert_eq!(config.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            GatewayConfig::from_lookup(lookup_from(&[("MODEL_HOST", "  "), ("MODEL_PORT", "")]))
                .unwrap();
        assert_eq!(config.model.host, DEFAULT_MODEL_HOST);
        assert_eq!(config.model.port, DEFAULT_MODEL_PORT);
    }

    #[test]
    fn test_unparseable_port_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("MODEL_PORT", "eleven")])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("MODEL_PORT"), "got: {message}");
        assert!(message.contains("eleven"), "got: {message}");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = GatewayConfig::from_lookup(lookup_from(&[("MODEL_TIMEOUT_SECS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let model = ModelConfig {
            host: "https://models.internal/".to_string(),
            port: 443,
            ..Default::default()
        };
        assert_eq!(model.base_url(), "https://models.internal:443");
    }
}
