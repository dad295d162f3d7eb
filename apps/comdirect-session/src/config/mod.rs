//! Configuration for the session engine.
//!
//! The engine itself only consumes already-built records ([`Credentials`],
//! [`EndpointTable`], the venue allow-list). This module is the loader used
//! by the orchestration layer to build them from YAML, with environment
//! variable interpolation so secrets stay out of the file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use comdirect_session::config::load_config;
//!
//! let config = load_config(Some("comdirect.yaml"))?;
//! println!("token endpoint: {}", config.endpoints.oauth_token);
//! ```

mod credentials;
pub mod endpoints;
mod observability;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use credentials::Credentials;
pub use endpoints::EndpointTable;
pub use observability::{LoggingConfig, ObservabilityConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// OAuth credentials.
    pub credentials: Credentials,
    /// Endpoint URL table.
    #[serde(default)]
    pub endpoints: EndpointTable,
    /// Trading settings.
    #[serde(default)]
    pub trading: TradingConfig,
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Manual TAN approval gate settings.
    #[serde(default)]
    pub approval: ApprovalConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl SessionConfig {
    /// Build a configuration with default settings.
    #[must_use]
    pub fn new(credentials: Credentials, endpoints: EndpointTable) -> Self {
        Self {
            credentials,
            endpoints,
            trading: TradingConfig::default(),
            http: HttpConfig::default(),
            approval: ApprovalConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Replace the venue allow-list.
    #[must_use]
    pub fn with_possible_venues<I, S>(mut self, venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trading.possible_venues = venues.into_iter().map(Into::into).collect();
        self
    }
}

/// Trading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Venue names eligible for quoting and order routing.
    #[serde(default = "default_possible_venues")]
    pub possible_venues: Vec<String>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            possible_venues: default_possible_venues(),
        }
    }
}

fn default_possible_venues() -> Vec<String> {
    vec!["Xetra".to_string(), "Tradegate".to_string()]
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

/// TAN approval gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Seconds the delay-based gate waits for the operator.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl ApprovalConfig {
    /// Wait used by the delay-based gate.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
        }
    }
}

const fn default_delay_secs() -> u64 {
    30
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "comdirect.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<SessionConfig, ConfigError> {
    let path = path.unwrap_or("comdirect.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<SessionConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: SessionConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &SessionConfig) -> Result<(), ConfigError> {
    let missing = config.credentials.missing_fields();
    if !missing.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "credentials missing: {}",
            missing.join(", ")
        )));
    }

    for (name, url) in config.endpoints.entries() {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::ValidationError(format!(
                "endpoints.{name} must be an absolute http(s) URL, got '{url}'"
            )));
        }
    }

    for (name, url, placeholder) in config.endpoints.required_placeholders() {
        if !url.contains(&format!("[{placeholder}]")) {
            return Err(ConfigError::ValidationError(format!(
                "endpoints.{name} must contain the [{placeholder}] placeholder"
            )));
        }
    }

    if config.trading.possible_venues.is_empty() {
        return Err(ConfigError::ValidationError(
            "trading.possible_venues must list at least one venue".to_string(),
        ));
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.timeout_secs must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"
credentials:
  client_id: client
  client_secret: secret
  account_number: '12345678'
  pin: '1234'
";

    #[test]
    fn test_load_minimal_config() {
        let config = match load_config_from_string(MINIMAL) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.credentials.username, "12345678");
        assert_eq!(config.endpoints, EndpointTable::default());
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert_eq!(config.trading.possible_venues, vec!["Xetra", "Tradegate"]);
        assert_eq!(config.observability.logging.level, "info");
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "pin: ${COMDIRECT_CONFIG_TEST_NONEXISTENT_VAR:-0000}";
        assert_eq!(interpolate_env_vars(input), "pin: 0000");
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "client_secret: ${COMDIRECT_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "client_secret: ");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_validation_empty_credentials() {
        let yaml = r"
credentials:
  client_id: client
  client_secret: ${COMDIRECT_CONFIG_TEST_UNLIKELY_TO_EXIST}
  username: user
  pin: '1'
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for empty secret");
        };
        assert!(err.to_string().contains("client_secret"));
    }

    #[test]
    fn test_validation_relative_endpoint() {
        let yaml = format!("{MINIMAL}endpoints:\n  depots: /depots\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for relative URL");
        };
        assert!(err.to_string().contains("endpoints.depots"));
    }

    #[test]
    fn test_validation_missing_placeholder() {
        let yaml =
            format!("{MINIMAL}endpoints:\n  session_tan: https://api.example/sessions/fixed\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for missing placeholder");
        };
        assert!(err.to_string().contains("[IDENTIFIER]"));
    }

    #[test]
    fn test_validation_empty_venues() {
        let yaml = format!("{MINIMAL}trading:\n  possible_venues: []\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for empty venue list");
        };
        assert!(err.to_string().contains("possible_venues"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
credentials:
  client_id: client
  client_secret: secret
  username: user
  pin: "0000"
endpoints:
  oauth_token: "http://localhost:9000/oauth/token"
trading:
  possible_venues: ["LT Lang & Schwarz", "Xetra"]
http:
  timeout_secs: 10
approval:
  delay_secs: 45
observability:
  logging:
    level: "debug"
    format: "json"
"#;
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };
        assert_eq!(config.endpoints.oauth_token, "http://localhost:9000/oauth/token");
        assert_eq!(config.endpoints.depots, EndpointTable::default().depots);
        assert_eq!(config.trading.possible_venues.len(), 2);
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.approval.delay(), Duration::from_secs(45));
        assert_eq!(config.observability.logging.format, "json");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comdirect.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.credentials.client_id, "client");
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/comdirect.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
