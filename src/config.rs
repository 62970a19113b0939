use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

pub const DEFAULT_SPARQL_ENDPOINT: &str = "http://localhost:3030/library/sparql";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Server configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server host address
    #[validate(length(min = 1, message = "HTTP host cannot be empty"))]
    pub http_host: String,

    /// HTTP server port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "HTTP port must be between 1 and 65535"
    ))]
    pub http_port: u16,

    /// SPARQL query endpoint of the triplestore (e.g. a Fuseki dataset)
    #[validate(url(message = "SPARQL endpoint must be an absolute URL"))]
    pub sparql_endpoint: String,

    /// Upper bound for a single outbound query, in milliseconds
    #[validate(range(
        min = 100,
        max = 120000,
        message = "Query timeout must be between 100 and 120000 ms"
    ))]
    pub query_timeout_ms: u64,

    /// Largest accepted request body (pass-through queries)
    #[validate(range(
        min = 1024,
        max = 16777216,
        message = "Max body size must be between 1 KiB and 16 MiB"
    ))]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 4000,
            sparql_endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            query_timeout_ms: 8000,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            http_host: env::var("SHELFGRAPH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env_var("PORT", "4000")?,
            sparql_endpoint: env::var("FUSEKI_URL")
                .unwrap_or_else(|_| DEFAULT_SPARQL_ENDPOINT.to_string()),
            query_timeout_ms: parse_env_var("SHELFGRAPH_QUERY_TIMEOUT_MS", "8000")?,
            max_body_bytes: parse_env_var("SHELFGRAPH_MAX_BODY_BYTES", "65536")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of this configuration (CLI wins)
    pub fn merge_cli(mut self, cli: CliConfig) -> Result<Self, ConfigError> {
        if let Some(host) = cli.http_host {
            self.http_host = host;
        }
        if let Some(port) = cli.http_port {
            self.http_port = port;
        }
        if let Some(endpoint) = cli.sparql_endpoint {
            self.sparql_endpoint = endpoint;
        }
        if let Some(timeout) = cli.query_timeout_ms {
            self.query_timeout_ms = timeout;
        }
        if let Some(max) = cli.max_body_bytes {
            self.max_body_bytes = max;
        }

        self.validate()?;
        Ok(self)
    }

    /// Create configuration from YAML file
    ///
    /// Keys missing from the file fall back to [`ServerConfig::default`].
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// CLI configuration (parsed from command line arguments); unset flags keep
/// the value from the environment or config file
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub sparql_endpoint: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub max_body_bytes: Option<usize>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
