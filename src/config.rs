use crate::application::services::CapacityPolicy;
use std::env;
use std::time::Duration;

const DEFAULT_ASSISTANT_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_ASSISTANT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
    pub assistant: AssistantConfig,
    pub capacity_policy: CapacityPolicy,
    pub room_lock_ttl_secs: u64,
    pub admin_user_id: Option<String>,
    pub admin_email: Option<String>,
}

/// Chat-completions backend settings. Without an API key the assistant
/// answers every turn with `BackendUnavailable`.
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_iterations: usize,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://findnkeep.db?mode=rwc".to_string());

        let server_host = var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = var("SERVER_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let otel_exporter_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = var("SERVICE_NAME").unwrap_or_else(|| "findnkeep".to_string());

        let metrics_port = var("METRICS_PORT")
            .unwrap_or_else(|| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        let max_iterations = parse_or(
            "ASSISTANT_MAX_ITERATIONS",
            var("ASSISTANT_MAX_ITERATIONS"),
            5usize,
        )?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ASSISTANT_MAX_ITERATIONS",
                value: "0".to_string(),
            });
        }

        let timeout_secs =
            parse_or("ASSISTANT_TIMEOUT_SECS", var("ASSISTANT_TIMEOUT_SECS"), 60u64)?;

        let assistant = AssistantConfig {
            api_url: var("ASSISTANT_API_URL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_URL.to_string()),
            api_key: var("ASSISTANT_API_KEY"),
            model: var("ASSISTANT_MODEL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_string()),
            max_iterations,
            timeout: Duration::from_secs(timeout_secs),
        };

        let capacity_policy = match var("CAPACITY_POLICY") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CAPACITY_POLICY",
                value,
            })?,
            None => CapacityPolicy::default(),
        };

        let room_lock_ttl_secs =
            parse_or("ROOM_LOCK_TTL_SECS", var("ROOM_LOCK_TTL_SECS"), 30u64)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
            assistant,
            capacity_policy,
            room_lock_ttl_secs,
            admin_user_id: var("ADMIN_USER_ID"),
            admin_email: var("ADMIN_EMAIL"),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value for {name}: \"{value}\"")]
    InvalidValue { name: &'static str, value: String },
}
