use menufeed::DeliveryConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level (an `EnvFilter` directive)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Delivery API connection
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Optional pipeline YAML (normalization rules, include overrides)
    #[serde(default)]
    pub pipeline_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            delivery: DeliveryConfig::default(),
            pipeline_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server` config file and
    /// `MENUFEED_SERVER__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("MENUFEED_SERVER").separator("__"));

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill gaps from the variables older deployments set: `API_SPACE_ID`,
    /// `API_ACCESS_TOKEN` and `PORT`. Explicit settings win.
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.delivery.space_id.is_empty() {
            if let Some(space_id) = lookup("API_SPACE_ID") {
                self.delivery.space_id = space_id;
            }
        }
        if self.delivery.access_token.is_empty() {
            if let Some(token) = lookup("API_ACCESS_TOKEN") {
                self.delivery.access_token = token;
            }
        }
        if lookup("MENUFEED_SERVER__PORT").is_none() {
            match lookup("PORT").map(|p| p.parse::<u16>()) {
                Some(Ok(port)) => self.port = port,
                Some(Err(err)) => tracing::warn!(error = %err, "ignoring unparsable PORT"),
                None => {}
            }
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
