use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default location of the latest-message slot.
pub const DEFAULT_LATEST_FILE: &str = "data.json";
/// Default location of the message log.
pub const DEFAULT_MESSAGE_LOG: &str = "log.txt";
/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the message service.
#[derive(Debug, Clone)]
pub struct Config {
    /// File holding the most recently posted message as JSON.
    pub latest_message_path: PathBuf,
    /// Append-only message log.
    pub message_log_path: PathBuf,
    /// Port the HTTP server binds on all interfaces.
    pub server_port: u16,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            latest_message_path: load_env_optional("POSTLOG_LATEST_FILE")
                .unwrap_or_else(|| DEFAULT_LATEST_FILE.to_string())
                .into(),
            message_log_path: load_env_optional("POSTLOG_MESSAGE_LOG")
                .unwrap_or_else(|| DEFAULT_MESSAGE_LOG.to_string())
                .into(),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_SERVER_PORT),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latest_message_path: DEFAULT_LATEST_FILE.into(),
            message_log_path: DEFAULT_MESSAGE_LOG.into(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        latest = %config.latest_message_path.display(),
        log = %config.message_log_path.display(),
        server_port = config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
