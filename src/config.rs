//! Application configuration.
//!
//! Values are resolved per field with priority: config.toml > environment
//! (including `.env`) > built-in default.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ==================== Defaults ====================

/// Server address to bind to
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Seconds to wait for the generation webhook before giving up
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Default config file, relative to the working directory
pub const CONFIG_FILE: &str = "config.toml";

// ==================== File Structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<FileServerConfig>,
    generation: Option<FileGenerationConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FileServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct FileGenerationConfig {
    webhook_url: Option<String>,
    timeout_secs: Option<u64>,
}

// ==================== Resolved Configuration ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
}

impl ServerConfig {
    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Webhook of the external generation service; generation is disabled without it
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String, String),
    ParseError(String, String),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
            ConfigError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Load from `config.toml` in the working directory and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load using a specific config file; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!("Using configuration from {}", path.display());
                Some(contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(ConfigError::IoError(path.display().to_string(), e.to_string()));
            }
        };

        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok()).map_err(|e| {
            match e {
                ConfigError::ParseError(_, err) => {
                    ConfigError::ParseError(path.display().to_string(), err)
                }
                other => other,
            }
        })
    }

    /// Resolve configuration from file contents and an environment lookup
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match file {
            Some(contents) => toml::from_str(contents)
                .map_err(|e| ConfigError::ParseError(CONFIG_FILE.to_string(), e.to_string()))?,
            None => FileConfig::default(),
        };
        let server = file.server.unwrap_or_default();
        let generation = file.generation.unwrap_or_default();

        let addr = server
            .addr
            .or_else(|| env("SERVER_ADDR"))
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());

        let port = match server.port {
            Some(port) => port,
            None => parse_env(&env, "PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
        };

        let webhook_url = generation
            .webhook_url
            .or_else(|| env("GENERATION_WEBHOOK_URL"))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let timeout_secs = match generation.timeout_secs {
            Some(secs) => secs,
            None => parse_env(&env, "GENERATION_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "generation.timeout_secs".to_string(),
                "0".to_string(),
            ));
        }

        match &webhook_url {
            Some(url) => tracing::info!("Generation webhook: {}", url),
            None => tracing::warn!("No generation webhook configured; generation requests will fail"),
        }

        Ok(Self {
            server: ServerConfig { addr, port },
            generation: GenerationConfig {
                webhook_url,
                timeout_secs,
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match env(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), value)),
        None => Ok(None),
    }
}
