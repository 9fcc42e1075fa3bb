use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per storage key
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub pattern_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                dir: PathBuf::from("data/form_storage"),
            },
            validation: ValidationConfig {
                pattern_cache_capacity: 128,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let port_raw = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
        let cache_raw = env::var("PATTERN_CACHE_CAPACITY").unwrap_or_else(|_| "128".to_string());

        let config = Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: port_raw.parse().unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                dir: env::var("FORM_STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.dir),
            },
            validation: ValidationConfig {
                pattern_cache_capacity: cache_raw
                    .parse()
                    .ok()
                    .filter(|capacity: &usize| *capacity > 0)
                    .unwrap_or(defaults.validation.pattern_cache_capacity),
            },
        };

        if config.server.host.trim().is_empty() {
            anyhow::bail!("SERVER_HOST must not be empty");
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
