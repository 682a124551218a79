pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::constants::{archive, defaults, http};
use crate::errors::ConfigError;

pub use manager::ConfigManager;
pub use secrets::{Secrets, SecretsLoader};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    // Populated from secrets.toml and the environment
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub use_sudo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub names: Vec<String>,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    pub port: Option<u16>,
}

fn default_db_user() -> String {
    defaults::DB_USER.to_string()
}

fn default_db_host() -> String {
    defaults::DB_HOST.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String {
    http::DEFAULT_API_BASE.to_string()
}

fn default_remote_dir() -> String {
    defaults::REMOTE_DIR.to_string()
}

fn default_auth_scheme() -> String {
    http::DEFAULT_AUTH_SCHEME.to_string()
}

fn default_request_timeout() -> u64 {
    http::REQUEST_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_dump_dir")]
    pub dump_dir: PathBuf,
    #[serde(default = "default_split_size")]
    pub split_size_mb: u64,
    /// Keep the uncompressed dump when any of its parts failed to upload
    #[serde(default = "default_retain_dump")]
    pub retain_dump_on_failure: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dump_dir: default_dump_dir(),
            split_size_mb: default_split_size(),
            retain_dump_on_failure: default_retain_dump(),
        }
    }
}

fn default_dump_dir() -> PathBuf {
    PathBuf::from(defaults::DUMP_DIR)
}

fn default_split_size() -> u64 {
    archive::DEFAULT_SPLIT_SIZE_MB
}

fn default_retain_dump() -> bool {
    true
}

/// Executables invoked by the run. Overridable so wrappers can be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
    #[serde(default = "default_pg_dump")]
    pub pg_dump: String,
    #[serde(default = "default_tar")]
    pub tar: String,
    #[serde(default = "default_split")]
    pub split: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            systemctl: default_systemctl(),
            pg_dump: default_pg_dump(),
            tar: default_tar(),
            split: default_split(),
        }
    }
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_pg_dump() -> String {
    "pg_dump".to_string()
}

fn default_tar() -> String {
    "tar".to_string()
}

fn default_split() -> String {
    "split".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file opened in append mode. `None` logs to stdout.
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from(defaults::LOG_FILE))
}

impl Config {
    /// Check every value once before the run touches the service or databases.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "service.name".to_string(),
            });
        }

        if self.database.names.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "database.names".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for name in &self.database.names {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "database.names".to_string(),
                    reason: "database name must not be empty".to_string(),
                });
            }
            // Names become file names inside dump_dir
            if name.contains('/') || name.contains('\\') || name.starts_with('.') {
                return Err(ConfigError::InvalidValue {
                    field: "database.names".to_string(),
                    reason: format!("'{}' cannot be used as a file name", name),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "database.names".to_string(),
                    reason: format!("'{}' is listed more than once", name),
                });
            }
        }

        if self.database.user.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "database.user".to_string(),
            });
        }

        if self.database.host.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "database.host".to_string(),
            });
        }

        if self.paths.split_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "paths.split_size_mb".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.paths.dump_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "paths.dump_dir".to_string(),
            });
        }

        if self.storage.remote_dir.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "storage.remote_dir".to_string(),
            });
        }

        if let Err(e) = reqwest::Url::parse(&self.storage.api_base) {
            return Err(ConfigError::InvalidValue {
                field: "storage.api_base".to_string(),
                reason: e.to_string(),
            });
        }

        if self.storage.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.request_timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.secrets.storage_token.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: format!("storage token ({})", defaults::TOKEN_ENV),
            });
        }

        Ok(())
    }

    /// Path of the uncompressed dump for one database
    pub fn dump_file_for(&self, database: &str) -> PathBuf {
        self.paths.dump_dir.join(format!("{}.dump", database))
    }
}
