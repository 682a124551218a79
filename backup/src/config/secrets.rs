//! Secrets loader for the storage token and database password.
//!
//! Secrets live in a separate TOML file (config/secrets.toml) that should be
//! excluded from version control. Environment variables take precedence over
//! the file, so a scheduler can inject them without touching disk.
//!
//! Example secrets.toml:
//! ```toml
//! [storage]
//! token = "oauth-token"
//!
//! [database]
//! password = "postgres-password"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::constants::defaults;

/// Structure matching the secrets.toml file format
#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub storage: StorageSecrets,
    #[serde(default)]
    pub database: DatabaseSecrets,
}

#[derive(Debug, Deserialize, Default)]
pub struct StorageSecrets {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DatabaseSecrets {
    pub password: Option<String>,
}

/// Resolved credentials handed to the run
#[derive(Clone, Default)]
pub struct Secrets {
    pub storage_token: String,
    pub db_password: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("storage_token", &"<redacted>")
            .field(
                "db_password",
                &self.db_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, credentials must come from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    /// Merge file values with environment overrides.
    pub fn resolve(self) -> Secrets {
        Self::resolve_with(self, |key| std::env::var(key).ok())
    }

    fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Secrets {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        let storage_token = non_empty(lookup(defaults::TOKEN_ENV))
            .or_else(|| non_empty(self.secrets.storage.token))
            .unwrap_or_default();

        let db_password = non_empty(lookup(defaults::DB_PASSWORD_ENV))
            .or_else(|| non_empty(self.secrets.database.password));

        Secrets {
            storage_token,
            db_password,
        }
    }
}
