use super::{Config, SecretsLoader};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_path: impl Into<PathBuf>, secrets_path: impl Into<PathBuf>) -> Result<Self> {
        let config = Self::load_configuration(&config_path.into(), &secrets_path.into()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_path: &Path, secrets_path: &Path) -> Result<Config> {
        debug!("Loading backup config: {}", config_path.display());

        let content = fs::read_to_string(config_path).await.map_err(|e| ConfigError::LoadFailed {
            path: config_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: config_path.display().to_string(),
            reason: e.to_string(),
        })?;

        config.secrets = SecretsLoader::load(secrets_path)?.resolve();

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration in {}: {}", config_path.display(), e))?;

        info!(
            "Loaded configuration: service {}, {} databases, remote dir {}",
            config.service.name,
            config.database.names.len(),
            config.storage.remote_dir
        );

        Ok(config)
    }
}
