use std::path::Path;
use tracing::info;

use super::commands::run_tool;
use crate::config::{DatabaseConfig, ToolsConfig};
use crate::errors::{BackupError, Result};

/// Build the pg_dump argument list: custom format written to `output`.
pub fn dump_args(settings: &DatabaseConfig, database: &str, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-U".to_string(),
        settings.user.clone(),
        "-h".to_string(),
        settings.host.clone(),
    ];
    if let Some(port) = settings.port {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    args.extend([
        "-d".to_string(),
        database.to_string(),
        "-F".to_string(),
        "c".to_string(),
        "-f".to_string(),
        output.display().to_string(),
    ]);
    args
}

pub async fn dump_database(
    settings: &DatabaseConfig,
    tools: &ToolsConfig,
    password: Option<&str>,
    database: &str,
    output: &Path,
) -> Result<()> {
    info!("Creating dump of database {}...", database);

    let envs: Vec<(&str, &str)> = password.map(|p| ("PGPASSWORD", p)).into_iter().collect();

    run_tool(&tools.pg_dump, dump_args(settings, database, output), &envs)
        .await
        .map_err(|e| BackupError::Dump {
            database: database.to_string(),
            reason: e.to_string(),
        })?;

    info!("Database {} dumped to {}", database, output.display());
    Ok(())
}
