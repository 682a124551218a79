use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::{BackupError, Result};
use crate::services::{archive, pg_dump};
use crate::storage::DiskClient;

/// Result of backing up one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Completed { parts: usize },
    DumpFailed { reason: String },
    ArchiveFailed { reason: String },
    UploadFailed {
        uploaded: usize,
        total: usize,
        reason: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

/// Per-job working directory holding the archive and its parts.
///
/// Removed with everything inside it when dropped, whichever way the job ends.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub async fn create(parent: &Path, database: &str) -> Result<Self> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}_{}_{}",
            database,
            Utc::now().format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        );
        let path = parent.join(name);

        fs::create_dir(&path)
            .await
            .map_err(|e| BackupError::io(format!("failed to create {}", path.display()), e))?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => info!("Removed staging directory {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staging directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Dump, archive, split and upload one database.
///
/// The dump file is removed once every part is uploaded. When the job fails
/// after the dump, it is kept unless `paths.retain_dump_on_failure` is off.
pub async fn run_database_job(config: &Config, disk: &DiskClient, database: &str) -> JobOutcome {
    let dump_file = config.dump_file_for(database);

    if let Err(e) = dump(config, database, &dump_file).await {
        error!("{}", e);
        return JobOutcome::DumpFailed {
            reason: e.to_string(),
        };
    }

    let outcome = archive_and_upload(config, disk, database, &dump_file).await;

    if outcome.is_success() || !config.paths.retain_dump_on_failure {
        remove_dump(&dump_file).await;
    } else {
        warn!(
            "Keeping dump {} because the backup of {} did not complete",
            dump_file.display(),
            database
        );
    }

    outcome
}

async fn dump(config: &Config, database: &str, dump_file: &Path) -> Result<()> {
    fs::create_dir_all(&config.paths.dump_dir).await.map_err(|e| {
        BackupError::io(
            format!("failed to create {}", config.paths.dump_dir.display()),
            e,
        )
    })?;

    pg_dump::dump_database(
        &config.database,
        &config.tools,
        config.secrets.db_password.as_deref(),
        database,
        dump_file,
    )
    .await
}

async fn archive_and_upload(
    config: &Config,
    disk: &DiskClient,
    database: &str,
    dump_file: &Path,
) -> JobOutcome {
    let staging = match StagingDir::create(&config.paths.dump_dir, database).await {
        Ok(staging) => staging,
        Err(e) => {
            error!("{}", e);
            return JobOutcome::ArchiveFailed {
                reason: e.to_string(),
            };
        }
    };

    let parts = match archive::archive_and_split(
        &config.tools,
        dump_file,
        staging.path(),
        config.paths.split_size_mb,
    )
    .await
    {
        Ok(parts) => parts,
        Err(e) => {
            error!("{}", e);
            return JobOutcome::ArchiveFailed {
                reason: e.to_string(),
            };
        }
    };

    let total = parts.len();
    info!("Uploading {} parts of {}", total, database);

    for (index, part) in parts.iter().enumerate() {
        match disk
            .upload_with_capacity_check(part, &config.storage.remote_dir)
            .await
        {
            Ok(receipt) => {
                info!(
                    "Part {}/{} of {} uploaded to {} ({} bytes)",
                    index + 1,
                    total,
                    database,
                    receipt.remote_path,
                    receipt.size_bytes
                );
                if let Err(e) = fs::remove_file(part).await {
                    warn!("Failed to remove uploaded part {}: {}", part.display(), e);
                }
            }
            Err(e) => {
                error!("{}", e);
                if total - index > 1 {
                    warn!(
                        "Skipping the remaining {} parts of {}",
                        total - index - 1,
                        database
                    );
                }
                return JobOutcome::UploadFailed {
                    uploaded: index,
                    total,
                    reason: e.to_string(),
                };
            }
        }
    }

    JobOutcome::Completed { parts: total }
}

async fn remove_dump(dump_file: &Path) {
    match fs::remove_file(dump_file).await {
        Ok(()) => info!("Removed dump {}", dump_file.display()),
        Err(e) => warn!("Failed to remove dump {}: {}", dump_file.display(), e),
    }
}
