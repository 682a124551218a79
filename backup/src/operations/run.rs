use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::job::{run_database_job, JobOutcome};
use crate::config::Config;
use crate::errors::Result;
use crate::services::systemctl;
use crate::storage::DiskClient;

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseReport {
    pub database: String,
    pub outcome: JobOutcome,
}

/// Everything that happened during one run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub service_stopped: bool,
    pub service_started: bool,
    pub databases: Vec<DatabaseReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.service_stopped
            && self.service_started
            && self.databases.iter().all(|d| d.outcome.is_success())
    }

    pub fn failed_databases(&self) -> Vec<&str> {
        self.databases
            .iter()
            .filter(|d| !d.outcome.is_success())
            .map(|d| d.database.as_str())
            .collect()
    }

    pub fn outcome_for(&self, database: &str) -> Option<&JobOutcome> {
        self.databases
            .iter()
            .find(|d| d.database == database)
            .map(|d| &d.outcome)
    }

    fn log_summary(&self) {
        let completed = self.databases.len() - self.failed_databases().len();
        info!(
            "Backup run {} finished in {}s: {}/{} databases backed up",
            self.run_id,
            (self.finished_at - self.started_at).num_seconds(),
            completed,
            self.databases.len()
        );

        for report in &self.databases {
            match &report.outcome {
                JobOutcome::Completed { parts } => {
                    info!("  {}: completed ({} parts)", report.database, parts)
                }
                JobOutcome::DumpFailed { reason } => {
                    error!("  {}: dump failed: {}", report.database, reason)
                }
                JobOutcome::ArchiveFailed { reason } => {
                    error!("  {}: archive failed: {}", report.database, reason)
                }
                JobOutcome::UploadFailed {
                    uploaded,
                    total,
                    reason,
                } => error!(
                    "  {}: upload failed after {}/{} parts: {}",
                    report.database, uploaded, total, reason
                ),
            }
        }

        if !self.service_stopped {
            warn!("  service was not stopped before the dumps");
        }
        if !self.service_started {
            error!("  service failed to start after the run");
        }
    }
}

/// Sequences a whole backup run over the configured databases
pub struct BackupRunner {
    config: Arc<Config>,
    disk: DiskClient,
}

impl BackupRunner {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let disk = DiskClient::new(&config.storage, &config.secrets.storage_token)?;
        Ok(Self { config, disk })
    }

    /// Stop the service, back up every database in order, start the service.
    ///
    /// Never fails: each step's error is logged and recorded in the report.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("backup_run", run_id = %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> RunReport {
        let started_at = Utc::now();
        let service = &self.config.service;
        info!(
            "Starting backup run for {} databases",
            self.config.database.names.len()
        );

        let service_stopped = match systemctl::stop_service(service, &self.config.tools).await {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                warn!("Continuing with the dumps while {} may be running", service.name);
                false
            }
        };

        let mut databases = Vec::with_capacity(self.config.database.names.len());
        for database in &self.config.database.names {
            let outcome = run_database_job(&self.config, &self.disk, database)
                .instrument(info_span!("database", name = %database))
                .await;
            databases.push(DatabaseReport {
                database: database.clone(),
                outcome,
            });
        }

        let service_started = match systemctl::start_service(service, &self.config.tools).await {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        };

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            service_stopped,
            service_started,
            databases,
        };
        report.log_summary();
        report
    }
}
