pub mod job;
pub mod run;

pub use job::{run_database_job, JobOutcome, StagingDir};
pub use run::{BackupRunner, DatabaseReport, RunReport};
