pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod operations;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use errors::{BackupError, ConfigError};
pub use operations::{BackupRunner, JobOutcome, RunReport};
pub use storage::DiskClient;
