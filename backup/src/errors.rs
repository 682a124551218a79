//! Error types for the backup runner
//!
//! Every external tool or network step maps its failure onto one variant of
//! [`BackupError`], so the run sequencer can log it and record an outcome
//! without inspecting strings.

use std::fmt;
use std::io;

/// Main error type for a backup run
#[derive(Debug)]
pub enum BackupError {
    /// Configuration could not be loaded or failed validation
    Config(ConfigError),

    /// `systemctl stop|start` failed
    ServiceControl {
        service: String,
        action: &'static str,
        reason: String,
    },

    /// The dump utility failed for a database
    Dump { database: String, reason: String },

    /// Compression or splitting failed
    Archive { path: String, reason: String },

    /// The quota endpoint was unreachable or answered with a non-success status
    QuotaQuery { reason: String },

    /// Remote free space is smaller than the file about to be uploaded
    InsufficientSpace {
        file: String,
        required: u64,
        available: u64,
    },

    /// Requesting the pre-signed upload target failed
    UploadLink { path: String, reason: String },

    /// Transferring the file bytes to the upload target failed
    Upload { file: String, reason: String },

    /// Local filesystem failure outside of an external tool
    Io { context: String, source: io::Error },
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or parse the configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },
}

impl BackupError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        BackupError::Io {
            context: context.into(),
            source,
        }
    }

    /// Short machine-friendly name of the failing step, used in the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            BackupError::Config(_) => "config",
            BackupError::ServiceControl { .. } => "service_control",
            BackupError::Dump { .. } => "dump",
            BackupError::Archive { .. } => "archive",
            BackupError::QuotaQuery { .. } => "quota_query",
            BackupError::InsufficientSpace { .. } => "insufficient_space",
            BackupError::UploadLink { .. } => "upload_link",
            BackupError::Upload { .. } => "upload",
            BackupError::Io { .. } => "io",
        }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::Config(e) => write!(f, "Configuration error: {}", e),
            BackupError::ServiceControl {
                service,
                action,
                reason,
            } => {
                write!(f, "Failed to {} service {}: {}", action, service, reason)
            }
            BackupError::Dump { database, reason } => {
                write!(f, "Failed to dump database {}: {}", database, reason)
            }
            BackupError::Archive { path, reason } => {
                write!(f, "Failed to archive or split {}: {}", path, reason)
            }
            BackupError::QuotaQuery { reason } => {
                write!(f, "Failed to query disk quota: {}", reason)
            }
            BackupError::InsufficientSpace {
                file,
                required,
                available,
            } => {
                write!(
                    f,
                    "Not enough remote space for {}: need {} bytes, {} bytes free",
                    file, required, available
                )
            }
            BackupError::UploadLink { path, reason } => {
                write!(f, "Failed to get upload link for {}: {}", path, reason)
            }
            BackupError::Upload { file, reason } => {
                write!(f, "Failed to upload {}: {}", file, reason)
            }
            BackupError::Io { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Config(e) => Some(e),
            BackupError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for BackupError {
    fn from(err: ConfigError) -> Self {
        BackupError::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
