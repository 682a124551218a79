//! Defaults and fixed names used across the backup run

use std::time::Duration;

/// Remote storage HTTP constants
pub mod http {
    use super::Duration;

    /// Timeout for quota and upload-link requests
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default REST endpoint of the disk API
    pub const DEFAULT_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

    /// Default scheme placed before the token in the Authorization header
    pub const DEFAULT_AUTH_SCHEME: &str = "OAuth";
}

/// Archive naming
pub mod archive {
    /// Extension appended to the dump file name for the compressed archive
    pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

    /// Infix between the archive name and the split suffix (`aa`, `ab`, ...)
    pub const PART_INFIX: &str = "_part_";

    /// Default part size in megabytes
    pub const DEFAULT_SPLIT_SIZE_MB: u64 = 100;
}

/// Default configuration values
pub mod defaults {
    pub const CONFIG_PATH: &str = "config/backup.toml";
    pub const SECRETS_PATH: &str = "config/secrets.toml";

    pub const DB_USER: &str = "postgres";
    pub const DB_HOST: &str = "localhost";
    pub const DUMP_DIR: &str = "/home/dump";
    pub const REMOTE_DIR: &str = "/backups";
    pub const LOG_FILE: &str = "backup.log";

    /// Environment variable overriding the storage token
    pub const TOKEN_ENV: &str = "BACKUP_STORAGE_TOKEN";

    /// Environment variable overriding the database password
    pub const DB_PASSWORD_ENV: &str = "BACKUP_DB_PASSWORD";
}

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
