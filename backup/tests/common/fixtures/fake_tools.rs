//! Fake external tools for driving a whole backup run in a temp directory
//!
//! `systemctl` and `pg_dump` are replaced by shell scripts; `tar` and `split`
//! are thin wrappers around the real binaries. Every invocation is appended
//! to a calls log so tests can assert on order and count.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use backup::config::{
    Config, DatabaseConfig, LoggingConfig, PathsConfig, Secrets, ServiceConfig, StorageConfig,
    ToolsConfig,
};

use super::mock_disk::TOKEN;

pub const SERVICE: &str = "srv1cv8-test.service";
pub const DB_PASSWORD: &str = "s3cret";

/// Knobs for the fake tools
#[derive(Debug, Clone)]
pub struct FakeTools {
    /// Databases for which pg_dump writes a partial file and exits 1
    pub failing_dumps: Vec<String>,
    pub fail_stop: bool,
    pub fail_start: bool,
    /// Bytes of random data written per dump
    pub dump_size: usize,
}

impl Default for FakeTools {
    fn default() -> Self {
        Self {
            failing_dumps: Vec::new(),
            fail_stop: false,
            fail_start: false,
            // Random data does not compress: two 1 MB parts
            dump_size: 1_500_000,
        }
    }
}

pub struct TestEnv {
    pub root: TempDir,
    pub dump_dir: PathBuf,
    pub calls_log: PathBuf,
    pub tools: ToolsConfig,
}

impl TestEnv {
    pub fn new(fake: FakeTools) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let bin_dir = root.path().join("bin");
        let dump_dir = root.path().join("dump");
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");
        let calls_log = root.path().join("calls.log");
        fs::write(&calls_log, "").expect("Failed to create calls log");
        let log = calls_log.display().to_string();

        let systemctl = write_script(
            &bin_dir,
            "systemctl",
            &format!(
                r#"echo "systemctl $*" >> "{log}"
if [ "$1" = "stop" ] && [ "{fail_stop}" = "true" ]; then
    echo "Failed to stop $2: Unit $2 not loaded." >&2
    exit 5
fi
if [ "$1" = "start" ] && [ "{fail_start}" = "true" ]; then
    echo "Job for $2 failed." >&2
    exit 1
fi
exit 0
"#,
                log = log,
                fail_stop = fake.fail_stop,
                fail_start = fake.fail_start,
            ),
        );

        let pg_dump = write_script(
            &bin_dir,
            "pg_dump",
            &format!(
                r#"echo "pg_dump $* PGPASSWORD=$PGPASSWORD" >> "{log}"
db=""
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -d) db="$2"; shift 2 ;;
        -f) out="$2"; shift 2 ;;
        *) shift ;;
    esac
done
case " {failing} " in
    *" $db "*)
        echo "partial" > "$out"
        echo "pg_dump: error: connection to database \"$db\" failed" >&2
        exit 1
        ;;
esac
head -c {size} /dev/urandom > "$out"
"#,
                log = log,
                failing = fake.failing_dumps.join(" "),
                size = fake.dump_size,
            ),
        );

        let tar = write_script(
            &bin_dir,
            "tar",
            &format!("echo \"tar $*\" >> \"{log}\"\nexec tar \"$@\"\n", log = log),
        );
        let split = write_script(
            &bin_dir,
            "split",
            &format!("echo \"split $*\" >> \"{log}\"\nexec split \"$@\"\n", log = log),
        );

        let tools = ToolsConfig {
            systemctl: systemctl.display().to_string(),
            pg_dump: pg_dump.display().to_string(),
            tar: tar.display().to_string(),
            split: split.display().to_string(),
        };

        Self {
            root,
            dump_dir,
            calls_log,
            tools,
        }
    }

    pub fn config(&self, databases: &[&str], api_base: &str) -> Config {
        Config {
            service: ServiceConfig {
                name: SERVICE.to_string(),
                use_sudo: false,
            },
            database: DatabaseConfig {
                names: databases.iter().map(|d| d.to_string()).collect(),
                user: "postgres".to_string(),
                host: "localhost".to_string(),
                port: None,
            },
            storage: StorageConfig {
                api_base: api_base.to_string(),
                remote_dir: "/backups".to_string(),
                auth_scheme: "OAuth".to_string(),
                request_timeout_seconds: 5,
            },
            paths: PathsConfig {
                dump_dir: self.dump_dir.clone(),
                split_size_mb: 1,
                retain_dump_on_failure: true,
            },
            tools: self.tools.clone(),
            logging: LoggingConfig { file: None },
            secrets: Secrets {
                storage_token: TOKEN.to_string(),
                db_password: Some(DB_PASSWORD.to_string()),
            },
        }
    }

    /// Lines of the calls log, in invocation order
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.calls_log)
            .expect("Failed to read calls log")
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn dump_file(&self, database: &str) -> PathBuf {
        self.dump_dir.join(format!("{}.dump", database))
    }

    /// Names of everything left in the dump directory
    pub fn leftovers(&self) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(&self.dump_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("Failed to write script");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Failed to make script executable");
    path
}
