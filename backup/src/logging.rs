use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Lines go to the configured log file in
/// append mode, or to stdout when none is set. `RUST_LOG` adds directives.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("backup=info".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;

            fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
        }
        None => {
            fmt()
                .with_env_filter(env_filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
        }
    }

    Ok(())
}
