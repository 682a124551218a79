use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use backup::constants::defaults;
use backup::logging::init_logging;
use backup::{BackupRunner, ConfigManager};

/// Stop a service, dump and upload its databases, start it again
#[derive(Debug, Parser)]
#[command(name = "backup", version)]
struct Cli {
    /// Path to the backup configuration file
    #[arg(long, default_value = defaults::CONFIG_PATH)]
    config: PathBuf,

    /// Path to the secrets file (token, database password)
    #[arg(long, default_value = defaults::SECRETS_PATH)]
    secrets: PathBuf,

    /// Exit with status 1 when any database or service step failed
    #[arg(long)]
    fail_on_error: bool,

    /// Load and validate the configuration, then exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config, &cli.secrets).await?;
    let config = config_manager.get_current_config();

    if cli.check_config {
        println!(
            "Configuration OK: service {}, databases {:?}",
            config.service.name, config.database.names
        );
        return Ok(());
    }

    init_logging(&config.logging)?;
    info!(
        "Configuration loaded from {}: service {}, {} databases",
        cli.config.display(),
        config.service.name,
        config.database.names.len()
    );

    let runner = BackupRunner::new(config)?;
    let report = runner.run().await;

    if cli.fail_on_error && !report.is_success() {
        error!(
            "Backup run {} failed for: {:?}",
            report.run_id,
            report.failed_databases()
        );
        std::process::exit(1);
    }

    Ok(())
}
