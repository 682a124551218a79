use tracing::info;

use super::commands::run_tool;
use crate::config::{ServiceConfig, ToolsConfig};
use crate::errors::{BackupError, Result};

pub async fn start_service(service: &ServiceConfig, tools: &ToolsConfig) -> Result<()> {
    info!("Starting service: {}", service.name);
    systemctl(service, tools, "start").await?;
    info!("Service {} started successfully", service.name);
    Ok(())
}

pub async fn stop_service(service: &ServiceConfig, tools: &ToolsConfig) -> Result<()> {
    info!("Stopping service: {}", service.name);
    systemctl(service, tools, "stop").await?;
    info!("Service {} stopped successfully", service.name);
    Ok(())
}

async fn systemctl(service: &ServiceConfig, tools: &ToolsConfig, action: &'static str) -> Result<()> {
    let (program, args) = if service.use_sudo {
        ("sudo", vec![tools.systemctl.as_str(), action, service.name.as_str()])
    } else {
        (tools.systemctl.as_str(), vec![action, service.name.as_str()])
    };

    run_tool(program, args, &[])
        .await
        .map(|_| ())
        .map_err(|e| BackupError::ServiceControl {
            service: service.name.clone(),
            action,
            reason: e.to_string(),
        })
}
