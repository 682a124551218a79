use std::ffi::OsStr;
use std::process::Output;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Failure to run an external tool: either it could not be spawned or it
/// exited unsuccessfully. The message is ready to be wrapped into a
/// step-specific `BackupError`.
#[derive(Debug)]
pub struct CommandFailure(pub String);

impl std::fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `program` with `args` to completion. Extra environment variables are
/// set on the child only.
pub async fn run_tool<I, S>(
    program: &str,
    args: I,
    envs: &[(&str, &str)],
) -> Result<Output, CommandFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = AsyncCommand::new(program);
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.kill_on_drop(true);

    debug!("Executing command: {:?}", command.as_std());

    let output = command
        .output()
        .await
        .map_err(|e| CommandFailure(format!("failed to execute {}: {}", program, e)))?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(CommandFailure(describe_failure(program, &output)))
    }
}

fn describe_failure(program: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let detail = if !stderr.is_empty() { stderr } else { stdout };

    let code = output
        .status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());

    if detail.is_empty() {
        format!("{} exited with status {}", program, code)
    } else {
        format!("{} exited with status {}: {}", program, code, detail)
    }
}
