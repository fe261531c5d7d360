use anyhow::{Context, Result};
use async_trait::async_trait;
use odev_core::collaborators::{Invocation, LaunchOutcome, ProcessLauncher};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs the server in the foreground with inherited stdio.
pub struct CommandLauncher;

#[async_trait]
impl ProcessLauncher for CommandLauncher {
    async fn launch(&self, invocation: &Invocation) -> Result<LaunchOutcome> {
        debug!(program = %invocation.program, args = ?invocation.args, "launching");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).envs(&invocation.env);
        cmd.kill_on_drop(true);

        let status = cmd
            .status()
            .await
            .with_context(|| format!("Failed to start `{}`", invocation.program))?;

        let exit_code = status.code().unwrap_or_else(|| {
            warn!("Process terminated by signal, using exit code 1");
            1
        });
        Ok(LaunchOutcome { exit_code })
    }
}
