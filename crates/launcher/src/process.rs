//! Child process launcher backed by `tokio::process`

use async_trait::async_trait;
use launch_core::{Error, Invocation, Result};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::backend::{ExitStatus, ProcessLauncher};

/// Runs the training process as a child with inherited stdio
///
/// The child gets the current process environment plus the invocation's
/// overrides. No timeout is applied.
#[derive(Debug, Clone, Default)]
pub struct ChildProcessLauncher;

impl ChildProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        for (key, value) in &invocation.env {
            match value {
                Some(value) => cmd.env(key, value),
                None => cmd.env_remove(key),
            };
        }

        cmd
    }
}

#[async_trait]
impl ProcessLauncher for ChildProcessLauncher {
    async fn launch(&self, invocation: &Invocation) -> Result<ExitStatus> {
        debug!(program = %invocation.program, args = invocation.args.len(), "Spawning training process");

        let start = Instant::now();
        let mut child = Self::command(invocation).spawn().map_err(|e| Error::Launch {
            program: invocation.program.clone(),
            source: e,
        })?;

        info!(pid = child.id(), "Training process started");

        let status = child.wait().await?;
        let elapsed = start.elapsed();

        let status = from_process_status(status)?;
        if status.is_success() {
            info!(elapsed_secs = elapsed.as_secs(), "Training process finished");
        } else {
            warn!(
                code = status.code,
                elapsed_secs = elapsed.as_secs(),
                "Training process exited with failure"
            );
        }

        Ok(status)
    }
}

fn from_process_status(status: std::process::ExitStatus) -> Result<ExitStatus> {
    if let Some(code) = status.code() {
        return Ok(ExitStatus { code });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            warn!(signal, "Training process terminated by signal");
            return Err(Error::SignalTermination { signal });
        }
    }

    Err(Error::Io(std::io::Error::other(format!(
        "training process ended without exit code: {status}"
    ))))
}
