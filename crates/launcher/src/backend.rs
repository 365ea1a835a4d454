//! Process launcher trait definition
//!
//! Defines the async interface used to start the external training process.

use async_trait::async_trait;
use launch_core::{Invocation, Result};

/// Exit status of a training process that terminated on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code reported by the process, passed through unchanged
    pub code: i32,
}

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus { code: 0 };

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Async trait for starting the external training process
///
/// Implementors run exactly one process per call and wait for it.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the invocation to completion
    ///
    /// # Returns
    /// The exit status when the process exited normally, whatever its code
    ///
    /// # Errors
    /// `Error::Launch` if the process could not be started,
    /// `Error::SignalTermination` if it was killed by a signal
    async fn launch(&self, invocation: &Invocation) -> Result<ExitStatus>;
}
