//! Launcher for distributed training jobs
//!
//! This crate runs the side-effecting half of a launch:
//! - **Pipeline**: resolve a job spec, build its argument list, dispatch it
//! - **Process**: run the training entry point as a child and wait for it
//! - **Exit status**: pass the child's exit code through, report signals
//!
//! # Example
//!
//! ```no_run
//! use launcher::{ChildProcessLauncher, LaunchConfigurator};
//! use launch_core::{Environment, LauncherConfig};
//!
//! # async fn example() -> launch_core::Result<()> {
//! let configurator = LaunchConfigurator::new(LauncherConfig::default(), ChildProcessLauncher::new());
//! let status = configurator
//!     .run(&Environment::from_process(), Some("/data/wikitext"))
//!     .await?;
//! std::process::exit(status.code);
//! # }
//! ```

mod backend;
mod configurator;
mod process;

pub use backend::{ExitStatus, ProcessLauncher};
pub use configurator::LaunchConfigurator;
pub use process::ChildProcessLauncher;
