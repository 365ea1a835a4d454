//! Launch Core - configuration resolution for distributed training launches
//!
//! Turns a compression scheme selector, distributed-launch arguments and a
//! dataset path into a validated [`TrainingJobSpec`] and the argument list
//! of the external training process.

pub mod config;
pub mod environment;
pub mod error;
pub mod job;
pub mod types;

pub use config::{HookValidation, JobParameters, LauncherCommandConfig, LauncherConfig};
pub use environment::Environment;
pub use error::{Error, Result};
pub use job::{resolve, resolve_with, to_argument_list};
pub use types::*;
