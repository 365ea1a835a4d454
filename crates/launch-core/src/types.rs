//! Core type definitions for the training launcher

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::JobParameters;
use crate::Error;

/// Gradient compression scheme registered as a DDP communication hook
/// by the external training process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionScheme {
    /// Cast gradients to half precision before allreduce
    Fp16Compress,

    /// Low-rank PowerSGD compression
    PowerSgd,

    /// PowerSGD wrapped in FP16 compression
    Fp16PowerSgd,

    /// PowerSGD over the flattened gradient bucket
    BatchedPowerSgd,

    /// Batched PowerSGD wrapped in FP16 compression
    Fp16BatchedPowerSgd,
}

impl CompressionScheme {
    /// Every recognized scheme
    pub const ALL: [CompressionScheme; 5] = [
        CompressionScheme::Fp16Compress,
        CompressionScheme::PowerSgd,
        CompressionScheme::Fp16PowerSgd,
        CompressionScheme::BatchedPowerSgd,
        CompressionScheme::Fp16BatchedPowerSgd,
    ];

    /// Value expected in `COMM_HOOK_TYPE`
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionScheme::Fp16Compress => "FP16_COMPRESS",
            CompressionScheme::PowerSgd => "POWER_SGD",
            CompressionScheme::Fp16PowerSgd => "FP16_POWER_SGD",
            CompressionScheme::BatchedPowerSgd => "BATCHED_POWER_SGD",
            CompressionScheme::Fp16BatchedPowerSgd => "FP16_BATCHED_POWER_SGD",
        }
    }

    /// The hook the external process registers for this scheme
    pub fn hook_plan(&self) -> HookPlan {
        let (base, fp16_wrapper) = match self {
            CompressionScheme::Fp16Compress => (BaseHook::Fp16Compress, false),
            CompressionScheme::PowerSgd => (BaseHook::PowerSgd, false),
            CompressionScheme::Fp16PowerSgd => (BaseHook::PowerSgd, true),
            CompressionScheme::BatchedPowerSgd => (BaseHook::BatchedPowerSgd, false),
            CompressionScheme::Fp16BatchedPowerSgd => (BaseHook::BatchedPowerSgd, true),
        };

        let powersgd_state = match base {
            BaseHook::Fp16Compress => None,
            BaseHook::PowerSgd | BaseHook::BatchedPowerSgd => Some(PowerSgdState::default()),
        };

        HookPlan {
            base,
            fp16_wrapper,
            powersgd_state,
        }
    }
}

impl fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompressionScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| Error::UnknownCompressionScheme {
                value: s.to_string(),
            })
    }
}

/// Hook function at the core of a communication hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseHook {
    Fp16Compress,
    PowerSgd,
    BatchedPowerSgd,
}

/// PowerSGD state the external hook is constructed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSgdState {
    pub matrix_approximation_rank: u32,

    /// Plain allreduce runs until this iteration
    pub start_powersgd_iter: u32,
}

impl Default for PowerSgdState {
    fn default() -> Self {
        Self {
            matrix_approximation_rank: 1,
            start_powersgd_iter: 2,
        }
    }
}

/// Communication hook a compression scheme stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPlan {
    pub base: BaseHook,

    /// Whether the base hook is wrapped in FP16 compression
    pub fp16_wrapper: bool,

    pub powersgd_state: Option<PowerSgdState>,
}

/// Compression selection carried by a job spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum HookSelection {
    /// No communication hook registered
    #[default]
    None,

    /// A recognized scheme
    Known(CompressionScheme),

    /// Forwarded verbatim without local validation
    Unchecked(String),
}

impl HookSelection {
    /// Value exported as `COMM_HOOK_TYPE`, if any
    pub fn as_env_value(&self) -> Option<&str> {
        match self {
            HookSelection::None => None,
            HookSelection::Known(scheme) => Some(scheme.as_str()),
            HookSelection::Unchecked(value) => Some(value.as_str()),
        }
    }

    pub fn scheme(&self) -> Option<CompressionScheme> {
        match self {
            HookSelection::Known(scheme) => Some(*scheme),
            _ => None,
        }
    }
}

/// Everything needed to launch one training job
///
/// Built once by [`crate::resolve`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    /// Distributed launcher program (e.g. `python`)
    pub program: String,

    /// Arguments placed before the distributed-launch arguments
    pub launcher_args: Vec<String>,

    /// Opaque worker topology arguments, in operator order
    pub distributed_args: Vec<String>,

    /// Training entry point handed to the launcher
    pub entry_point: String,

    /// Model, optimizer and logging parameters
    pub params: JobParameters,

    /// Dataset directory, always the final positional argument
    pub dataset_path: String,

    pub compression: HookSelection,
}

/// A fully built command ready to spawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,

    /// Environment overrides; `None` removes the variable from the child
    pub env: BTreeMap<String, Option<String>>,
}

impl Invocation {
    /// Shell-like rendering for logs and dry runs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
