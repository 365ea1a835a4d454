//! Job resolution and argument assembly

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{HookValidation, LauncherConfig};
use crate::environment::{Environment, COMM_HOOK_TYPE, DISTRIBUTED_ARGS, WIKITEXT_DATA_PATH};
use crate::types::{CompressionScheme, HookSelection, Invocation, TrainingJobSpec};
use crate::{Error, Result};

/// Resolve a job spec from the environment using the default configuration
///
/// `dataset_path` takes precedence over `WIKITEXT_DATA_PATH`.
pub fn resolve(env: &Environment, dataset_path: Option<&str>) -> Result<TrainingJobSpec> {
    resolve_with(&LauncherConfig::default(), env, dataset_path)
}

/// Resolve a job spec from the environment and an explicit configuration
pub fn resolve_with(
    config: &LauncherConfig,
    env: &Environment,
    dataset_path: Option<&str>,
) -> Result<TrainingJobSpec> {
    config.validate()?;

    for key in [COMM_HOOK_TYPE, DISTRIBUTED_ARGS, WIKITEXT_DATA_PATH] {
        if env.is_non_utf8(key) {
            return Err(Error::config(format!("{key} is not valid UTF-8")));
        }
    }

    let dataset_path = dataset_path
        .or_else(|| env.data_path())
        .filter(|path| !path.trim().is_empty())
        .ok_or_else(|| Error::config("dataset path is empty or unset (WIKITEXT_DATA_PATH)"))?;

    let compression = select_hook(env.comm_hook_type(), config.hook_validation)?;

    let distributed_args = env
        .distributed_args()
        .map(|args| args.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    let spec = TrainingJobSpec {
        program: config.launcher.program.clone(),
        launcher_args: config.launcher.args.clone(),
        distributed_args,
        entry_point: config.launcher.entry_point.clone(),
        params: config.job.clone(),
        dataset_path: dataset_path.to_string(),
        compression,
    };

    debug!(
        dataset_path = %spec.dataset_path,
        compression = ?spec.compression,
        distributed_args = spec.distributed_args.len(),
        "Resolved training job"
    );

    Ok(spec)
}

fn select_hook(value: Option<&str>, policy: HookValidation) -> Result<HookSelection> {
    let Some(value) = value else {
        return Ok(HookSelection::None);
    };

    match (value.parse::<CompressionScheme>(), policy) {
        (Ok(scheme), _) => Ok(HookSelection::Known(scheme)),
        (Err(_), HookValidation::PassThrough) => Ok(HookSelection::Unchecked(value.to_string())),
        (Err(e), HookValidation::Strict) => Err(e),
    }
}

/// Build the argument list passed to the launcher program
///
/// Layout: launcher args, distributed args, entry point, training flags,
/// dataset path. Every value flag is immediately followed by its value.
pub fn to_argument_list(spec: &TrainingJobSpec) -> Vec<String> {
    let p = &spec.params;
    let mut args = Vec::with_capacity(spec.launcher_args.len() + spec.distributed_args.len() + 40);

    args.extend(spec.launcher_args.iter().cloned());
    args.extend(spec.distributed_args.iter().cloned());
    args.push(spec.entry_point.clone());

    let mut flag = |name: &str, value: String| {
        args.push(format!("--{name}"));
        args.push(value);
    };

    flag("task", p.task.clone());
    flag("tokens-per-sample", p.tokens_per_sample.to_string());
    flag("batch-size", p.batch_size.to_string());
    flag("update-freq", p.update_freq.to_string());
    flag("encoder-embed-dim", p.encoder_embed_dim.to_string());
    flag("encoder-ffn-embed-dim", p.encoder_ffn_embed_dim.to_string());
    flag("encoder-layers", p.encoder_layers.to_string());
    flag("encoder-attention-heads", p.encoder_attention_heads.to_string());
    flag("dropout", p.dropout.to_string());
    flag("attention-dropout", p.attention_dropout.to_string());
    flag("optimizer", p.optimizer.clone());
    flag("weight-decay", p.weight_decay.to_string());
    flag("lr", p.lr.to_string());
    flag("log-format", p.log_format.clone());
    flag("log-interval", p.log_interval.to_string());
    flag("max-epoch", p.max_epoch.to_string());

    args.push("--no-save".to_string());
    args.push("--model-parallel-size".to_string());
    args.push(p.model_parallel_size.to_string());
    args.push("--skip-invalid-size-inputs-valid-test".to_string());

    args.push(spec.dataset_path.clone());
    args
}

impl TrainingJobSpec {
    /// Full command for this job, including the child environment overrides
    pub fn invocation(&self) -> Invocation {
        let mut env = BTreeMap::new();
        env.insert(
            COMM_HOOK_TYPE.to_string(),
            self.compression.as_env_value().map(str::to_string),
        );

        Invocation {
            program: self.program.clone(),
            args: to_argument_list(self),
            env,
        }
    }
}
