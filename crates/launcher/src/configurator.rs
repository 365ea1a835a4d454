//! Launch pipeline: resolve, build arguments, run

use launch_core::{
    resolve_with, to_argument_list, Environment, HookSelection, Invocation, LauncherConfig,
    Result, TrainingJobSpec,
};
use tracing::{error, info, warn};

use crate::backend::{ExitStatus, ProcessLauncher};

/// Resolves a training job and dispatches it through a [`ProcessLauncher`]
pub struct LaunchConfigurator<L> {
    config: LauncherConfig,
    launcher: L,
}

impl<L: ProcessLauncher> LaunchConfigurator<L> {
    pub fn new(config: LauncherConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Resolve the job spec for this launch
    pub fn resolve(&self, env: &Environment, dataset_path: Option<&str>) -> Result<TrainingJobSpec> {
        resolve_with(&self.config, env, dataset_path)
    }

    /// Arguments passed to the launcher program
    pub fn to_argument_list(&self, spec: &TrainingJobSpec) -> Vec<String> {
        to_argument_list(spec)
    }

    /// Run one invocation and wait for it
    pub async fn launch(&self, invocation: &Invocation) -> Result<ExitStatus> {
        self.launcher.launch(invocation).await
    }

    /// Resolve and launch; configuration errors never reach the launcher
    pub async fn run(&self, env: &Environment, dataset_path: Option<&str>) -> Result<ExitStatus> {
        let spec = self.resolve(env, dataset_path).inspect_err(|e| {
            error!(error = %e, "Job configuration failed");
        })?;

        announce_hook(&spec.compression);

        let invocation = spec.invocation();
        info!(command = %invocation.command_line(), "Launching training job");

        if self.config.dry_run {
            info!("Dry run, training process not started");
            return Ok(ExitStatus::SUCCESS);
        }

        let result = self.launch(&invocation).await;
        if let Err(e) = &result {
            error!(error = %e, "Training launch failed");
        }
        result
    }
}

fn announce_hook(selection: &HookSelection) {
    match selection {
        HookSelection::None => info!("No DDP communication hook is registered."),
        HookSelection::Known(scheme) => {
            let plan = scheme.hook_plan();
            info!(
                base = ?plan.base,
                fp16_wrapper = plan.fp16_wrapper,
                powersgd_state = ?plan.powersgd_state,
                "DDP communication hook {} is registered",
                scheme
            );
        }
        HookSelection::Unchecked(value) => warn!(
            "DDP communication hook {} is forwarded without local validation",
            value
        ),
    }
}
