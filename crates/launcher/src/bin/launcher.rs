//! Launcher binary entry point
//!
//! Usage: `launcher [DATASET_PATH]`
//!
//! Reads `COMM_HOOK_TYPE`, `DISTRIBUTED_ARGS` and `WIKITEXT_DATA_PATH` from
//! the environment and an optional JSON config from `LAUNCHER_CONFIG`.

use std::ffi::OsString;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use launch_core::{Environment, Error, LauncherConfig};
use launcher::{ChildProcessLauncher, LaunchConfigurator};

const LAUNCHER_CONFIG: &str = "LAUNCHER_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launcher=info,launch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = Environment::from_process();

    if env.is_non_utf8(LAUNCHER_CONFIG) {
        fail(Error::config(format!("{LAUNCHER_CONFIG} is not valid UTF-8")));
    }

    let config = match env.get(LAUNCHER_CONFIG) {
        Some(path) => match LauncherConfig::from_file(path) {
            Ok(config) => {
                tracing::info!(path, "Loaded launcher config");
                config
            }
            Err(e) => fail(e),
        },
        None => LauncherConfig::default(),
    };

    let dataset_path = match std::env::args_os()
        .nth(1)
        .map(OsString::into_string)
        .transpose()
    {
        Ok(path) => path,
        Err(raw) => fail(Error::config(format!(
            "dataset path argument {raw:?} is not valid UTF-8"
        ))),
    };

    let configurator = LaunchConfigurator::new(config, ChildProcessLauncher::new());
    let code = match configurator.run(&env, dataset_path.as_deref()).await {
        Ok(status) => status.code,
        // already logged by the configurator
        Err(e) => e.exit_code(),
    };

    std::process::exit(code);
}

fn fail(e: Error) -> ! {
    tracing::error!(error = %e, "Launcher setup failed");
    std::process::exit(e.exit_code());
}
