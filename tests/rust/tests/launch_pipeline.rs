use anyhow::Result;
use launch_core::environment::{COMM_HOOK_TYPE, DISTRIBUTED_ARGS, WIKITEXT_DATA_PATH};
use launch_core::{CompressionScheme, Environment, Error, LauncherConfig};
use launcher::{ChildProcessLauncher, LaunchConfigurator};

// Stand-in launcher: `sh -c <script>` receives the entry point as $0 and
// the training flags plus dataset path as positional parameters.
fn sh_config(script: &str) -> LauncherConfig {
    let mut config = LauncherConfig::default();
    config.launcher.program = "sh".to_string();
    config.launcher.args = vec!["-c".to_string(), script.to_string()];
    config
}

#[cfg(unix)]
#[tokio::test]
async fn test_child_exit_code_propagates() -> Result<()> {
    let configurator = LaunchConfigurator::new(sh_config("exit 7"), ChildProcessLauncher::new());
    let status = configurator
        .run(&Environment::new(), Some("/data/wikitext"))
        .await?;
    assert_eq!(status.code, 7);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_child_sees_job() -> Result<()> {
    let script = r#"
        for arg; do last=$arg; done
        [ "$0" = train.py ] || exit 10
        [ "$last" = /data/wikitext ] || exit 11
        [ "$COMM_HOOK_TYPE" = FP16_POWER_SGD ] || exit 12
        [ "$1" = --task ] || exit 13
    "#;
    let config = sh_config(script);

    let env = Environment::new()
        .with(COMM_HOOK_TYPE, CompressionScheme::Fp16PowerSgd.as_str())
        .with(WIKITEXT_DATA_PATH, "/data/wikitext");

    let configurator = LaunchConfigurator::new(config, ChildProcessLauncher::new());
    let status = configurator.run(&env, None).await?;
    assert_eq!(status.code, 0, "child rejected the invocation");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_distributed_args_precede_entry_point() -> Result<()> {
    let script = r#"[ "$0" = --nnodes ] && [ "$1" = 2 ] && [ "$2" = train.py ]"#;
    let env = Environment::new().with(DISTRIBUTED_ARGS, "--nnodes 2");

    let configurator = LaunchConfigurator::new(sh_config(script), ChildProcessLauncher::new());
    let status = configurator.run(&env, Some("/data")).await?;
    assert!(status.is_success());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_signal_is_not_an_exit_code() {
    let configurator =
        LaunchConfigurator::new(sh_config("kill -KILL $$"), ChildProcessLauncher::new());
    let err = configurator
        .run(&Environment::new(), Some("/data"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SignalTermination { signal: 9 }));
    assert_eq!(err.exit_code(), 137);
}

#[tokio::test]
async fn test_missing_entry_point_program() {
    let mut config = LauncherConfig::default();
    config.launcher.program = "/nonexistent/python-for-launch-test".to_string();

    let configurator = LaunchConfigurator::new(config, ChildProcessLauncher::new());
    let err = configurator
        .run(&Environment::new(), Some("/data"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Launch { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_configuration_error_exit_code() {
    let configurator =
        LaunchConfigurator::new(sh_config("exit 0"), ChildProcessLauncher::new());
    let env = Environment::new().with(COMM_HOOK_TYPE, "POWERSGD");
    let err = configurator.run(&env, Some("/data")).await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.exit_code(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_config_file_drives_launch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("launcher.json");
    std::fs::write(
        &path,
        r#"{
            "launcher": { "program": "sh", "args": ["-c", "exit 4"] },
            "job": { "max_epoch": 1 }
        }"#,
    )?;

    let config = LauncherConfig::from_file(&path)?;
    assert_eq!(config.job.max_epoch, 1);

    let configurator = LaunchConfigurator::new(config, ChildProcessLauncher::new());
    let spec = configurator.resolve(&Environment::new(), Some("/data"))?;
    let args = configurator.to_argument_list(&spec);
    assert!(args.windows(2).any(|w| w[0] == "--max-epoch" && w[1] == "1"));

    let status = configurator.launch(&spec.invocation()).await?;
    assert_eq!(status.code, 4);
    Ok(())
}
