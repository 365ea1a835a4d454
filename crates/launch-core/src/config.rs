//! Launcher configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Main launcher configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Distributed launcher command
    pub launcher: LauncherCommandConfig,

    /// Fixed training parameters
    pub job: JobParameters,

    /// How `COMM_HOOK_TYPE` is checked before dispatch
    pub hook_validation: HookValidation,

    /// Log the command instead of running it
    pub dry_run: bool,
}

impl LauncherConfig {
    /// Parse a config from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    ///
    /// Any failure here is a configuration error: nothing has run yet.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|contents| Self::from_json(&contents))
            .map_err(|e| {
                Error::config(format!("cannot load launcher config {}: {e}", path.display()))
            })
    }

    /// Reject values that cannot form a launch
    pub fn validate(&self) -> Result<()> {
        if self.launcher.program.trim().is_empty() {
            return Err(Error::config("launcher program is empty"));
        }
        if self.launcher.entry_point.trim().is_empty() {
            return Err(Error::config("training entry point is empty"));
        }
        self.job.validate()
    }
}

/// Distributed launcher command configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherCommandConfig {
    /// Program to execute
    pub program: String,

    /// Arguments placed before the distributed-launch arguments
    pub args: Vec<String>,

    /// Training entry point
    pub entry_point: String,
}

impl Default for LauncherCommandConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "torch.distributed.launch".to_string()],
            entry_point: "train.py".to_string(),
        }
    }
}

/// Policy for unrecognized `COMM_HOOK_TYPE` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookValidation {
    /// Reject unknown values before launching
    #[default]
    Strict,

    /// Forward unknown values and let the training process reject them
    PassThrough,
}

/// Training parameters forwarded as flags to the entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobParameters {
    pub task: String,

    pub tokens_per_sample: u32,
    pub batch_size: u32,
    pub update_freq: u32,

    pub encoder_embed_dim: u32,
    pub encoder_ffn_embed_dim: u32,
    pub encoder_layers: u32,
    pub encoder_attention_heads: u32,

    pub dropout: f64,
    pub attention_dropout: f64,

    pub optimizer: String,
    pub weight_decay: f64,
    pub lr: f64,

    pub log_format: String,
    pub log_interval: u32,

    pub max_epoch: u32,

    pub model_parallel_size: u32,
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            task: "masked_lm".to_string(),
            tokens_per_sample: 512,
            batch_size: 8,
            update_freq: 1,
            encoder_embed_dim: 1024,
            encoder_ffn_embed_dim: 4096,
            encoder_layers: 12,
            encoder_attention_heads: 16,
            dropout: 0.1,
            attention_dropout: 0.1,
            optimizer: "adam".to_string(),
            weight_decay: 0.01,
            lr: 0.001,
            log_format: "simple".to_string(),
            log_interval: 10,
            max_epoch: 3,
            model_parallel_size: 1,
        }
    }
}

impl JobParameters {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tokens_per_sample", self.tokens_per_sample),
            ("batch_size", self.batch_size),
            ("update_freq", self.update_freq),
            ("max_epoch", self.max_epoch),
            ("model_parallel_size", self.model_parallel_size),
        ] {
            if value == 0 {
                return Err(Error::config(format!("{name} must be positive")));
            }
        }

        for (name, value) in [("task", &self.task), ("optimizer", &self.optimizer)] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{name} is empty")));
            }
        }

        if !self.lr.is_finite() || self.lr < 0.0 {
            return Err(Error::config(format!("invalid learning rate {}", self.lr)));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(Error::config(format!(
                "invalid weight decay {}",
                self.weight_decay
            )));
        }

        for (name, value) in [
            ("dropout", self.dropout),
            ("attention_dropout", self.attention_dropout),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::config(format!("{name} must be in [0, 1), got {value}")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LauncherConfig::default();
        assert_eq!(config.launcher.program, "python");
        assert_eq!(config.launcher.entry_point, "train.py");
        assert_eq!(config.job.encoder_layers, 12);
        assert_eq!(config.job.lr, 0.001);
        assert_eq!(config.job.max_epoch, 3);
        assert_eq!(config.hook_validation, HookValidation::Strict);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = LauncherConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = LauncherConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "hook_validation": "pass_through",
            "job": { "max_epoch": 10 },
            "launcher": { "program": "torchrun", "args": [] }
        }"#;
        let config = LauncherConfig::from_json(json).unwrap();
        assert_eq!(config.hook_validation, HookValidation::PassThrough);
        assert_eq!(config.job.max_epoch, 10);
        assert_eq!(config.job.encoder_layers, 12);
        assert_eq!(config.launcher.program, "torchrun");
        assert!(config.launcher.args.is_empty());
        assert_eq!(config.launcher.entry_point, "train.py");
    }

    #[test]
    fn test_malformed_config() {
        let err = LauncherConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        std::fs::write(&path, r#"{ "dry_run": true }"#).unwrap();

        let config = LauncherConfig::from_file(&path).unwrap();
        assert!(config.dry_run);

        let missing = LauncherConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(missing.is_configuration());
        assert_eq!(missing.exit_code(), crate::error::EXIT_CONFIGURATION);

        std::fs::write(&path, "{ not json").unwrap();
        let malformed = LauncherConfig::from_file(&path).unwrap_err();
        assert!(malformed.is_configuration());
        assert!(malformed.to_string().contains("launcher.json"));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = LauncherConfig::default();
        config.launcher.program = " ".to_string();
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = LauncherConfig::default();
        config.job.model_parallel_size = 0;
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = LauncherConfig::default();
        config.job.dropout = 1.0;
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = LauncherConfig::default();
        config.job.lr = f64::NAN;
        assert!(config.validate().unwrap_err().is_configuration());
    }
}
