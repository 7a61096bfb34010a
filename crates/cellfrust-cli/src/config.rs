//! Configuration management for Cellfrust CLI.

use anyhow::{bail, Context, Result};
use cellfrust::core::params::Params;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the project config file.
pub const CONFIG_FILE: &str = "cellfrust.toml";

/// Name of the plain-text parameter file of older experiment directories.
pub const LEGACY_PARAMS_FILE: &str = "parameters.txt";

/// Cellfrust experiment configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub experiment: Params,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

// Default value functions
fn default_input_dir() -> PathBuf { PathBuf::from("input") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    pub fn input(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

impl Config {
    /// Load config from an explicit path, else from cellfrust.toml in the
    /// current or parent directories, else from `input/parameters.txt`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        if let Some(path) = find_config_file() {
            return Self::load_from(&path);
        }
        let legacy = default_input_dir().join(LEGACY_PARAMS_FILE);
        if legacy.exists() {
            return Self::load_from(&legacy);
        }
        Ok(Config::default())
    }

    /// Load a TOML config, or a legacy parameter file when the extension
    /// is `.txt`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = if path.extension().is_some_and(|ext| ext == "txt") {
            let experiment = parse_legacy_params(&content)
                .with_context(|| format!("Failed to parse parameters: {}", path.display()))?;
            Config {
                experiment,
                ..Config::default()
            }
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        };
        config
            .experiment
            .validate()
            .with_context(|| format!("Invalid experiment parameters in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Parse `key: value` lines such as `presenters sets: 2`. Blank lines are
/// skipped and unknown keys are ignored with a warning.
pub fn parse_legacy_params(content: &str) -> Result<Params> {
    let mut params = Params::default();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            bail!("line {}: expected `key: value`, found `{line}`", number + 1);
        };
        let (key, value) = (key.trim(), value.trim());
        let context = || format!("line {}: invalid value `{value}` for `{key}`", number + 1);
        match key {
            "seed" => params.seed = value.parse().with_context(context)?,
            "presenters sets" => params.presenter_sets = value.parse().with_context(context)?,
            "sample rounds" => params.sample_rounds = value.parse().with_context(context)?,
            "frustration rounds" => params.frustration_rounds = value.parse().with_context(context)?,
            "training rounds" => params.training_rounds = value.parse().with_context(context)?,
            "monitoring rounds" => params.monitoring_rounds = value.parse().with_context(context)?,
            "training interval" => params.training_interval = value.parse().with_context(context)?,
            "calibration percentile" => {
                params.calibration_percentile = value.parse().with_context(context)?
            }
            "train" => params.train = value.parse::<u8>().with_context(context)? != 0,
            "monitor" => params.monitor = value.parse::<u8>().with_context(context)? != 0,
            "dissociation odds" => params.dissociation_odds = value.parse().with_context(context)?,
            "max nu" => params.max_nu = value.parse().with_context(context)?,
            other => warn!(key = other, "ignoring unknown parameter"),
        }
    }
    Ok(params)
}

/// Find cellfrust.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_keys_map_onto_params() {
        let content = "seed: 3\npresenters sets: 4\nsample rounds: 25\n\nmax nu: 0.2\ntrain: 0\n";
        let params = parse_legacy_params(content).unwrap();
        assert_eq!(params.seed, 3);
        assert_eq!(params.presenter_sets, 4);
        assert_eq!(params.sample_rounds, 25);
        assert_eq!(params.max_nu, 0.2);
        assert!(!params.train);
        assert!(params.monitor);
        assert_eq!(params.training_interval, Params::default().training_interval);
    }

    #[test]
    fn legacy_parser_reports_bad_lines() {
        assert!(parse_legacy_params("seed 3").is_err());
        assert!(parse_legacy_params("sample rounds: many").is_err());
        assert!(parse_legacy_params("colour: blue").is_ok());
    }

    #[test]
    fn toml_sections_fill_missing_fields_with_defaults() {
        let config: Config = toml::from_str(
            "[experiment]\nseed = 7\ntraining_rounds = 500\n\n[paths]\noutput_dir = \"results\"\n",
        )
        .unwrap();
        assert_eq!(config.experiment.seed, 7);
        assert_eq!(config.experiment.training_rounds, 500);
        assert_eq!(config.experiment.presenter_sets, 1);
        assert_eq!(config.paths.input_dir, PathBuf::from("input"));
        assert_eq!(config.paths.output("auc.csv"), PathBuf::from("results/auc.csv"));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.experiment.seed = 42;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.experiment, config.experiment);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[experiment]"));
    }

    #[test]
    fn legacy_file_is_detected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_PARAMS_FILE);
        std::fs::write(&path, "seed: 9\npresenters sets: 2\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.experiment.seed, 9);
        assert_eq!(config.experiment.presenter_sets, 2);
    }

    #[test]
    fn invalid_parameters_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_PARAMS_FILE);
        std::fs::write(&path, "training interval: 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
