//! Configuration loading for bench-analysis.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{Context, Result};
use bench_analysis_core::loader::DEFAULT_EXTENSION;
use bench_analysis_core::MissingPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for bench-analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for discovering run result files.
    pub input: InputConfig,
    /// Settings for per-group aggregation.
    pub aggregate: AggregateConfig,
    /// Settings for the p95-vs-concurrency chart.
    pub chart: ChartConfig,
    /// Settings for terminal output.
    pub output: OutputConfig,
}

/// Configuration for discovering run result files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Extension of run result files, without the leading dot.
    pub extension: String,
}

/// Configuration for per-group aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// What to do when a run lacks a metric: "fatal" or "skip".
    pub missing: MissingPolicy,
}

/// Configuration for the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Whether to attempt rendering the chart at all.
    pub enabled: bool,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// TrueType font for labels; searched for on the system when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

/// Configuration for terminal output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print a human-readable group summary to stderr.
    pub summary: bool,
    /// Use colors in the summary.
    pub color: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1024,
            height: 768,
            font: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary: false,
            color: true,
        }
    }
}

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".bench-analysis.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the default file (`.bench-analysis.toml`) or use defaults.
    ///
    /// If the file doesn't exist, default configuration is returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load_or_default() -> Result<Config> {
        Self::load_if_exists(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    pub fn load_if_exists(path: &Path) -> Result<Config> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the specified file cannot be read or parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }
}
