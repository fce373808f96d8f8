//! Command-line interface for bench-analysis.

use crate::config::Config;
use bench_analysis_core::MissingPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bench-analysis")]
#[command(about = "Flatten and aggregate a directory of load-test run results")]
#[command(version)]
pub struct Cli {
    /// Directory holding `<mode>-<concurrency>-<repeat>.json` result files
    pub results_dir: PathBuf,

    /// Path to config file (defaults to .bench-analysis.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Extension of run result files
    #[arg(long)]
    pub extension: Option<String>,

    /// How to treat runs missing a metric: fatal or skip
    #[arg(long)]
    pub missing: Option<MissingPolicy>,

    /// Do not render the p95-vs-concurrency chart
    #[arg(long)]
    pub no_chart: bool,

    /// Print a per-group summary table to stderr
    #[arg(long)]
    pub summary: bool,

    /// Disable colors in the summary table
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values and set flags will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(extension) = &self.extension {
            config.input.extension = extension.trim_start_matches('.').to_string();
        }

        if let Some(missing) = self.missing {
            config.aggregate.missing = missing;
        }

        if self.no_chart {
            config.chart.enabled = false;
        }

        if self.summary {
            config.output.summary = true;
        }

        if self.no_color {
            config.output.color = false;
        }
    }
}
