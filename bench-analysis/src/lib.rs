//! bench-analysis: flatten and aggregate load-test run results
//!
//! This library provides the command-line surface, configuration and the
//! pipeline driver on top of `bench-analysis-core`.

pub mod cli;
pub mod config;
pub mod pipeline;

// Re-export core types for convenience
pub use bench_analysis_core::{
    AggregateRecord, AnalysisError, ChartError, ChartRenderer, MissingPolicy, PngChartRenderer,
    ResultRecord, RunKey, AGGREGATE_FILE_NAME, CHART_FILE_NAME,
};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::Config;
pub use pipeline::{chart_renderer, run, try_render_chart, AnalysisOptions, RunSummary};
