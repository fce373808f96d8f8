//! Core types and pipeline stages for bench-analysis.
//!
//! This crate loads a directory of per-run load-test results, renders them as
//! CSV tables, aggregates them per (mode, concurrency) and draws the optional
//! p95-vs-concurrency chart. The `bench-analysis` binary wires the stages together.

pub mod aggregate;
pub mod chart;
pub mod error;
pub mod loader;
pub mod record;
pub mod report;

// Re-export main types for convenience
pub use aggregate::{aggregate, group_records, GroupAccumulator, MissingPolicy};
pub use chart::{p95_series, ChartError, ChartRenderer, PngChartRenderer, CHART_FILE_NAME};
pub use error::AnalysisError;
pub use loader::{load_results, parse_run_key, LoaderOptions};
pub use record::{AggregateRecord, GroupKey, Metric, ResultRecord, RunKey, RunMetrics};
pub use report::{
    AggregateReporter, DetailedReporter, ReportError, TerminalSummary, AGGREGATE_FILE_NAME,
};
