//! The analysis pipeline: load, report, aggregate, and chart.
//!
//! Stages run strictly in sequence. Any load, parse or write failure aborts the
//! run with whatever output was already flushed left in place; a chart failure
//! is logged and otherwise ignored.

use std::io::Write;
use std::path::{Path, PathBuf};

use bench_analysis_core::{
    aggregate, load_results, AggregateRecord, AggregateReporter, AnalysisError, ChartRenderer,
    DetailedReporter, LoaderOptions, MissingPolicy, PngChartRenderer, TerminalSummary,
    CHART_FILE_NAME,
};
use tracing::{debug, info};

use crate::config::Config;

/// Settings for one analysis run, resolved from config and CLI.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Directory holding the run result files; also receives the aggregate table and chart.
    pub results_dir: PathBuf,
    pub loader: LoaderOptions,
    pub missing: MissingPolicy,
    pub chart: bool,
    pub summary: bool,
    pub color: bool,
}

impl AnalysisOptions {
    /// Resolve options for `results_dir` from a loaded configuration.
    pub fn from_config(results_dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            results_dir: results_dir.into(),
            loader: LoaderOptions::with_extension(&config.input.extension),
            missing: config.aggregate.missing,
            chart: config.chart.enabled,
            summary: config.output.summary,
            color: config.output.color,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Rows written to the detailed table.
    pub records: usize,
    /// Groups in the aggregate table.
    pub aggregates: Vec<AggregateRecord>,
    /// Path of the aggregate table.
    pub aggregate_path: PathBuf,
    /// Path of the chart, if one was rendered.
    pub chart_path: Option<PathBuf>,
}

/// Build the default chart renderer from configuration.
pub fn chart_renderer(config: &Config) -> PngChartRenderer {
    PngChartRenderer::new(
        config.chart.width,
        config.chart.height,
        config.chart.font.clone(),
    )
}

/// Run the whole pipeline, writing the detailed table to `out`.
///
/// `renderer` is only consulted when charts are enabled in `options`.
pub fn run<W: Write>(
    options: &AnalysisOptions,
    mut out: W,
    renderer: &dyn ChartRenderer,
) -> Result<RunSummary, AnalysisError> {
    let dir = options.results_dir.as_path();

    // 1. Load runs
    let records = load_results(dir, &options.loader)?;

    // 2. Detailed table
    DetailedReporter::new().write(&mut out, &records)?;
    out.flush()?;

    // 3. Aggregate table
    let aggregates = aggregate(&records, options.missing)?;
    let aggregate_path = AggregateReporter::new().write_file(dir, &aggregates)?;
    info!(path = %aggregate_path.display(), groups = aggregates.len(), "Wrote aggregate table");

    // 4. Chart, best effort
    let chart_path = if options.chart {
        try_render_chart(renderer, &aggregates, dir)
    } else {
        None
    };

    // 5. Terminal summary
    if options.summary {
        let summary = if options.color {
            TerminalSummary::new()
        } else {
            TerminalSummary::without_colors()
        };
        summary.report(&aggregates)?;
    }

    Ok(RunSummary {
        records: records.len(),
        aggregates,
        aggregate_path,
        chart_path,
    })
}

/// Render the chart into `dir`, swallowing any failure.
pub fn try_render_chart(
    renderer: &dyn ChartRenderer,
    aggregates: &[AggregateRecord],
    dir: &Path,
) -> Option<PathBuf> {
    let path = dir.join(CHART_FILE_NAME);
    match renderer.render(aggregates, &path) {
        Ok(()) => {
            info!(path = %path.display(), "Rendered chart");
            Some(path)
        }
        Err(e) => {
            debug!(error = %e, "Skipping chart");
            None
        }
    }
}
