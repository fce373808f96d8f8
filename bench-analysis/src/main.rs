use anyhow::{Context, Result};
use bench_analysis::{chart_renderer, run, AnalysisOptions, Cli, Config};
use clap::Parser;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);
    tracing::debug!(?config, "Configuration");

    let options = AnalysisOptions::from_config(&cli.results_dir, &config);
    let renderer = chart_renderer(&config);

    let stdout = io::stdout();
    let summary = run(&options, stdout.lock(), &renderer).with_context(|| {
        format!(
            "Failed to analyze results in {}",
            cli.results_dir.display()
        )
    })?;

    tracing::info!(
        records = summary.records,
        groups = summary.aggregates.len(),
        chart = summary.chart_path.is_some(),
        "Analysis complete"
    );

    Ok(())
}

/// Log to stderr so stdout carries only the detailed CSV table.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "bench_analysis=debug,bench_analysis_core=debug"
    } else {
        "bench_analysis=warn,bench_analysis_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
