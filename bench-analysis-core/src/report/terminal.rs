use std::io::{self, Write};

use colored::Colorize;

use super::ReportError;
use crate::record::AggregateRecord;

/// A human-readable table of group summaries for the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalSummary {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalSummary {
    /// Create a new terminal summary with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal summary with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    /// Format a latency in milliseconds to a human-readable string.
    fn format_latency(ms: Option<f64>) -> String {
        match ms {
            None => "-".to_string(),
            Some(ms) if ms >= 1_000.0 => format!("{:.3} s", ms / 1_000.0),
            Some(ms) if ms >= 1.0 => format!("{:.3} ms", ms),
            Some(ms) => format!("{:.3} us", ms * 1_000.0),
        }
    }

    /// Format the p95 mean with its spread across repeats.
    fn format_p95(agg: &AggregateRecord) -> String {
        let mean = Self::format_latency(agg.p95_ms);
        match agg.p95_std_dev {
            Some(sd) => format!("{} (+/- {})", mean, Self::format_latency(Some(sd))),
            None => mean,
        }
    }

    fn format_rps(rps: Option<f64>) -> String {
        rps.map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string())
    }

    fn format_errors(errors: Option<f64>) -> String {
        errors
            .map(|e| format!("{}", e))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Print the table header.
    fn print_header(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer)?;
        let header = format!(
            "{:<24} {:>11} {:>5} {:>12} {:>28} {:>12} {:>12} {:>8}",
            "Mode", "Concurrency", "Runs", "p50", "p95", "p99", "rps", "Errors"
        );
        if self.use_colors {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        writeln!(writer, "{}", "-".repeat(119))?;
        Ok(())
    }

    /// Print a single group row.
    fn print_row(&self, writer: &mut impl Write, agg: &AggregateRecord) -> io::Result<()> {
        let mode = if agg.mode.chars().count() > 22 {
            let head: String = agg.mode.chars().take(19).collect();
            format!("{}...", head)
        } else {
            agg.mode.clone()
        };

        let errors = Self::format_errors(agg.errors);
        let errors_padding = 8_usize.saturating_sub(errors.len());
        let errors = if self.use_colors && agg.errors.is_some_and(|e| e > 0.0) {
            errors.red().bold().to_string()
        } else {
            errors
        };

        writeln!(
            writer,
            "{:<24} {:>11} {:>5} {:>12} {:>28} {:>12} {:>12} {:>width_errors$}{}",
            mode,
            agg.concurrency,
            agg.runs,
            Self::format_latency(agg.p50_ms),
            Self::format_p95(agg),
            Self::format_latency(agg.p99_ms),
            Self::format_rps(agg.rps),
            "",
            errors,
            width_errors = errors_padding,
        )?;
        Ok(())
    }

    /// Print the summary footer.
    fn print_footer(&self, writer: &mut impl Write, aggregates: &[AggregateRecord]) -> io::Result<()> {
        let runs: usize = aggregates.iter().map(|a| a.runs).sum();
        let failing = aggregates
            .iter()
            .filter(|a| a.errors.is_some_and(|e| e > 0.0))
            .count();

        writeln!(writer, "{}", "-".repeat(119))?;

        let label = "Summary:";
        if self.use_colors {
            write!(writer, "{} ", label.bold())?;
        } else {
            write!(writer, "{} ", label)?;
        }

        let groups_text = format!("{} groups", aggregates.len());
        let runs_text = format!("{} runs", runs);
        let failing_text = format!("{} with errors", failing);

        if self.use_colors && failing > 0 {
            writeln!(writer, "{}, {}, {}", groups_text, runs_text, failing_text.red())?;
        } else {
            writeln!(writer, "{}, {}, {}", groups_text, runs_text, failing_text)?;
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Write the full table to `writer`.
    pub fn write<W: Write>(&self, mut writer: W, aggregates: &[AggregateRecord]) -> Result<(), ReportError> {
        self.print_header(&mut writer)?;

        for agg in aggregates {
            self.print_row(&mut writer, agg)?;
        }

        self.print_footer(&mut writer, aggregates)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the table to standard error, keeping standard output free for CSV.
    pub fn report(&self, aggregates: &[AggregateRecord]) -> Result<(), ReportError> {
        let stderr = io::stderr();
        let mut writer = stderr.lock();
        self.write(&mut writer, aggregates)
    }
}
