//! Command-line parsing for the CSSE-based trend charts.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{FailurePolicy, Metric, TotalsMode, DEFAULT_EPOCH};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trend", version, about = "COVID-19 daily-snapshot trend charts (CSSE-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest the date window, aggregate per the selectors, and print a
    /// table plus an ASCII plot.
    Chart(ChartArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same ingest pipeline as `trend chart`, but renders the
    /// series in a terminal UI using Ratatui, with live selectors.
    Tui(ChartArgs),
}

/// Selector and window options shared by `chart` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    /// Country to chart ("All" charts every region).
    #[arg(short = 'c', long, default_value = "All")]
    pub country: String,

    /// Province within the country ("All" means the whole country).
    #[arg(short = 'p', long, default_value = "All")]
    pub province: String,

    /// Which count to chart.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Confirmed)]
    pub metric: Metric,

    /// Day-over-day deltas or running totals.
    #[arg(short = 't', long, value_enum, default_value_t = TotalsMode::Daily)]
    pub totals: TotalsMode,

    /// Country for a second comparison series.
    #[arg(long)]
    pub compare_country: Option<String>,

    /// Province for the comparison series.
    #[arg(long)]
    pub compare_province: Option<String>,

    /// Metric for the comparison series.
    #[arg(long, value_enum)]
    pub compare_metric: Option<Metric>,

    /// Totals mode for the comparison series.
    #[arg(long, value_enum)]
    pub compare_totals: Option<TotalsMode>,

    /// Window epoch; the first snapshot fetched is the following day.
    #[arg(long, default_value = DEFAULT_EPOCH)]
    pub epoch: NaiveDate,

    /// Last day of the window (inclusive). Defaults to today.
    #[arg(long)]
    pub asof: Option<NaiveDate>,

    /// What to do when a day's fetch or parse fails.
    #[arg(long, value_enum, default_value_t = FailurePolicy::Stop)]
    pub on_error: FailurePolicy,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the aggregated series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
