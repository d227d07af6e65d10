//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingestion window
//! - aggregates the selected series
//! - prints reports/plots or launches the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{ChartArgs, Command};
use crate::data::CsseClient;
use crate::domain::{DateWindow, SeriesParams, ViewParams, ALL_REGIONS};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `trend` binary.
pub fn run() -> Result<(), AppError> {
    // We want `trend` and `trend -c US` to behave like `trend tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Chart(args) => handle_chart(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let client = CsseClient::from_env()?;
    let window = window_from_args(&args)?;
    let view = view_from_args(&args);

    let mut last_pct = 0u8;
    let load = pipeline::run_load(&client, window, args.on_error, &mut |pct, _| {
        if pct != last_pct {
            eprint!("\rData loading {pct}% complete");
            last_pct = pct;
        }
    });
    eprintln!();

    println!("{}", crate::report::format_ingest_summary(&load.ingest));

    let chart = load.curate(&view);
    println!("{}", crate::report::format_series_table(&chart));

    if args.plot && !args.no_plot {
        println!("{}", crate::plot::render_ascii_plot(&chart, args.width, args.height));
    }

    println!("{}", crate::report::ATTRIBUTION);

    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &chart)?;
    }

    Ok(())
}

/// Build the date window, defaulting the as-of date to today.
pub fn window_from_args(args: &ChartArgs) -> Result<DateWindow, AppError> {
    let asof = args
        .asof
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    DateWindow::new(args.epoch, asof)
}

/// Build the initial view state from CLI flags.
///
/// Any `--compare-*` flag enables the secondary series; its unspecified
/// fields default from the primary (country/metric/totals) or to `All`.
pub fn view_from_args(args: &ChartArgs) -> ViewParams {
    let primary = SeriesParams {
        country: args.country.clone(),
        province: args.province.clone(),
        metric: args.metric,
        totals: args.totals,
    };

    let wants_secondary = args.compare_country.is_some()
        || args.compare_province.is_some()
        || args.compare_metric.is_some()
        || args.compare_totals.is_some();

    let secondary = wants_secondary.then(|| SeriesParams {
        country: args
            .compare_country
            .clone()
            .unwrap_or_else(|| primary.country.clone()),
        province: args
            .compare_province
            .clone()
            .unwrap_or_else(|| ALL_REGIONS.to_string()),
        metric: args.compare_metric.unwrap_or(primary.metric),
        totals: args.compare_totals.unwrap_or(primary.totals),
    });

    ViewParams { primary, secondary }
}

/// Rewrite argv so `trend` defaults to `trend tui`.
///
/// Rules:
/// - `trend`                     -> `trend tui`
/// - `trend -c US ...`           -> `trend tui -c US ...`
/// - `trend --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "chart" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
