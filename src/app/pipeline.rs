//! Shared "load pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sequential day fetch -> parse -> normalize -> accumulate -> aggregate
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;

use crate::data::CsseClient;
use crate::domain::{ChartData, DateWindow, FailurePolicy, ViewParams};
use crate::io::ingest::{self, IngestedData};

/// Everything the front-ends need after ingestion completes.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub ingest: IngestedData,
    /// Sorted distinct countries, for region selectors.
    pub countries: Vec<String>,
}

impl LoadOutput {
    /// Sorted distinct provinces of a country, for subregion selectors.
    pub fn provinces(&self, country: &str) -> Vec<String> {
        crate::agg::list_provinces(&self.ingest.records, country)
    }

    /// Aggregate the accumulated records for a view. Pure; never re-fetches.
    pub fn curate(&self, view: &ViewParams) -> ChartData {
        crate::agg::curate_chart_data(&self.ingest.records, view)
    }
}

/// Run the full ingestion window and derive the selector inputs.
///
/// `progress` fires after each day with the floored percentage; failures are
/// captured in the ingest report per the policy, never raised here.
pub fn run_load(
    client: &CsseClient,
    window: DateWindow,
    policy: FailurePolicy,
    progress: &mut dyn FnMut(u8, NaiveDate),
) -> LoadOutput {
    let ingest = ingest::run_ingest(client, window, policy, progress);
    let countries = crate::agg::list_countries(&ingest.records);
    LoadOutput { ingest, countries }
}
