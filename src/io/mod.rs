//! Input/output: daily-snapshot ingest and chart export.

pub mod export;
pub mod ingest;
