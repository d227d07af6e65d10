//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - selector enums (`Metric`, `TotalsMode`, `FailurePolicy`)
//! - normalized daily observations (`DailyRecord`)
//! - view state (`SeriesParams`, `ViewParams`, `ViewPatch`)
//! - chart output (`ChartPoint`, `ChartData`)

pub mod types;

pub use types::*;
