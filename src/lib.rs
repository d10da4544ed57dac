//! # Series Comparison Engine
//!
//! A library for turning messy tabular time-series exports into canonical
//! date/value series and comparing them — including series that cover
//! completely unrelated calendar windows.
//!
//! ## Core Concepts
//!
//! - **Canonical series**: points of `(NaiveDate, f64)` sorted ascending by
//!   date, produced by the tolerant ingest parser
//! - **Granularity**: daily (identity), weekly (Monday-anchored buckets), or
//!   monthly (calendar-month buckets); aggregation is sum-preserving
//! - **Color periods**: user-declared date ranges that partition a series
//!   into colored sub-series, first declared period winning overlaps
//! - **Overlap detection**: two series sharing less than 20% of the shorter
//!   span are treated as disjoint periods rather than one timeline
//! - **Alignment**: disjoint series are re-projected onto a relative offset
//!   axis ("day 0, day 1, ...") from a per-series anchor date
//!
//! ## Example
//!
//! ```rust
//! use series_comparison_engine::*;
//!
//! let grid: Vec<Vec<String>> = vec![
//!     vec!["Date".into(), "Revenue".into()],
//!     vec!["2024-01-01".into(), "100".into()],
//!     vec!["2024-01-02".into(), "200".into()],
//! ];
//!
//! let mut workspace = Workspace::new();
//! let table = parse_grid(&grid, None)?;
//! workspace.add_parsed(table, "january.csv", None);
//!
//! if workspace.needs_alignment() {
//!     workspace.auto_set_alignment_dates();
//!     let view = workspace.comparison_view(Granularity::Daily, &[]);
//!     for row in &view.table {
//!         println!("day {}: {:?}", row.offset, row.values);
//!     }
//! }
//! # Ok::<(), EngineError>(())
//! ```

pub mod aggregate;
pub mod align;
pub mod dates;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod overlap;
pub mod periods;
pub mod schema;
pub mod workspace;

pub use aggregate::aggregate;
pub use align::{align, comparison_table, offset_axis, ComparisonRow};
pub use dates::normalize_date;
pub use error::{EngineError, Result};
pub use filter::{available_date_range, data_date_range, filter_by_date_range};
pub use ingest::{
    dataset_from_report, parse_grid, reparse_with_metric, report_to_points, ParsedTable,
};
pub use overlap::{is_non_overlapping, ranges_overlap, OVERLAP_THRESHOLD};
pub use periods::{partition_by_color, point_color, ColorGroup};
pub use schema::{
    AlignedDataPoint, ColorPeriod, DataPoint, Dataset, DateRange, FetchedReport, Granularity,
};
pub use workspace::{
    AlignedSeries, ComparisonView, SeriesAttributes, SeriesId, Workspace, COLOR_PALETTE,
};
