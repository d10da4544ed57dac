use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One observation in a series: a calendar date and a non-negative value.
///
/// `average` and `count` are populated only by the aggregator (weekly/monthly
/// buckets); raw ingested points never carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataPoint {
    #[schemars(description = "Calendar date of the observation (no time-of-day component)")]
    pub date: NaiveDate,

    #[schemars(description = "Observed value; finite and non-negative")]
    pub value: f64,

    #[schemars(description = "Mean of the source points in this bucket (aggregated points only)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,

    #[schemars(description = "Number of source points summed into this bucket (aggregated points only)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            average: None,
            count: None,
        }
    }
}

/// A named, colored, date-sorted collection of points sharing one metric.
///
/// After ingest the dates within one dataset are unique and ascending; gaps
/// are allowed. The `data` vector is replaced wholesale when the user switches
/// which metric the dataset represents, never mutated point-by-point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    #[schemars(description = "Display label, e.g. the uploaded file name")]
    pub label: String,

    #[schemars(description = "Points sorted ascending by date with unique dates")]
    pub data: Vec<DataPoint>,

    #[schemars(description = "Opaque display color token, e.g. a hex string")]
    pub color: String,

    #[schemars(description = "Header text of the metric column this dataset was derived from")]
    pub metric_name: String,

    #[schemars(description = "Display unit, e.g. \"USD\" or \"count\"")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A user-declared date range used to recolor a slice of a series.
///
/// Periods may overlap; when partitioning, the first period in declaration
/// order that contains a point wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColorPeriod {
    #[schemars(description = "Unique identifier for this period")]
    pub id: String,

    #[schemars(description = "Inclusive start of the period")]
    pub start_date: NaiveDate,

    #[schemars(description = "Inclusive end of the period")]
    pub end_date: NaiveDate,

    #[schemars(description = "Color assigned to points inside this period; periods sharing a color merge into one bucket")]
    pub color: String,

    #[schemars(description = "Human-readable label, e.g. a campaign name")]
    pub label: String,
}

/// An inclusive absolute date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Span in whole days, 0 for a single-day range.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// A point re-expressed relative to a per-series anchor date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlignedDataPoint {
    #[schemars(description = "Whole periods (days, weeks, or months) since the anchor; never negative")]
    pub day_offset: i64,

    #[schemars(description = "Value carried over from the aggregated source point")]
    pub value: f64,

    #[schemars(description = "Absolute date of the source point, kept for tooltips")]
    pub original_date: NaiveDate,
}

/// The aggregation unit. Weekly buckets anchor on Monday, monthly buckets on
/// the first of the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// The shape handed over by the external analytics fetch collaborator.
///
/// Each row is a loose JSON object; the engine's job starts here — it does
/// not care how the rows were fetched or authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedReport {
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub dimension_headers: Vec<String>,
    pub metric_headers: Vec<String>,
    pub row_count: usize,
}
