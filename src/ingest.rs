use crate::dates::normalize_date;
use crate::error::{EngineError, Result};
use crate::schema::{DataPoint, Dataset, FetchedReport};
use log::debug;

/// Header substrings that mark a column as a likely metric, checked
/// case-insensitively. Columns matching one of these win over other numeric
/// columns when no metric was explicitly requested.
const METRIC_KEYWORDS: [&str; 31] = [
    "revenue",
    "sales",
    "amount",
    "value",
    "total",
    "sum",
    "count",
    "quantity",
    "volume",
    "price",
    "cost",
    "profit",
    "income",
    "expense",
    "budget",
    "target",
    "actual",
    "forecast",
    "clicks",
    "impressions",
    "views",
    "sessions",
    "users",
    "conversions",
    "ctr",
    "cpc",
    "cpm",
    "roas",
    "roi",
    "bounce",
    "rate",
];

/// Number of data rows sampled when classifying a column as numeric.
const NUMERIC_SAMPLE_ROWS: usize = 5;

/// Result of parsing one tabular upload.
///
/// The raw grid and the located indices are retained so the caller can
/// cheaply re-derive a series for a different detected metric without
/// re-reading the file (see [`reparse_with_metric`]).
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Canonical points, sorted ascending by date.
    pub series: Vec<DataPoint>,
    /// Header text of the column the points were read from.
    pub metric_name: String,
    /// Every numeric non-date column found in the table.
    pub detected_metrics: Vec<String>,
    pub raw_grid: Vec<Vec<String>>,
    pub header_row_index: usize,
    pub date_column_index: usize,
    pub data_start_index: usize,
}

impl ParsedTable {
    pub fn header_row(&self) -> &[String] {
        &self.raw_grid[self.header_row_index]
    }
}

/// Parses a 2-D grid of string cells into a canonical date/value series.
///
/// The grid comes from a delimited-text reader (that tokenization is a
/// collaborator, not this crate's job). Rows before the header and rows whose
/// first cell starts with `#` are skipped; the header is the first row with a
/// cell case-insensitively equal to `"date"`. Malformed data rows are
/// silently dropped — messy exports are expected — but a grid with no header,
/// no usable metric column, or zero surviving rows is an error.
///
/// `selected_metric`, when it names a detected metric, overrides the default
/// column choice.
pub fn parse_grid(grid: &[Vec<String>], selected_metric: Option<&str>) -> Result<ParsedTable> {
    let (header_row_index, date_column_index) = find_header(grid)?;
    let data_start_index = header_row_index + 1;
    let header_row = &grid[header_row_index];

    let metric_columns = detect_metric_columns(grid, header_row, date_column_index, data_start_index);
    let detected_metrics: Vec<String> = metric_columns.iter().map(|c| c.name.clone()).collect();
    debug!(
        "Header at row {}, date column {}, detected metrics: {:?}",
        header_row_index, date_column_index, detected_metrics
    );

    let (metric_column_index, metric_name, detected_metrics) = choose_metric_column(
        header_row,
        date_column_index,
        metric_columns,
        detected_metrics,
        selected_metric,
    )?;

    let mut series = extract_points(grid, data_start_index, date_column_index, metric_column_index);
    series.sort_by_key(|point| point.date);

    if series.is_empty() {
        return Err(EngineError::NoValidRows);
    }

    debug!("Parsed {} points for metric \"{}\"", series.len(), metric_name);

    Ok(ParsedTable {
        series,
        metric_name,
        detected_metrics,
        raw_grid: grid.to_vec(),
        header_row_index,
        date_column_index,
        data_start_index,
    })
}

/// Re-derives a series for a different metric from a table's retained
/// artifacts, without re-reading the file. Produces exactly what
/// [`parse_grid`] would have produced had `selected_metric` been chosen
/// originally.
pub fn reparse_with_metric(
    raw_grid: &[Vec<String>],
    header_row: &[String],
    date_column_index: usize,
    data_start_index: usize,
    selected_metric: &str,
) -> Result<(Vec<DataPoint>, String)> {
    let metric_column_index = header_row
        .iter()
        .position(|h| h.trim() == selected_metric)
        .ok_or_else(|| EngineError::MetricNotFound {
            metric: selected_metric.to_string(),
            headers: header_row.to_vec(),
        })?;

    let mut series = extract_points(
        raw_grid,
        data_start_index,
        date_column_index,
        metric_column_index,
    );
    series.sort_by_key(|point| point.date);

    if series.is_empty() {
        return Err(EngineError::NoValidRows);
    }

    Ok((series, selected_metric.to_string()))
}

fn find_header(grid: &[Vec<String>]) -> Result<(usize, usize)> {
    for (row_index, row) in grid.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        if row[0].trim().starts_with('#') {
            continue;
        }
        if let Some(col_index) = row
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case("date"))
        {
            return Ok((row_index, col_index));
        }
    }
    Err(EngineError::NoHeaderRow)
}

struct MetricColumn {
    index: usize,
    name: String,
}

fn detect_metric_columns(
    grid: &[Vec<String>],
    header_row: &[String],
    date_column_index: usize,
    data_start_index: usize,
) -> Vec<MetricColumn> {
    let mut columns = Vec::new();

    for (index, header) in header_row.iter().enumerate() {
        if index == date_column_index {
            continue;
        }

        let lowered = header.trim().to_lowercase();
        if lowered == "date" || lowered.contains("id") || lowered.contains("name") {
            continue;
        }

        let has_numeric_data = grid
            .iter()
            .skip(data_start_index)
            .take(NUMERIC_SAMPLE_ROWS)
            .filter_map(|row| row.get(index))
            .any(|cell| parse_numeric_cell(cell).is_some());

        if has_numeric_data {
            let trimmed = header.trim();
            let name = if trimmed.is_empty() {
                format!("Column {}", index + 1)
            } else {
                trimmed.to_string()
            };
            columns.push(MetricColumn { index, name });
        }
    }

    columns
}

fn choose_metric_column(
    header_row: &[String],
    date_column_index: usize,
    metric_columns: Vec<MetricColumn>,
    mut detected_metrics: Vec<String>,
    selected_metric: Option<&str>,
) -> Result<(usize, String, Vec<String>)> {
    if let Some(wanted) = selected_metric {
        if let Some(column) = metric_columns.iter().find(|c| c.name == wanted) {
            return Ok((column.index, column.name.clone(), detected_metrics));
        }
    }

    if !metric_columns.is_empty() {
        let column = metric_columns
            .iter()
            .find(|c| {
                let lowered = c.name.to_lowercase();
                METRIC_KEYWORDS.iter().any(|k| lowered.contains(k))
            })
            .unwrap_or(&metric_columns[0]);
        return Ok((column.index, column.name.clone(), detected_metrics));
    }

    // No numeric column at all: fall back to the first non-date column and
    // hope for the best row-by-row.
    for (index, header) in header_row.iter().enumerate() {
        if index != date_column_index {
            let trimmed = header.trim();
            let name = if trimmed.is_empty() {
                "Value".to_string()
            } else {
                trimmed.to_string()
            };
            detected_metrics.push(name.clone());
            return Ok((index, name, detected_metrics));
        }
    }

    Err(EngineError::NoMetricColumn {
        headers: header_row.to_vec(),
    })
}

fn extract_points(
    grid: &[Vec<String>],
    data_start_index: usize,
    date_column_index: usize,
    metric_column_index: usize,
) -> Vec<DataPoint> {
    let mut points = Vec::new();

    for row in grid.iter().skip(data_start_index) {
        let date_cell = match row.get(date_column_index) {
            Some(cell) => cell.trim(),
            None => continue,
        };
        let metric_cell = match row.get(metric_column_index) {
            Some(cell) => cell.trim(),
            None => continue,
        };

        if date_cell.is_empty() || metric_cell.is_empty() {
            continue;
        }

        let date_lower = date_cell.to_lowercase();
        let metric_lower = metric_cell.to_lowercase();

        // Summary rows and repeated header rows are expected in real exports
        if date_lower.contains("total")
            || date_lower.contains("grand")
            || metric_lower.contains("total")
            || metric_lower.contains("grand")
            || date_lower == "date"
        {
            continue;
        }

        let date = match normalize_date(date_cell) {
            Some(date) => date,
            None => continue,
        };
        let value = match parse_numeric_cell(metric_cell) {
            Some(value) if value >= 0.0 => value,
            _ => continue,
        };

        points.push(DataPoint::new(date, value));
    }

    points
}

/// Parses a cell as a float after stripping thousands separators and
/// whitespace. Returns `None` for empty, non-numeric, or non-finite cells.
fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts rows handed over by the external analytics fetch collaborator
/// into canonical points.
///
/// The value is read from the first metric header's column and coerced to a
/// number, defaulting to `0.0` on parse failure. Rows with a missing or
/// unparseable date are dropped; the engine never invents a date.
pub fn report_to_points(report: &FetchedReport) -> Vec<DataPoint> {
    let metric_header = report.metric_headers.first();

    let mut points: Vec<DataPoint> = report
        .rows
        .iter()
        .filter_map(|row| {
            let date = row
                .get("date")
                .and_then(|v| v.as_str())
                .and_then(normalize_date)?;

            let value = metric_header
                .and_then(|header| row.get(header))
                .or_else(|| row.get("value"))
                .map(coerce_to_number)
                .unwrap_or(0.0);

            Some(DataPoint::new(date, value))
        })
        .collect();

    points.sort_by_key(|point| point.date);
    points
}

/// Wraps a fetched report into a full dataset with display metadata derived
/// from the first metric header.
pub fn dataset_from_report(report: &FetchedReport, label: Option<&str>, color: &str) -> Dataset {
    let metric_name = report
        .metric_headers
        .first()
        .cloned()
        .unwrap_or_else(|| "Metric".to_string());

    let unit = if metric_name.contains("Revenue") {
        "USD"
    } else {
        "count"
    };

    Dataset {
        label: label
            .map(str::to_string)
            .unwrap_or_else(|| format!("Fetched: {}", metric_name)),
        data: report_to_points(report),
        color: color.to_string(),
        metric_name,
        unit: Some(unit.to_string()),
    }
}

fn coerce_to_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => parse_numeric_cell(s).unwrap_or(0.0),
        _ => 0.0,
    }
}
