use crate::aggregate::aggregate;
use crate::align::{align, comparison_table, offset_axis, ComparisonRow};
use crate::error::{EngineError, Result};
use crate::ingest::{dataset_from_report, reparse_with_metric, ParsedTable};
use crate::overlap::is_non_overlapping;
use crate::periods::partition_by_color;
use crate::schema::{AlignedDataPoint, ColorPeriod, Dataset, FetchedReport, Granularity};
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::BTreeMap;

/// Default display colors, cycled by insertion position when the caller does
/// not supply one.
pub const COLOR_PALETTE: [&str; 18] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#84CC16", "#F97316",
    "#EC4899", "#6366F1", "#14B8A6", "#F59E0B", "#DC2626", "#7C3AED", "#0891B2", "#059669",
    "#D97706", "#BE185D",
];

/// Stable identifier for a series within a [`Workspace`]. Ids are handed out
/// from a monotonic counter and never reused, so auxiliary attributes keyed
/// by id survive insertions and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesId(u64);

/// Per-series auxiliary attributes that the comparison pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesAttributes {
    pub visible: bool,
    /// The date treated as "offset 0" when this series is aligned.
    pub alignment_date: Option<NaiveDate>,
}

impl Default for SeriesAttributes {
    fn default() -> Self {
        Self {
            visible: true,
            alignment_date: None,
        }
    }
}

/// The parse artifacts retained per uploaded series so the displayed metric
/// can be switched without re-reading the file.
#[derive(Debug, Clone)]
struct RetainedTable {
    raw_grid: Vec<Vec<String>>,
    header_row_index: usize,
    date_column_index: usize,
    data_start_index: usize,
    detected_metrics: Vec<String>,
}

/// One aligned series ready for a comparison chart or table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub id: SeriesId,
    pub label: String,
    pub color: String,
    pub data: Vec<AlignedDataPoint>,
}

/// The output of the comparison pipeline: every visible anchored series
/// aggregated, optionally partitioned by color period, aligned on its anchor,
/// and projected onto a shared offset axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub series: Vec<AlignedSeries>,
    pub offsets: Vec<i64>,
    pub table: Vec<ComparisonRow>,
}

/// An arena of series with stable ids plus the auxiliary state that drives
/// comparison: visibility flags, alignment anchors, and retained parse
/// tables. This is the one stateful object in the crate; every transform it
/// calls into is a pure function.
#[derive(Debug, Default)]
pub struct Workspace {
    next_id: u64,
    order: Vec<SeriesId>,
    series: BTreeMap<SeriesId, Dataset>,
    attributes: BTreeMap<SeriesId, SeriesAttributes>,
    tables: BTreeMap<SeriesId, RetainedTable>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dataset built elsewhere. No retained table, so the metric
    /// cannot be switched later.
    pub fn add_dataset(&mut self, dataset: Dataset) -> SeriesId {
        let id = SeriesId(self.next_id);
        self.next_id += 1;
        info!(
            "Adding series {:?} \"{}\" with {} points",
            id,
            dataset.label,
            dataset.data.len()
        );
        self.order.push(id);
        self.series.insert(id, dataset);
        self.attributes.insert(id, SeriesAttributes::default());
        id
    }

    /// Adds a series from a parsed upload, retaining the raw table for later
    /// metric switching. The color defaults to the palette entry for this
    /// insertion position.
    pub fn add_parsed(&mut self, table: ParsedTable, label: &str, color: Option<&str>) -> SeriesId {
        let color = color
            .map(str::to_string)
            .unwrap_or_else(|| self.next_palette_color());

        let dataset = Dataset {
            label: label.to_string(),
            data: table.series,
            color,
            metric_name: table.metric_name,
            unit: None,
        };

        let retained = RetainedTable {
            raw_grid: table.raw_grid,
            header_row_index: table.header_row_index,
            date_column_index: table.date_column_index,
            data_start_index: table.data_start_index,
            detected_metrics: table.detected_metrics,
        };

        let id = self.add_dataset(dataset);
        self.tables.insert(id, retained);
        id
    }

    /// Adds a series from an analytics fetch collaborator's report.
    pub fn add_report(
        &mut self,
        report: &FetchedReport,
        label: Option<&str>,
        color: Option<&str>,
    ) -> SeriesId {
        let color = color
            .map(str::to_string)
            .unwrap_or_else(|| self.next_palette_color());
        self.add_dataset(dataset_from_report(report, label, &color))
    }

    pub fn remove(&mut self, id: SeriesId) -> Result<()> {
        if self.series.remove(&id).is_none() {
            return Err(EngineError::UnknownSeries(id.0));
        }
        self.order.retain(|&other| other != id);
        self.attributes.remove(&id);
        self.tables.remove(&id);
        Ok(())
    }

    pub fn get(&self, id: SeriesId) -> Option<&Dataset> {
        self.series.get(&id)
    }

    pub fn attributes(&self, id: SeriesId) -> Option<&SeriesAttributes> {
        self.attributes.get(&id)
    }

    /// Series in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SeriesId, &Dataset)> {
        self.order.iter().filter_map(|&id| {
            self.series.get(&id).map(|dataset| (id, dataset))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn relabel(&mut self, id: SeriesId, label: &str) -> Result<()> {
        self.dataset_mut(id)?.label = label.to_string();
        Ok(())
    }

    pub fn recolor(&mut self, id: SeriesId, color: &str) -> Result<()> {
        self.dataset_mut(id)?.color = color.to_string();
        Ok(())
    }

    pub fn set_unit(&mut self, id: SeriesId, unit: Option<&str>) -> Result<()> {
        self.dataset_mut(id)?.unit = unit.map(str::to_string);
        Ok(())
    }

    pub fn set_visible(&mut self, id: SeriesId, visible: bool) -> Result<()> {
        self.attributes_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_alignment_date(&mut self, id: SeriesId, date: Option<NaiveDate>) -> Result<()> {
        self.attributes_mut(id)?.alignment_date = date;
        Ok(())
    }

    /// The metrics detected in this series' retained table, if it came from
    /// an upload.
    pub fn detected_metrics(&self, id: SeriesId) -> Option<&[String]> {
        self.tables.get(&id).map(|t| t.detected_metrics.as_slice())
    }

    /// Switches an uploaded series to a different detected metric by
    /// re-deriving from the retained table. Replaces the series' data
    /// wholesale; label, color, and unit are untouched.
    pub fn switch_metric(&mut self, id: SeriesId, metric: &str) -> Result<()> {
        let table = match self.tables.get(&id) {
            Some(table) => table,
            None => {
                // Fetched series have no retained table to re-derive from
                self.dataset_mut(id)?;
                return Err(EngineError::MetricNotFound {
                    metric: metric.to_string(),
                    headers: Vec::new(),
                });
            }
        };

        let header_row = table.raw_grid[table.header_row_index].clone();
        let (data, metric_name) = reparse_with_metric(
            &table.raw_grid,
            &header_row,
            table.date_column_index,
            table.data_start_index,
            metric,
        )?;

        debug!("Series {:?} switched to metric \"{}\"", id, metric_name);
        let dataset = self.dataset_mut(id)?;
        dataset.data = data;
        dataset.metric_name = metric_name;
        Ok(())
    }

    /// Whether the visible series' windows are too far apart for one shared
    /// absolute axis, i.e. the comparison pipeline should engage.
    pub fn needs_alignment(&self) -> bool {
        is_non_overlapping(self.visible_datasets().map(|(_, d)| d))
    }

    /// Gives every visible series without an anchor its earliest point date.
    /// Called when comparison mode engages; explicit anchors are kept.
    pub fn auto_set_alignment_dates(&mut self) {
        let defaults: Vec<(SeriesId, NaiveDate)> = self
            .visible_datasets()
            .filter_map(|(id, dataset)| {
                dataset.data.iter().map(|p| p.date).min().map(|d| (id, d))
            })
            .collect();

        for (id, earliest) in defaults {
            if let Some(attributes) = self.attributes.get_mut(&id) {
                if attributes.alignment_date.is_none() {
                    debug!("Auto alignment date for {:?}: {}", id, earliest);
                    attributes.alignment_date = Some(earliest);
                }
            }
        }
    }

    /// Runs the full comparison pipeline over the visible, anchored series:
    /// aggregate at `granularity`, partition by `color_periods` (each
    /// series' own color as default), align on each series' anchor, and
    /// project onto the shared offset axis.
    pub fn comparison_view(
        &self,
        granularity: Granularity,
        color_periods: &[ColorPeriod],
    ) -> ComparisonView {
        let mut series = Vec::new();

        for (id, dataset) in self.visible_datasets() {
            let anchor = match self.attributes.get(&id).and_then(|a| a.alignment_date) {
                Some(anchor) => anchor,
                None => continue,
            };

            let aggregated = aggregate(&dataset.data, granularity);

            if color_periods.is_empty() {
                series.push(AlignedSeries {
                    id,
                    label: dataset.label.clone(),
                    color: dataset.color.clone(),
                    data: align(&aggregated, anchor, granularity),
                });
            } else {
                for group in partition_by_color(&aggregated, color_periods, &dataset.color) {
                    let label = match &group.label {
                        Some(period_label) => format!("{} - {}", dataset.label, period_label),
                        None => dataset.label.clone(),
                    };
                    series.push(AlignedSeries {
                        id,
                        label,
                        color: group.color,
                        data: align(&group.data, anchor, granularity),
                    });
                }
            }
        }

        let aligned: Vec<Vec<AlignedDataPoint>> =
            series.iter().map(|s| s.data.clone()).collect();
        let offsets = offset_axis(&aligned);
        let table = comparison_table(&aligned);

        ComparisonView {
            series,
            offsets,
            table,
        }
    }

    fn visible_datasets(&self) -> impl Iterator<Item = (SeriesId, &Dataset)> {
        self.iter().filter(|(id, dataset)| {
            !dataset.data.is_empty()
                && self
                    .attributes
                    .get(id)
                    .map(|a| a.visible)
                    .unwrap_or(false)
        })
    }

    fn next_palette_color(&self) -> String {
        COLOR_PALETTE[self.next_id as usize % COLOR_PALETTE.len()].to_string()
    }

    fn dataset_mut(&mut self, id: SeriesId) -> Result<&mut Dataset> {
        self.series
            .get_mut(&id)
            .ok_or(EngineError::UnknownSeries(id.0))
    }

    fn attributes_mut(&mut self, id: SeriesId) -> Result<&mut SeriesAttributes> {
        self.attributes
            .get_mut(&id)
            .ok_or(EngineError::UnknownSeries(id.0))
    }
}
