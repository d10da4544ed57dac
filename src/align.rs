use crate::dates::months_between;
use crate::schema::{AlignedDataPoint, DataPoint, Granularity};
use chrono::NaiveDate;

/// Re-expresses a series as integer offsets from an anchor date.
///
/// Expects an already-aggregated series, so weekly/monthly offsets operate on
/// bucketed points (one point per bucket). Points before the anchor are
/// dropped; the output is sorted ascending by offset. A point dated exactly
/// on the anchor gets offset 0.
pub fn align(
    data: &[DataPoint],
    anchor: NaiveDate,
    granularity: Granularity,
) -> Vec<AlignedDataPoint> {
    let mut aligned: Vec<AlignedDataPoint> = data
        .iter()
        .map(|point| {
            let day_offset = match granularity {
                Granularity::Daily => (point.date - anchor).num_days(),
                Granularity::Weekly => (point.date - anchor).num_days().div_euclid(7),
                Granularity::Monthly => months_between(anchor, point.date),
            };
            AlignedDataPoint {
                day_offset,
                value: point.value,
                original_date: point.date,
            }
        })
        .filter(|point| point.day_offset >= 0)
        .collect();

    aligned.sort_by_key(|point| point.day_offset);
    aligned
}

/// The shared offset axis `0..=max` across several aligned series. Empty when
/// every series is empty.
pub fn offset_axis(aligned: &[Vec<AlignedDataPoint>]) -> Vec<i64> {
    match aligned
        .iter()
        .flat_map(|series| series.iter().map(|p| p.day_offset))
        .max()
    {
        Some(max) => (0..=max).collect(),
        None => Vec::new(),
    }
}

/// One row of the period-comparison table: a shared offset and each series'
/// value at that offset, `None` where a series has no point there.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub offset: i64,
    pub values: Vec<Option<f64>>,
}

/// Projects several aligned series onto the shared offset axis.
pub fn comparison_table(aligned: &[Vec<AlignedDataPoint>]) -> Vec<ComparisonRow> {
    offset_axis(aligned)
        .into_iter()
        .map(|offset| ComparisonRow {
            offset,
            values: aligned
                .iter()
                .map(|series| {
                    series
                        .iter()
                        .find(|p| p.day_offset == offset)
                        .map(|p| p.value)
                })
                .collect(),
        })
        .collect()
}
