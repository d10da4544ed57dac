use crate::schema::{DataPoint, DateRange};

/// Clips a series to an inclusive date window. Points dated exactly on either
/// boundary are kept.
pub fn filter_by_date_range(data: &[DataPoint], range: &DateRange) -> Vec<DataPoint> {
    data.iter()
        .filter(|point| range.contains(point.date))
        .cloned()
        .collect()
}

/// The `[min, max]` date range covered by a series, or `None` if it is empty.
pub fn data_date_range(data: &[DataPoint]) -> Option<DateRange> {
    let min = data.iter().map(|p| p.date).min()?;
    let max = data.iter().map(|p| p.date).max()?;
    Some(DateRange::new(min, max))
}

/// The combined date range across several series, ignoring empty ones.
pub fn available_date_range(datasets: &[&[DataPoint]]) -> Option<DateRange> {
    let ranges: Vec<DateRange> = datasets.iter().filter_map(|d| data_date_range(d)).collect();
    let min = ranges.iter().map(|r| r.start_date).min()?;
    let max = ranges.iter().map(|r| r.end_date).max()?;
    Some(DateRange::new(min, max))
}
