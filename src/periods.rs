use crate::schema::{ColorPeriod, DataPoint};

/// One partition bucket: every point that resolved to the same color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGroup {
    pub color: String,
    /// Label of the period that produced this bucket; `None` for the default
    /// bucket. When several periods share a color, the last declared label
    /// wins.
    pub label: Option<String>,
    pub data: Vec<DataPoint>,
}

/// Resolves the color for a single point. Periods may overlap; the first
/// period in declaration order whose inclusive range contains the point wins.
/// Points matching no period fall back to `default_color`.
pub fn point_color<'a>(
    point: &DataPoint,
    periods: &'a [ColorPeriod],
    default_color: &'a str,
) -> &'a str {
    for period in periods {
        if period.start_date <= point.date && point.date <= period.end_date {
            return &period.color;
        }
    }
    default_color
}

/// Splits a series into disjoint sub-series by color.
///
/// Color is the grouping key, not period identity: two periods sharing a
/// color merge into one bucket. Buckets are initialized in insertion order
/// (default first, then periods in declaration order) and only non-empty
/// buckets are returned; within each bucket points keep their source order.
pub fn partition_by_color(
    data: &[DataPoint],
    periods: &[ColorPeriod],
    default_color: &str,
) -> Vec<ColorGroup> {
    let mut groups: Vec<ColorGroup> = Vec::with_capacity(periods.len() + 1);
    groups.push(ColorGroup {
        color: default_color.to_string(),
        label: None,
        data: Vec::new(),
    });

    for period in periods {
        match groups.iter_mut().find(|g| g.color == period.color) {
            Some(group) => group.label = Some(period.label.clone()),
            None => groups.push(ColorGroup {
                color: period.color.clone(),
                label: Some(period.label.clone()),
                data: Vec::new(),
            }),
        }
    }

    for point in data {
        let color = point_color(point, periods, default_color);
        if let Some(group) = groups.iter_mut().find(|g| g.color == color) {
            group.data.push(point.clone());
        }
    }

    groups.retain(|g| !g.data.is_empty());
    groups
}
