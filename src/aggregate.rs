use crate::dates::{month_start, week_start};
use crate::schema::{DataPoint, Granularity};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Re-buckets a canonical series into the requested granularity.
///
/// Daily is the identity: the input is returned unchanged, with no
/// `average`/`count` added. Weekly buckets key on the Monday on or before
/// each point's date, monthly buckets on the first of the calendar month.
/// Each bucket carries the sum of its points as `value`, plus `average` and
/// `count`. Output is sorted ascending by bucket date and the total value is
/// preserved exactly.
pub fn aggregate(data: &[DataPoint], granularity: Granularity) -> Vec<DataPoint> {
    if granularity == Granularity::Daily {
        return data.to_vec();
    }

    let mut buckets: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();

    for point in data {
        let key = match granularity {
            Granularity::Weekly => week_start(point.date),
            Granularity::Monthly => month_start(point.date),
            Granularity::Daily => unreachable!(),
        };

        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(date, (total, count))| DataPoint {
            date,
            value: total,
            average: Some(total / count as f64),
            count: Some(count),
        })
        .collect()
}
