use crate::filter::data_date_range;
use crate::schema::{Dataset, DateRange};

/// Two series whose date ranges share less than this fraction of the shorter
/// span are treated as disjoint periods.
pub const OVERLAP_THRESHOLD: f64 = 0.2;

/// Whether a pair of date ranges counts as overlapping for comparison
/// purposes.
///
/// Disjoint ranges never overlap. For intersecting ranges the shared days are
/// measured against the shorter span; below [`OVERLAP_THRESHOLD`] the pair is
/// still considered disjoint. A zero-span (single-point) range skips the
/// ratio: it overlaps a peer iff its date lies inside the peer's range, which
/// the intersection test has already established.
pub fn ranges_overlap(a: &DateRange, b: &DateRange) -> bool {
    if a.start_date > b.end_date || b.start_date > a.end_date {
        return false;
    }

    let min_span = a.span_days().min(b.span_days());
    if min_span == 0 {
        return true;
    }

    let overlap_start = a.start_date.max(b.start_date);
    let overlap_end = a.end_date.min(b.end_date);
    let overlap_days = (overlap_end - overlap_start).num_days().max(0);

    overlap_days as f64 / min_span as f64 >= OVERLAP_THRESHOLD
}

/// Decides whether a set of series should be compared on a relative timeline
/// instead of one shared absolute axis.
///
/// Requires at least two non-empty series; with fewer there is nothing to
/// compare and the answer is `false`. Returns `true` as soon as any pair of
/// series fails [`ranges_overlap`]; the result does not depend on input
/// order.
pub fn is_non_overlapping<'a>(datasets: impl IntoIterator<Item = &'a Dataset>) -> bool {
    let ranges: Vec<DateRange> = datasets
        .into_iter()
        .filter_map(|d| data_date_range(&d.data))
        .collect();

    if ranges.len() < 2 {
        return false;
    }

    for i in 0..ranges.len() {
        for j in (i + 1)..ranges.len() {
            if !ranges_overlap(&ranges[i], &ranges[j]) {
                return true;
            }
        }
    }

    false
}
