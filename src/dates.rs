use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

/// Date formats accepted by [`normalize_date`] after the compact `YYYYMMDD`
/// rule, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
];

/// Converts a raw date cell into a canonical calendar date.
///
/// Rules, in order: an 8-digit string is read as compact `YYYYMMDD` (the
/// format analytics exports use); otherwise the common calendar-date and
/// ISO datetime encodings are tried, any time-of-day component discarded.
/// Returns `None` on failure — callers treat that as "drop this row".
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok();
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    None
}

/// The Monday on or before the given date; the weekly bucket key.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_past_monday = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(days_past_monday))
        .unwrap_or(date)
}

/// The first day of the given date's calendar month; the monthly bucket key.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Whole-month difference between two dates, ignoring day-of-month.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let year_diff = (end.year() - start.year()) as i64;
    let month_diff = end.month() as i64 - start.month() as i64;
    year_diff * 12 + month_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_compact_format() {
        assert_eq!(normalize_date("20240115"), Some(date(2024, 1, 15)));
        // Not a real calendar date
        assert_eq!(normalize_date("20241340"), None);
    }

    #[test]
    fn test_normalize_common_formats() {
        assert_eq!(normalize_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(normalize_date("01/15/2024"), Some(date(2024, 1, 15)));
        assert_eq!(normalize_date("2024/01/15"), Some(date(2024, 1, 15)));
        assert_eq!(normalize_date("  2024-01-15  "), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_normalize_discards_time_of_day() {
        assert_eq!(
            normalize_date("2024-01-15T13:45:00"),
            Some(date(2024, 1, 15))
        );
        assert_eq!(
            normalize_date("2024-01-15 13:45:00"),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("Grand Total"), None);
        assert_eq!(normalize_date("15th of January"), None);
    }

    #[test]
    fn test_week_start_is_monday_on_or_before() {
        // 2024-01-01 is a Monday
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 8)), date(2024, 1, 8));
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(month_start(date(2024, 2, 1)), date(2024, 2, 1));
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2023, 1, 31), date(2023, 3, 1)), 2);
        assert_eq!(months_between(date(2023, 12, 15), date(2024, 1, 15)), 1);
        assert_eq!(months_between(date(2024, 3, 1), date(2023, 12, 31)), -3);
        assert_eq!(months_between(date(2024, 5, 1), date(2024, 5, 31)), 0);
    }
}
