use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Previous calendar week as a closed interval: Monday 00:00:00.000 up to
/// and including Sunday 23:59:59.999, both UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Compute the previous week's window relative to `reference`.
///
/// Weekday indexing is Sunday-first: the Monday is found by walking back
/// `weekday + 6` days. When the reference is itself a Sunday that lands on
/// the Monday of the week still in progress, so a full extra week is
/// subtracted.
pub fn previous_week(reference: DateTime<Utc>) -> WeekWindow {
    let weekday = reference.weekday().num_days_from_sunday() as i64;
    let mut days_back = weekday + 6;
    if weekday == 0 {
        days_back += 7;
    }

    let monday = (reference - Duration::days(days_back)).date_naive();
    let start = Utc.from_utc_datetime(&monday.and_time(chrono::NaiveTime::MIN));
    let end = start + Duration::days(7) - Duration::milliseconds(1);

    WeekWindow { start, end }
}
