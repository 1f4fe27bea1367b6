//! Calendar arithmetic for the weekly grid.
//!
//! All functions work on local wall-clock values; nothing here converts to
//! UTC. Weeks run Monday through Sunday and the visible day window is fixed
//! at 06:00-24:00 in 30-minute slots. Times outside that window have no slot
//! and are reported as `None` rather than clamped to a wrong cell.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Number of day columns in the grid.
pub const DAY_COUNT: usize = 7;
/// Number of 30-minute rows in the grid (06:00 through 23:30).
pub const SLOT_COUNT: usize = 36;
/// First visible hour of the day.
pub const FIRST_HOUR: u32 = 6;
/// Slot granularity in minutes.
pub const SLOT_MINUTES: u32 = 30;

/// Monday of the week containing `date`, the canonical week-bucket key.
/// This is the value a task's `week_date` stores.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Inclusive bounds of the week containing `date`: Monday 00:00:00.000
/// through Sunday 23:59:59.999.
pub fn week_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let monday = week_monday(date);
    let start = monday.and_time(NaiveTime::MIN);
    let end = (monday + Duration::days(6))
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap();
    (start, end)
}

/// Day column for a date: Monday=0 .. Sunday=6.
pub fn day_of_week_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// The 36 row labels of the grid, "06:00" through "23:30".
pub fn time_slots() -> Vec<String> {
    let mut slots = Vec::with_capacity(SLOT_COUNT);
    for hour in FIRST_HOUR..24 {
        slots.push(format!("{hour:02}:00"));
        slots.push(format!("{hour:02}:30"));
    }
    slots
}

/// Grid row for a wall-clock time, or `None` when the time falls outside
/// the 06:00-24:00 window. Times not on a slot boundary land in the slot
/// containing them.
pub fn slot_index(hour: u32, minute: u32) -> Option<usize> {
    let minutes = hour * 60 + minute;
    let window = (FIRST_HOUR * 60)..(24 * 60);
    if !window.contains(&minutes) {
        return None;
    }
    Some(((minutes - FIRST_HOUR * 60) / SLOT_MINUTES) as usize)
}

/// Number of grid rows a duration covers. Fractional when the duration is
/// not a multiple of 30; renderers round up as needed.
pub fn slot_span(duration_minutes: u32) -> f64 {
    duration_minutes as f64 / SLOT_MINUTES as f64
}

/// Parse a start time entered by the user: `YYYY-MM-DD HH:MM`, with a `T`
/// separator or trailing seconds also accepted.
pub fn parse_start_input(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive.and_local_timezone(Local).earliest();
        }
    }
    None
}

/// Format a week as "Jan 6-12, 2026", or "Jan 26 - Feb 1, 2026" when it
/// spans a month boundary.
pub fn format_week_range(start: NaiveDate, end: NaiveDate) -> String {
    let start_month = start.format("%b");
    let end_month = end.format("%b");
    if start.month() == end.month() {
        format!("{} {}-{}, {}", start_month, start.day(), end.day(), end.year())
    } else {
        format!(
            "{} {} - {} {}, {}",
            start_month,
            start.day(),
            end_month,
            end.day(),
            end.year()
        )
    }
}

/// Format a date as "6-jan" for day column headers.
pub fn format_day_date(date: NaiveDate) -> String {
    format!("{}-{}", date.day(), date.format("%b").to_string().to_lowercase())
}

/// Format a start time as "09:00" for task cards.
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format("%H:%M").to_string()
}

/// Whether a date is today in local time.
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_monday_snaps_to_monday() {
        // 2026-01-06 is a Tuesday; its week starts 2026-01-05.
        assert_eq!(week_monday(date(2026, 1, 6)), date(2026, 1, 5));
        assert_eq!(week_monday(date(2026, 1, 5)), date(2026, 1, 5));
        // Sunday belongs to the week that began six days earlier.
        assert_eq!(week_monday(date(2026, 1, 11)), date(2026, 1, 5));
    }

    #[test]
    fn week_bounds_cover_monday_to_sunday() {
        let (start, end) = week_bounds(date(2026, 1, 7));
        assert_eq!(start.date(), date(2026, 1, 5));
        assert_eq!(start.time(), NaiveTime::MIN);
        assert_eq!(end.date(), date(2026, 1, 11));
        assert_eq!(end.time(), NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap());
    }

    #[test]
    fn week_bounds_is_idempotent() {
        for day in 5..=11 {
            let d = date(2026, 1, day);
            let (start, _) = week_bounds(d);
            assert_eq!(week_bounds(start.date()), week_bounds(d));
        }
    }

    #[test]
    fn day_index_maps_monday_zero_through_sunday_six() {
        for (offset, expected) in (0..7).zip(0..7) {
            let d = date(2026, 1, 5 + offset);
            assert_eq!(day_of_week_index(d), expected as usize);
        }
    }

    #[test]
    fn time_slots_has_36_labels() {
        let slots = time_slots();
        assert_eq!(slots.len(), SLOT_COUNT);
        assert_eq!(slots[0], "06:00");
        assert_eq!(slots[1], "06:30");
        assert_eq!(slots[35], "23:30");
    }

    #[test]
    fn slot_index_bounds() {
        assert_eq!(slot_index(6, 0), Some(0));
        assert_eq!(slot_index(9, 0), Some(6));
        assert_eq!(slot_index(23, 30), Some(35));
        assert_eq!(slot_index(23, 59), Some(35));
        assert_eq!(slot_index(5, 59), None);
        assert_eq!(slot_index(0, 0), None);
        assert_eq!(slot_index(24, 0), None);
    }

    #[test]
    fn slot_span_allows_fractions() {
        assert_eq!(slot_span(30), 1.0);
        assert_eq!(slot_span(60), 2.0);
        assert_eq!(slot_span(45), 1.5);
    }

    #[test]
    fn parse_start_input_accepts_common_forms() {
        let parsed = parse_start_input("2026-01-06 09:00").unwrap();
        assert_eq!(parsed.naive_local().date(), date(2026, 1, 6));
        assert_eq!(format_time(&parsed), "09:00");
        assert!(parse_start_input("2026-01-06T09:30").is_some());
        assert!(parse_start_input("not a time").is_none());
        assert!(parse_start_input("2026-13-40 09:00").is_none());
    }

    #[test]
    fn week_range_formatting() {
        assert_eq!(format_week_range(date(2026, 1, 5), date(2026, 1, 11)), "Jan 5-11, 2026");
        assert_eq!(
            format_week_range(date(2026, 1, 26), date(2026, 2, 1)),
            "Jan 26 - Feb 1, 2026"
        );
    }

    #[test]
    fn day_header_formatting() {
        assert_eq!(format_day_date(date(2026, 2, 2)), "2-feb");
    }
}
