// Date utility functions
// Single conversion path between wall-clock form fields and UTC instants.
// Draft seeding, submission and change detection all go through here.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Split a UTC instant into the date and minute-precision time shown in `tz`
pub fn split_local(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, NaiveTime) {
    let local = instant.with_timezone(&tz);
    let time = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(NaiveTime::MIN);
    (local.date_naive(), time)
}

/// Interpret date and time-of-day as wall-clock values in `tz` and convert to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist in `tz` (DST spring-forward gap) are rejected.
pub fn compose_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>, String> {
    let naive = NaiveDateTime::new(date, time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(format!(
            "{} {} does not exist in timezone {}",
            date,
            time.format("%H:%M"),
            tz.name()
        )),
    }
}

/// Drop seconds and sub-second precision; the form only edits whole minutes
pub fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Canonical form used when comparing timestamps: UTC, minute precision
pub fn canonical(instant: DateTime<Utc>) -> String {
    truncate_to_minute(instant).format("%Y-%m-%dT%H:%MZ").to_string()
}
