use chrono::{NaiveDate, NaiveTime, TimeDelta, Timelike};

use crate::models::clock::Period;
use crate::ui_egui::clock_picker::ClockPicker;

/// UI-only state of the edit dialog. The draft itself lives in the editor.
pub struct MeetingDialogState {
    pub picker: ClockPicker,
    pub search_query: String,
    pub guest_input: String,
}

impl MeetingDialogState {
    pub fn new(start: NaiveTime) -> Self {
        Self {
            picker: ClockPicker::from_time(start),
            search_query: String::new(),
            guest_input: String::new(),
        }
    }

    /// Re-evaluate which clock positions are in the past for `date`
    pub fn refresh_disabled_times(&mut self, date: NaiveDate, today: NaiveDate, now: NaiveTime) {
        self.picker.set_disabled_time(past_time_rule(date, today, now));
    }
}

/// Disablement rule for a meeting on `date`: every time on a past day, and
/// times before the current minute today.
pub fn past_time_rule(
    date: NaiveDate,
    today: NaiveDate,
    now: NaiveTime,
) -> impl Fn(u32, u32, Period) -> bool + Send + Sync + 'static {
    let current_minute = now.hour() * 60 + now.minute();
    move |hour24, minute, _| {
        if date < today {
            return true;
        }
        date == today && hour24 * 60 + minute < current_minute
    }
}

/// "ends HH:MM" hint next to the duration, with a day count when the
/// meeting runs past midnight. None when the duration cannot be added.
pub(crate) fn end_label(start: NaiveTime, duration_minutes: i64) -> Option<String> {
    if duration_minutes < 1 {
        return None;
    }
    let (end, overflow) = start.overflowing_add_signed(TimeDelta::try_minutes(duration_minutes)?);
    let days = overflow / 86_400;
    Some(match days {
        0 => format!("ends {}", end.format("%H:%M")),
        1 => format!("ends {} next day", end.format("%H:%M")),
        n => format!("ends {} (+{} days)", end.format("%H:%M"), n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 30).unwrap()
    }

    #[test]
    fn future_day_has_nothing_disabled() {
        let rule = past_time_rule(day(3), day(2), at(14, 0));
        assert!(!rule(0, 0, Period::Am));
    }

    #[test]
    fn today_blocks_times_before_current_minute() {
        let rule = past_time_rule(day(2), day(2), at(14, 20));
        assert!(rule(14, 19, Period::Pm));
        assert!(!rule(14, 20, Period::Pm));
        assert!(!rule(15, 0, Period::Pm));
        assert!(rule(9, 0, Period::Am));
    }

    #[test]
    fn past_day_blocks_everything() {
        let rule = past_time_rule(day(1), day(2), at(0, 0));
        assert!(rule(23, 59, Period::Pm));
    }

    #[test]
    fn afternoon_today_leaves_morning_unavailable() {
        let mut state = MeetingDialogState::new(at(15, 0));
        state.refresh_disabled_times(day(2), day(2), at(13, 0));
        assert!(!state.picker.is_period_available(Period::Am));
        assert!(state.picker.is_period_available(Period::Pm));
    }

    #[test]
    fn end_label_counts_days_past_midnight() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(end_label(nine, 90).as_deref(), Some("ends 10:30"));
        assert_eq!(end_label(nine, 24 * 60).as_deref(), Some("ends 09:00 next day"));
        assert_eq!(end_label(nine, 3 * 24 * 60 + 30).as_deref(), Some("ends 09:30 (+3 days)"));
    }

    #[test]
    fn end_label_skips_unusable_durations() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(end_label(nine, 0), None);
        assert_eq!(end_label(nine, i64::MAX / 1000), None);
    }
}
