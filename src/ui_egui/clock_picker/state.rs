use chrono::NaiveTime;

use crate::models::clock::{
    hour_from_angle, minute_from_angle, pointer_angle, to_hour24, ClockHand, ClockValue, Period,
};

/// Caller rule deciding whether `(hour24, minute, period)` may be selected
pub type DisabledTime = Box<dyn Fn(u32, u32, Period) -> bool + Send + Sync>;

/// Receives the zero-padded `"HH:MM"` value after every change
pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// State behind the analog clock picker.
///
/// Input arrives as drag sessions on a hand, numeral taps and AM/PM toggles.
/// Minute changes always apply; hour and period changes are filtered by the
/// disablement predicate and silently ignored when disabled.
pub struct ClockPicker {
    value: ClockValue,
    drag: Option<ClockHand>,
    disabled_time: DisabledTime,
    on_change: Option<ChangeListener>,
}

impl ClockPicker {
    /// Create a picker from an optional `"HH:MM"` value, defaulting to 09:00
    pub fn new(initial: Option<&str>) -> Self {
        let value = match initial {
            Some(raw) => ClockValue::parse(raw).unwrap_or_else(|| {
                log::warn!("Ignoring invalid initial time '{}', using 09:00", raw);
                ClockValue::default()
            }),
            None => ClockValue::default(),
        };

        Self {
            value,
            drag: None,
            disabled_time: Box::new(|_, _, _| false),
            on_change: None,
        }
    }

    pub fn from_time(time: NaiveTime) -> Self {
        let mut picker = Self::new(None);
        picker.value = ClockValue::from_time(time);
        picker
    }

    pub fn with_disabled_time<F>(mut self, disabled_time: F) -> Self
    where
        F: Fn(u32, u32, Period) -> bool + Send + Sync + 'static,
    {
        self.set_disabled_time(disabled_time);
        self
    }

    /// Replace the predicate, e.g. when the selected date changes
    pub fn set_disabled_time<F>(&mut self, disabled_time: F)
    where
        F: Fn(u32, u32, Period) -> bool + Send + Sync + 'static,
    {
        self.disabled_time = Box::new(disabled_time);
    }

    /// Attach the change listener. It is called once right away with the
    /// seeded value.
    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_change = Some(Box::new(listener));
        self.emit();
        self
    }

    pub fn value(&self) -> ClockValue {
        self.value
    }

    pub fn time(&self) -> NaiveTime {
        self.value.to_time()
    }

    pub fn formatted(&self) -> String {
        self.value.formatted()
    }

    /// Sync from an outside value without notifying the listener
    pub fn set_time(&mut self, time: NaiveTime) {
        self.value = ClockValue::from_time(time);
    }

    pub fn drag_hand(&self) -> Option<ClockHand> {
        self.drag
    }

    pub fn begin_drag(&mut self, hand: ClockHand) {
        self.drag = Some(hand);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Pointer moved to `(dx, dy)` from the dial centre during a drag.
    /// Returns whether the value changed.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) -> bool {
        let Some(hand) = self.drag else {
            return false;
        };
        if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return false;
        }

        let angle = pointer_angle(dx, dy);
        match hand {
            ClockHand::Minute => self.set_minute(minute_from_angle(angle)),
            ClockHand::Hour => self.try_set_hour(hour_from_angle(angle)),
        }
    }

    /// Numeral 1-12 tapped on the dial face
    pub fn tap_hour(&mut self, hour_display: u32) -> bool {
        if !(1..=12).contains(&hour_display) {
            return false;
        }
        self.try_set_hour(hour_display)
    }

    /// Switch AM/PM unless every hour of that period is disabled
    pub fn set_period(&mut self, period: Period) -> bool {
        if period == self.value.period || !self.is_period_available(period) {
            return false;
        }
        self.value.period = period;
        self.emit();
        true
    }

    pub fn is_period_available(&self, period: Period) -> bool {
        (1..=12).any(|hour| !(self.disabled_time)(to_hour24(hour, period), self.value.minute, period))
    }

    /// Whether a numeral is blocked in the current period and minute
    pub fn is_hour_disabled(&self, hour_display: u32) -> bool {
        let period = self.value.period;
        (self.disabled_time)(to_hour24(hour_display, period), self.value.minute, period)
    }

    fn set_minute(&mut self, minute: u32) -> bool {
        if minute == self.value.minute {
            return false;
        }
        self.value.minute = minute;
        self.emit();
        true
    }

    fn try_set_hour(&mut self, hour_display: u32) -> bool {
        if hour_display == self.value.hour_display {
            return false;
        }
        if self.is_hour_disabled(hour_display) {
            log::debug!("Hour {} {} is disabled", hour_display, self.value.period.as_str());
            return false;
        }
        self.value.hour_display = hour_display;
        self.emit();
        true
    }

    fn emit(&mut self) {
        let formatted = self.value.formatted();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&formatted);
        }
    }
}
