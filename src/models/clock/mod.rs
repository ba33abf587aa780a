// Clock module
// 12-hour dial value and the angle mapping used by the analog time picker

use chrono::{NaiveTime, Timelike};

/// Half of the day shown on a 12-hour dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Am,
    Pm,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }

    pub fn from_hour24(hour: u32) -> Self {
        if hour >= 12 {
            Self::Pm
        } else {
            Self::Am
        }
    }
}

/// Which hand of the dial a drag session is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockHand {
    Hour,
    Minute,
}

/// Time of day as displayed on the dial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockValue {
    /// 1..=12
    pub hour_display: u32,
    /// 0..=59
    pub minute: u32,
    pub period: Period,
}

impl ClockValue {
    /// Build a dial value from a 24-hour clock reading.
    ///
    /// Hours and minutes outside their ranges are wrapped, so the
    /// result always satisfies the dial invariants.
    pub fn from_hour24(hour: u32, minute: u32) -> Self {
        let hour = hour % 24;
        let display = match hour % 12 {
            0 => 12,
            h => h,
        };
        Self {
            hour_display: display,
            minute: minute % 60,
            period: Period::from_hour24(hour),
        }
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Self::from_hour24(time.hour(), time.minute())
    }

    /// Parse a zero-padded `"HH:MM"` 24-hour string
    pub fn parse(value: &str) -> Option<Self> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .ok()
            .map(Self::from_time)
    }

    /// 24-hour reading of the dial
    pub fn real_hour(&self) -> u32 {
        to_hour24(self.hour_display, self.period)
    }

    pub fn to_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.real_hour(), self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Zero-padded `"HH:MM"` form handed to change listeners
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.real_hour(), self.minute)
    }
}

impl Default for ClockValue {
    fn default() -> Self {
        Self::from_hour24(9, 0)
    }
}

/// Convert a dial hour (1-12) and period into a 24-hour hour
pub fn to_hour24(hour_display: u32, period: Period) -> u32 {
    let base = hour_display % 12;
    match period {
        Period::Am => base,
        Period::Pm => base + 12,
    }
}

/// Angle of the pointer in degrees, clockwise from 12 o'clock, in `[0, 360)`.
///
/// `dx`/`dy` are screen offsets from the dial centre with `y` growing downwards.
pub fn pointer_angle(dx: f32, dy: f32) -> f32 {
    let degrees = dx.atan2(-dy).to_degrees();
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Minute under the pointer: 6 degrees per minute, rounded
pub fn minute_from_angle(angle: f32) -> u32 {
    ((angle / 6.0).round() as u32) % 60
}

/// Dial hour under the pointer: 30 degrees per hour, 0 maps to 12
pub fn hour_from_angle(angle: f32) -> u32 {
    match (angle / 30.0).floor() as u32 {
        0 => 12,
        h => h.min(12),
    }
}

/// Angle at which a hand points for the given dial value
pub fn hand_angle(value: &ClockValue, hand: ClockHand) -> f32 {
    match hand {
        ClockHand::Minute => value.minute as f32 * 6.0,
        ClockHand::Hour => (value.hour_display % 12) as f32 * 30.0 + value.minute as f32 * 0.5,
    }
}
