// Recurrence module
// Series recurrence rule exchanged with the booking backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

/// Rule attached to a series update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub repeat_until: NaiveDate,
}

impl RecurrenceRule {
    /// Series edits always repeat every single period
    pub fn every(frequency: Frequency, repeat_until: NaiveDate) -> Self {
        Self {
            frequency,
            interval: 1,
            repeat_until,
        }
    }
}
