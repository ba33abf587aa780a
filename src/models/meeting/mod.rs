// Meeting module
// Booking records owned by the backend and the full-replacement update payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::directory::{Device, Room, UserSummary};
use crate::models::recurrence::RecurrenceRule;
use crate::utils::date::truncate_to_minute;

/// Meeting as stored by the booking backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub room: Option<Room>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub participants: Vec<UserSummary>,
    #[serde(default)]
    pub guest_emails: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence_series_id: Option<String>,
    #[serde(default)]
    pub recurrence_rule: Option<RecurrenceRule>,
}

impl Meeting {
    /// Check if this occurrence belongs to a recurring series
    pub fn is_recurring(&self) -> bool {
        self.recurrence_series_id.is_some()
    }

    /// Length in whole minutes between the minute-truncated start and end,
    /// matching how the edit form shows and re-composes both times
    pub fn duration_minutes(&self) -> i64 {
        (truncate_to_minute(self.end_time) - truncate_to_minute(self.start_time)).num_minutes()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|room| room.id.as_str())
    }

    pub fn participant_ids(&self) -> BTreeSet<String> {
        self.participants.iter().map(|user| user.id.clone()).collect()
    }

    pub fn device_ids(&self) -> BTreeSet<String> {
        self.devices.iter().map(|device| device.id.clone()).collect()
    }
}

/// Full replacement record sent on every update.
///
/// The backend has no partial-update contract, so unchanged fields are
/// always resent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPayload {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub room_id: String,
    pub participant_ids: Vec<String>,
    pub device_ids: Vec<String>,
    pub guest_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,
}
