use chrono::{Months, NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::meeting::{Meeting, MeetingPayload};
use crate::models::recurrence::{Frequency, RecurrenceRule};
use crate::utils::date::{compose_utc, split_local};

static GUEST_EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid guest email regex"));

pub const MAX_TITLE_LEN: usize = 200;
/// One week; longer bookings are rejected before any time arithmetic
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// Problems caught before anything is sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Meeting title is required")]
    MissingTitle,
    #[error("Meeting title is too long (max 200 characters)")]
    TitleTooLong,
    #[error("Please select a room")]
    MissingRoom,
    #[error("Duration must be between 1 minute and 7 days")]
    InvalidDuration,
    #[error("No acting user is configured")]
    MissingActingUser,
    #[error("Invalid guest emails: {}", .0.join(", "))]
    InvalidGuestEmails(Vec<String>),
    #[error("Choose a frequency and end date for the series")]
    MissingRecurrence,
    #[error("Series end date cannot be before the meeting date")]
    RepeatUntilBeforeStart,
    #[error("{0}")]
    InvalidStartTime(String),
}

/// Frequency and end date chosen for a whole-series edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceDraft {
    pub frequency: Frequency,
    pub repeat_until: NaiveDate,
}

/// Editable copy of a meeting.
///
/// The acting user is always a participant; [`MeetingDraft::remove_participant`]
/// refuses to drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub room_id: Option<String>,
    pub device_ids: BTreeSet<String>,
    pub guest_emails: BTreeSet<String>,
    /// Apply the edit to the whole recurring series
    pub edit_series: bool,
    pub recurrence: Option<RecurrenceDraft>,
    participant_ids: BTreeSet<String>,
    acting_user_id: String,
}

impl MeetingDraft {
    /// Seed a draft from a loaded meeting, splitting its times in `tz`
    pub fn from_meeting(meeting: &Meeting, acting_user_id: &str, tz: Tz) -> Self {
        let (date, time) = split_local(meeting.start_time, tz);

        let mut participant_ids = meeting.participant_ids();
        participant_ids.insert(acting_user_id.to_string());

        let recurrence = meeting.recurrence_series_id.as_ref().map(|_| {
            let default_until = date.checked_add_months(Months::new(1)).unwrap_or(date);
            match &meeting.recurrence_rule {
                Some(rule) => RecurrenceDraft {
                    frequency: rule.frequency,
                    repeat_until: rule.repeat_until,
                },
                None => RecurrenceDraft {
                    frequency: Frequency::Daily,
                    repeat_until: default_until,
                },
            }
        });

        Self {
            title: meeting.title.clone(),
            description: meeting.description.clone().unwrap_or_default(),
            date,
            time,
            duration_minutes: meeting.duration_minutes(),
            room_id: meeting.room_id().map(str::to_string),
            device_ids: meeting.device_ids(),
            guest_emails: meeting.guest_emails.iter().cloned().collect(),
            edit_series: meeting.is_recurring(),
            recurrence,
            participant_ids,
            acting_user_id: acting_user_id.to_string(),
        }
    }

    pub fn participant_ids(&self) -> &BTreeSet<String> {
        &self.participant_ids
    }

    pub fn acting_user_id(&self) -> &str {
        &self.acting_user_id
    }

    pub fn add_participant(&mut self, user_id: impl Into<String>) {
        self.participant_ids.insert(user_id.into());
    }

    /// Remove a participant; returns false for the acting user or unknown ids
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        if user_id == self.acting_user_id {
            return false;
        }
        self.participant_ids.remove(user_id)
    }

    pub fn toggle_device(&mut self, device_id: &str) {
        if !self.device_ids.remove(device_id) {
            self.device_ids.insert(device_id.to_string());
        }
    }

    /// Add a guest email; blank input is ignored
    pub fn add_guest(&mut self, email: &str) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }
        self.guest_emails.insert(email.to_string())
    }

    pub fn remove_guest(&mut self, email: &str) -> bool {
        self.guest_emails.remove(email)
    }

    /// Guest emails that do not look like `local@domain.tld`
    pub fn invalid_guest_emails(&self) -> Vec<String> {
        self.guest_emails
            .iter()
            .filter(|email| !is_valid_guest_email(email))
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.acting_user_id.trim().is_empty() {
            return Err(ValidationError::MissingActingUser);
        }

        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong);
        }

        if self.room_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(ValidationError::MissingRoom);
        }

        if !(1..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(ValidationError::InvalidDuration);
        }

        let invalid = self.invalid_guest_emails();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidGuestEmails(invalid));
        }

        if self.edit_series {
            if let Some(recurrence) = &self.recurrence {
                if recurrence.repeat_until < self.date {
                    return Err(ValidationError::RepeatUntilBeforeStart);
                }
            }
        }

        Ok(())
    }

    /// Build the full replacement payload.
    ///
    /// `attach_rule` adds the series recurrence rule; the caller decides it
    /// from the series toggle and the presence of a series id.
    pub fn build_payload(&self, tz: Tz, attach_rule: bool) -> Result<MeetingPayload, ValidationError> {
        self.validate()?;

        let start_time =
            compose_utc(self.date, self.time, tz).map_err(ValidationError::InvalidStartTime)?;
        let end_time = TimeDelta::try_minutes(self.duration_minutes)
            .and_then(|duration| start_time.checked_add_signed(duration))
            .ok_or(ValidationError::InvalidDuration)?;

        let recurrence_rule = if attach_rule {
            let recurrence = self.recurrence.ok_or(ValidationError::MissingRecurrence)?;
            Some(RecurrenceRule::every(recurrence.frequency, recurrence.repeat_until))
        } else {
            None
        };

        let mut participant_ids = self.participant_ids.clone();
        participant_ids.insert(self.acting_user_id.clone());

        Ok(MeetingPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            start_time,
            end_time,
            room_id: self.room_id.clone().unwrap_or_default(),
            participant_ids: participant_ids.into_iter().collect(),
            device_ids: self.device_ids.iter().cloned().collect(),
            guest_emails: self.guest_emails.iter().cloned().collect(),
            recurrence_rule,
        })
    }
}

pub fn is_valid_guest_email(email: &str) -> bool {
    GUEST_EMAIL_RE.is_match(email)
}
