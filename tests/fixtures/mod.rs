// Test fixtures - reusable test data
// Sample meetings and an in-memory booking backend

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Mutex;

use room_desk::models::directory::{Device, Room, UserSummary};
use room_desk::models::meeting::{Meeting, MeetingPayload};
use room_desk::models::recurrence::{Frequency, RecurrenceRule};
use room_desk::services::api::{ApiError, BookingBackend};

pub const ACTING_USER: &str = "U1";

pub fn user(id: &str, name: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        full_name: name.to_string(),
        username: name.to_lowercase().replace(' ', "."),
    }
}

pub fn room(id: &str, name: &str) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        location: Some("Floor 3".to_string()),
    }
}

/// Single meeting on 2025-06-02 09:00-10:00 UTC in room R1
pub fn single_meeting() -> Meeting {
    Meeting {
        id: "M1".to_string(),
        title: "Design review".to_string(),
        start_time: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        room: Some(room("R1", "Everest")),
        devices: vec![Device {
            id: "D1".to_string(),
            name: "Projector".to_string(),
        }],
        participants: vec![user("U1", "An Nguyen"), user("U2", "Binh Tran")],
        guest_emails: vec!["partner@example.com".to_string()],
        description: Some("Walk through the new lobby screens".to_string()),
        recurrence_series_id: None,
        recurrence_rule: None,
    }
}

/// Daily series S1 running until 2025-07-01
pub fn daily_series_meeting() -> Meeting {
    Meeting {
        id: "M7".to_string(),
        recurrence_series_id: Some("S1".to_string()),
        recurrence_rule: Some(RecurrenceRule::every(
            Frequency::Daily,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        )),
        ..single_meeting()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UpdateMeeting(String, MeetingPayload),
    UpdateSeries(String, MeetingPayload),
    SearchUsers(String),
}

/// In-memory backend that records every write
pub struct FakeBackend {
    pub rooms: Vec<Room>,
    pub devices: Vec<Device>,
    pub users: Vec<UserSummary>,
    pub meetings: Vec<Meeting>,
    /// Returned by the next update instead of succeeding
    pub update_error: Mutex<Option<ApiError>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            rooms: vec![room("R1", "Everest"), room("R2", "Fansipan")],
            devices: vec![
                Device {
                    id: "D1".to_string(),
                    name: "Projector".to_string(),
                },
                Device {
                    id: "D2".to_string(),
                    name: "Conference phone".to_string(),
                },
            ],
            users: vec![
                user("U1", "An Nguyen"),
                user("U2", "Binh Tran"),
                user("U3", "Chi Le"),
            ],
            meetings: vec![single_meeting(), daily_series_meeting()],
            update_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next_update(&self, err: ApiError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn apply(&self, id: &str, payload: &MeetingPayload) -> Meeting {
        let mut meeting = self
            .meetings
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .unwrap_or_else(single_meeting);
        meeting.title = payload.title.clone();
        meeting.start_time = payload.start_time;
        meeting.end_time = payload.end_time;
        meeting.room = self.rooms.iter().find(|r| r.id == payload.room_id).cloned();
        meeting.guest_emails = payload.guest_emails.clone();
        meeting
    }
}

#[async_trait]
impl BookingBackend for FakeBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        Ok(self.rooms.clone())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError> {
        Ok(self.devices.clone())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ApiError> {
        self.record(Call::SearchUsers(query.to_string()));
        let query = query.to_lowercase();
        Ok(self
            .users
            .iter()
            .filter(|u| u.full_name.to_lowercase().contains(&query) || u.username.contains(&query))
            .cloned()
            .collect())
    }

    async fn list_meetings(&self) -> Result<Vec<Meeting>, ApiError> {
        Ok(self.meetings.clone())
    }

    async fn update_meeting(&self, id: &str, payload: &MeetingPayload) -> Result<Meeting, ApiError> {
        self.record(Call::UpdateMeeting(id.to_string(), payload.clone()));
        if let Some(err) = self.update_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.apply(id, payload))
    }

    async fn update_series(
        &self,
        series_id: &str,
        payload: &MeetingPayload,
    ) -> Result<Vec<Meeting>, ApiError> {
        self.record(Call::UpdateSeries(series_id.to_string(), payload.clone()));
        if let Some(err) = self.update_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self
            .meetings
            .iter()
            .filter(|m| m.recurrence_series_id.as_deref() == Some(series_id))
            .map(|m| self.apply(&m.id, payload))
            .collect())
    }
}
