//! Maps backend submission errors to user-facing notices.
//!
//! The backend reports business conflicts only through its message text
//! (Vietnamese or English), so matching is case-insensitive substring search.

use crate::services::api::ApiError;

const MAINTENANCE: &[&str] = &["bảo trì", "maintenance"];
const ROOM: &[&str] = &["phòng", "room"];
const DEVICE: &[&str] = &["thiết bị", "device"];
const PARTICIPANT: &[&str] = &["người tham gia", "participant", "thành viên", "attendee"];
const SCHEDULE_CONFLICT: &[&str] = &["trùng lịch", "conflict", "bận", "busy"];
const ALREADY_BOOKED: &[&str] = &[
    "đã được đặt",
    "đã có người đặt",
    "already booked",
    "double",
    "not available",
    "trùng lịch",
    "conflict",
];

/// Why a submission was refused by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    RoomUnderMaintenance,
    DeviceUnderMaintenance,
    RoomDoubleBooked,
    ParticipantConflict,
    PermissionDenied,
    /// `field: message` entries from a structured validation error
    FieldErrors(Vec<String>),
    /// Anything unrecognized, shown with the backend's own text
    Other(String),
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl SubmitFailure {
    pub fn classify(err: &ApiError) -> Self {
        if err.status() == Some(403) {
            return Self::PermissionDenied;
        }

        if let Some(fields) = err.field_errors() {
            return Self::FieldErrors(
                fields
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect(),
            );
        }

        let message = err.message().to_lowercase();

        if contains_any(&message, MAINTENANCE) {
            if contains_any(&message, ROOM) {
                return Self::RoomUnderMaintenance;
            }
            if contains_any(&message, DEVICE) {
                return Self::DeviceUnderMaintenance;
            }
        }

        if contains_any(&message, PARTICIPANT) && contains_any(&message, SCHEDULE_CONFLICT) {
            return Self::ParticipantConflict;
        }

        if contains_any(&message, ROOM) && contains_any(&message, ALREADY_BOOKED) {
            return Self::RoomDoubleBooked;
        }

        Self::Other(err.to_string())
    }

    /// Text shown to the user
    pub fn notice(&self) -> String {
        match self {
            Self::RoomUnderMaintenance => {
                "The selected room is under maintenance. Please choose another room.".to_string()
            }
            Self::DeviceUnderMaintenance => {
                "A selected device is under maintenance. Remove it or choose another device."
                    .to_string()
            }
            Self::RoomDoubleBooked => {
                "The room is already booked for this time. Pick another time or room.".to_string()
            }
            Self::ParticipantConflict => {
                "Some participants already have another meeting at this time.".to_string()
            }
            Self::PermissionDenied => "You do not have permission to edit this meeting.".to_string(),
            Self::FieldErrors(entries) => format!("Please fix the following: {}", entries.join("; ")),
            Self::Other(message) => message.clone(),
        }
    }
}
