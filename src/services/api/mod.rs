//! Booking backend boundary.
//! The editor only talks to the backend through [`BookingBackend`]; the
//! HTTP implementation lives in [`rest`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::directory::{Device, Room, UserSummary};
use crate::models::meeting::{Meeting, MeetingPayload};

pub mod rest;

pub use rest::RestBackend;

/// Failure talking to the booking backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Transport(String),
    /// Backend answered with a non-success status
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    /// Response body did not match the expected shape
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Per-field validation messages, empty unless the backend sent some
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Status { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    /// Backend message text, used for pattern matching and verbatim display
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(message) | Self::Decode(message) => message,
            Self::Status { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Operations the meeting editor needs from the booking backend.
///
/// Timestamps crossing this boundary are UTC; update payloads are always
/// full records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError>;

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError>;

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ApiError>;

    /// Meetings visible to the acting user
    async fn list_meetings(&self) -> Result<Vec<Meeting>, ApiError>;

    async fn update_meeting(&self, id: &str, payload: &MeetingPayload)
        -> Result<Meeting, ApiError>;

    async fn update_series(
        &self,
        series_id: &str,
        payload: &MeetingPayload,
    ) -> Result<Vec<Meeting>, ApiError>;
}
