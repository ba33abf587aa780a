use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{ApiError, BookingBackend};
use crate::models::directory::{Device, Room, UserSummary};
use crate::models::meeting::{Meeting, MeetingPayload};
use crate::models::settings::Settings;

/// [`BookingBackend`] over the backend's JSON REST API
pub struct RestBackend {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

/// Error body shape: `{"message": "...", "errors": {"field": "..."}}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

impl RestBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("Failed to build booking API HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
            access_token: settings.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Booking API returned {}: {}", status, body);
            return Err(decode_error(status, &body));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Build an [`ApiError`] from a non-success response
pub(crate) fn decode_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
        field_errors: parsed.errors,
    }
}

#[async_trait]
impl BookingBackend for RestBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.send(self.request(Method::GET, "/rooms")).await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ApiError> {
        self.send(self.request(Method::GET, "/devices")).await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, ApiError> {
        let path = format!("/users/search?q={}", urlencoding::encode(query));
        self.send(self.request(Method::GET, &path)).await
    }

    async fn list_meetings(&self) -> Result<Vec<Meeting>, ApiError> {
        self.send(self.request(Method::GET, "/meetings")).await
    }

    async fn update_meeting(
        &self,
        id: &str,
        payload: &MeetingPayload,
    ) -> Result<Meeting, ApiError> {
        let path = format!("/meetings/{}", urlencoding::encode(id));
        self.send(self.request(Method::PUT, &path).json(payload)).await
    }

    async fn update_series(
        &self,
        series_id: &str,
        payload: &MeetingPayload,
    ) -> Result<Vec<Meeting>, ApiError> {
        let path = format!("/meetings/series/{}", urlencoding::encode(series_id));
        self.send(self.request(Method::PUT, &path).json(payload)).await
    }
}
