// Settings module
// Client configuration persisted as TOML

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the booking backend, without trailing slash
    pub api_base_url: String,
    /// Pre-issued bearer token forwarded on every request
    pub access_token: Option<String>,
    /// Id of the user operating this client
    pub acting_user_id: String,
    /// IANA timezone in which dates and times are displayed and entered
    pub timezone: String,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    /// `light`, `dark` or `system`
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            access_token: None,
            acting_user_id: String::new(),
            timezone: "UTC".to_string(),
            search_debounce_ms: 500,
            request_timeout_secs: 20,
            theme: "light".to_string(),
        }
    }
}

impl Settings {
    /// Full check applied before settings are saved
    pub fn validate(&self) -> Result<(), String> {
        self.validate_connection()?;

        if self.acting_user_id.trim().is_empty() {
            return Err("Acting user id is required".to_string());
        }

        Ok(())
    }

    /// Everything needed to start the client and talk to the backend.
    ///
    /// A file without an acting user still loads; editing stays blocked
    /// until one is set.
    pub fn validate_connection(&self) -> Result<(), String> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err("API base URL must start with http:// or https://".to_string());
        }

        self.timezone()?;

        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be at least 1 second".to_string());
        }

        if self.search_debounce_ms > 10_000 {
            return Err("Search debounce is too large (max 10000 ms)".to_string());
        }

        if !matches!(self.theme.as_str(), "light" | "dark" | "system") {
            return Err("Theme must be one of: light, dark, system".to_string());
        }

        Ok(())
    }

    /// Parsed display timezone
    pub fn timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| format!("Unknown timezone '{}'", self.timezone))
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
