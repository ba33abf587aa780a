// Directory module
// Catalog records served by the room, device and user directories

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl Room {
    /// Label shown in room pickers
    pub fn label(&self) -> String {
        match self.location.as_deref() {
            Some(location) if !location.trim().is_empty() => {
                format!("{} ({})", self.name, location)
            }
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub username: String,
}

impl UserSummary {
    pub fn label(&self) -> String {
        format!("{} (@{})", self.full_name, self.username)
    }
}
