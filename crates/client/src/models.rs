//! Entities returned by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept `7` or `"7"` for identifier-like fields.
fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected id, got {}", other))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Student,
    Mentor,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User | Role::Student => "Student",
            Role::Mentor => "Mentor",
            Role::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified_at: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Active user totals from `/active-user`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCount {
    #[serde(default)]
    pub mentor: u64,
    #[serde(default)]
    pub student: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Scheduled,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A scheduled mentoring meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSession {
    pub id: u64,
    pub session_date: String,
    pub session_time: String,
    /// Minutes
    #[serde(default)]
    pub duration: u32,
    #[serde(deserialize_with = "id_string", default)]
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<User>,
    #[serde(deserialize_with = "id_string", default)]
    pub mentor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<User>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub note: Option<String>,
    pub status: SessionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Video,
    Document,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticAsset {
    pub id: u64,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub asset_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimony {
    pub id: u64,
    pub testimoner_name: String,
    pub testimoner_current_position: String,
    pub testimoner_previous_position: String,
    pub testimony_text: String,
    #[serde(default)]
    pub testimoner_photo: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Student class (cohort).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "classname")]
    pub name: String,
}

/// `{value, label}` pair for pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}
