use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub is_user: bool,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn role(&self) -> &'static str {
        if self.is_user { "user" } else { "assistant" }
    }

    pub fn to_turn(&self) -> ContextTurn {
        ContextTurn {
            role: self.role().to_string(),
            content: self.content.clone(),
        }
    }
}

/// One prior turn sent to the service for dialogue continuity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient user-visible toast.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, title: title.into(), description: description.into() }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, title: title.into(), description: description.into() }
    }
}
