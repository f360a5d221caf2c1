use serde::{ Deserialize, Serialize };

use super::chat::ContextTurn;
use super::null_as_default;
use super::scene::SceneDescription;
use crate::error::ApiError;

pub const SUCCESS_CODE: i64 = 200;

/// Uniform `{code, message, data}` wrapper around every service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self { code: SUCCESS_CODE, message: "success".to_string(), data: Some(data) }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Payload of a successful envelope; `None` for failures and empty successes.
    pub fn into_data(self) -> Option<T> {
        if self.is_success() { self.data } else { None }
    }
}

impl<T> From<ApiError> for ApiEnvelope<T> {
    fn from(err: ApiError) -> Self {
        Self::failure(err.code(), err.to_string())
    }
}

// --- Request bodies ---

#[derive(Debug, Serialize)]
pub struct GenerateSceneRequest<'a> {
    pub description: &'a str,
    pub context: &'a [ContextTurn],
}

#[derive(Debug, Serialize)]
pub struct ChatMessageRequest<'a> {
    pub conversation_id: &'a str,
    pub message: &'a str,
    pub context: &'a ChatContext,
}

#[derive(Debug, Serialize)]
pub struct OptimizeSceneRequest<'a> {
    pub scene: &'a SceneDescription,
}

/// Context sent alongside a chat message: prior turns and the scene that was
/// just generated, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_messages: Vec<ContextTurn>,
    #[serde(default)]
    pub current_scene: Option<SceneDescription>,
}

// --- Response payloads ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedScene {
    #[serde(default)]
    pub scene: Option<SceneDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_update: Option<SceneDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ChatHistoryMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<OptimizationSuggestion>,
}
