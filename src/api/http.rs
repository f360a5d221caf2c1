use async_trait::async_trait;
use log::{ debug, error };
use reqwest::header::CONTENT_TYPE;
use reqwest::{ Client as HttpClient, RequestBuilder };
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::SceneApi;
use crate::config::{ path_segment, ApiConfig };
use crate::error::ApiError;
use crate::models::api::{
    ApiEnvelope,
    ChatContext,
    ChatHistoryResponse,
    ChatMessageRequest,
    ChatMessageResponse,
    GenerateSceneRequest,
    GeneratedScene,
    HealthResponse,
    OptimizationResponse,
    OptimizeSceneRequest,
};
use crate::models::{ ContextTurn, SceneDescription };

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpSceneApi {
    http: HttpClient,
    config: ApiConfig,
}

impl HttpSceneApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: HttpClient::new(),
            config,
        }
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> ApiEnvelope<T> {
        let url = self.config.endpoint(route);
        debug!("GET {}", url);
        let req = self.http.get(&url).header(CONTENT_TYPE, "application/json");
        Self::fetch(&url, req).await
    }

    async fn post<T, B>(&self, route: &str, body: &B) -> ApiEnvelope<T>
        where T: DeserializeOwned, B: Serialize + ?Sized
    {
        let url = self.config.endpoint(route);
        debug!("POST {}", url);
        let req = self.http.post(&url).json(body);
        Self::fetch(&url, req).await
    }

    async fn fetch<T: DeserializeOwned>(url: &str, req: RequestBuilder) -> ApiEnvelope<T> {
        match Self::try_fetch(req).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("API request to {} failed: {}", url, e);
                e.into()
            }
        }
    }

    async fn try_fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<ApiEnvelope<T>, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
            error!("Failed to parse response as JSON: {}...", preview);
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl SceneApi for HttpSceneApi {
    async fn generate_scene(
        &self,
        description: &str,
        context: &[ContextTurn]
    ) -> ApiEnvelope<GeneratedScene> {
        self.post("/api/generate-scene", &GenerateSceneRequest { description, context }).await
    }

    async fn optimize_scene(&self, scene: &SceneDescription) -> ApiEnvelope<OptimizationResponse> {
        self.post("/api/scenes/optimize", &OptimizeSceneRequest { scene }).await
    }

    async fn send_chat_message(
        &self,
        conversation_id: &str,
        message: &str,
        context: &ChatContext
    ) -> ApiEnvelope<ChatMessageResponse> {
        debug!("Sending chat message for conversation {}", conversation_id);
        let body = ChatMessageRequest { conversation_id, message, context };
        self.post("/api/chat/message", &body).await
    }

    async fn get_chat_history(&self, conversation_id: &str) -> ApiEnvelope<ChatHistoryResponse> {
        self.get(&format!("/api/chat/history/{}", path_segment(conversation_id))).await
    }

    async fn get_system_health(&self) -> ApiEnvelope<HealthResponse> {
        self.get("/api/health").await
    }
}
