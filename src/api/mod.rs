pub mod http;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::models::api::{
    ApiEnvelope,
    ChatContext,
    ChatHistoryResponse,
    ChatMessageResponse,
    GeneratedScene,
    HealthResponse,
    OptimizationResponse,
};
use crate::models::{ ContextTurn, SceneDescription };
use self::http::HttpSceneApi;

/// Calls into the scene generation service. Implementations never fail with
/// `Err`: every transport, status or parse problem comes back as a failure
/// envelope so callers only branch on `code`.
#[async_trait]
pub trait SceneApi: Send + Sync {
    async fn generate_scene(
        &self,
        description: &str,
        context: &[ContextTurn]
    ) -> ApiEnvelope<GeneratedScene>;

    async fn optimize_scene(&self, scene: &SceneDescription) -> ApiEnvelope<OptimizationResponse>;

    async fn send_chat_message(
        &self,
        conversation_id: &str,
        message: &str,
        context: &ChatContext
    ) -> ApiEnvelope<ChatMessageResponse>;

    async fn get_chat_history(&self, conversation_id: &str) -> ApiEnvelope<ChatHistoryResponse>;

    async fn get_system_health(&self) -> ApiEnvelope<HealthResponse>;
}

pub fn new_client(config: &ApiConfig) -> Arc<dyn SceneApi> {
    Arc::new(HttpSceneApi::new(config.clone()))
}
