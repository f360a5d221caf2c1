pub mod state;

use chrono::Local;
use log::{ info, warn };
use std::sync::Arc;
use uuid::Uuid;

use crate::api::SceneApi;
use crate::error::ExchangeError;
use crate::models::api::ChatContext;
use crate::models::{ ChatMessage, ContextTurn, Notification, SceneDescription };
use crate::viewer::SceneBridge;
use self::state::{ ChatAction, ChatState, Phase };

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or an exchange already in flight.
    Rejected,
    Replied,
    Failed(ExchangeError),
}

/// Drives one conversation: applies state transitions and performs the
/// generate-then-chat request sequence against the scene service.
pub struct ChatSession {
    api: Arc<dyn SceneApi>,
    bridge: Arc<dyn SceneBridge>,
    state: ChatState,
    conversation_id: String,
}

impl ChatSession {
    pub fn new(api: Arc<dyn SceneApi>, bridge: Arc<dyn SceneBridge>) -> Self {
        let conversation_id = Uuid::new_v4().to_string();
        info!("Started conversation {}", conversation_id);
        Self {
            api,
            bridge,
            state: ChatState::new(Local::now()),
            conversation_id,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.state.messages()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.state.take_notifications()
    }

    /// Runs one full exchange. Only one can be in flight: `&mut self` plus the
    /// `Sending` phase both guard against overlap.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        let context = self.state.context();
        if !self.state.apply(ChatAction::Submit { text: text.to_string(), at: Local::now() }) {
            return SubmitOutcome::Rejected;
        }
        self.bridge.on_loading_change(true);

        let outcome = match self.exchange(text, context).await {
            Ok(reply) => {
                self.state.apply(ChatAction::AssistantReply { content: reply, at: Local::now() });
                SubmitOutcome::Replied
            }
            Err(e) => {
                warn!("Exchange in conversation {} failed: {}", self.conversation_id, e);
                self.state.apply(ChatAction::ExchangeFailed {
                    reason: e.to_string(),
                    at: Local::now(),
                });
                SubmitOutcome::Failed(e)
            }
        };

        self.bridge.on_loading_change(false);
        self.state.apply(ChatAction::ExchangeFinished);
        outcome
    }

    /// Replaces the history with the reset message and clears the scene.
    /// Ignored while an exchange is in flight.
    pub fn reset(&mut self) -> bool {
        if !self.state.apply(ChatAction::Reset { at: Local::now() }) {
            return false;
        }
        self.bridge.on_scene_update(None);
        self.conversation_id = Uuid::new_v4().to_string();
        info!("Conversation reset, new id {}", self.conversation_id);
        true
    }

    async fn exchange(&self, text: &str, context: Vec<ContextTurn>) -> Result<String, ExchangeError> {
        let generated = self.api.generate_scene(text, &context).await;
        if !generated.is_success() {
            return Err(ExchangeError::Generate(generated.message));
        }

        let scene: Option<SceneDescription> = generated
            .into_data()
            .and_then(|d| d.scene)
            .filter(|s| !s.is_empty());
        if let Some(scene) = &scene {
            self.bridge.on_scene_update(Some(scene.clone()));
            self.bridge.on_loading_change(false);
        }

        let chat_context = ChatContext {
            previous_messages: context,
            current_scene: scene,
        };
        let reply = self.api.send_chat_message(&self.conversation_id, text, &chat_context).await;
        if !reply.is_success() {
            return Err(ExchangeError::Chat(reply.message));
        }

        let reply = reply.into_data().unwrap_or_default();
        if let Some(update) = reply.scene_update.filter(|s| !s.is_empty()) {
            self.bridge.on_scene_update(Some(update));
        }
        Ok(reply.response)
    }
}
