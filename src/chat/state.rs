use chrono::{ DateTime, Local };

use crate::models::{ ChatMessage, ContextTurn, Notification };

pub const WELCOME_MESSAGE: &str =
    "欢迎使用SceneFlow! 请描述您想要生成的3D场景，例如：\"创建一个现代简约风格的客厅，有一张灰色沙发和落地窗。\"";
pub const RESET_MESSAGE: &str = "对话已重置。请描述您想要生成的3D场景。";
pub const FALLBACK_MESSAGE: &str = "抱歉，处理您的请求时出现了错误。请稍后再试。";
pub const ERROR_TITLE: &str = "请求失败";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

#[derive(Debug, Clone)]
pub enum ChatAction {
    Submit {
        text: String,
        at: DateTime<Local>,
    },
    AssistantReply {
        content: String,
        at: DateTime<Local>,
    },
    ExchangeFailed {
        reason: String,
        at: DateTime<Local>,
    },
    ExchangeFinished,
    Reset {
        at: DateTime<Local>,
    },
}

/// Conversation view state. All changes go through `apply`, which performs no
/// I/O and takes the clock as input.
#[derive(Debug, Clone)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    phase: Phase,
    notifications: Vec<Notification>,
    last_id: i64,
}

impl ChatState {
    pub fn new(at: DateTime<Local>) -> Self {
        let mut state = Self {
            messages: Vec::new(),
            phase: Phase::Idle,
            notifications: Vec::new(),
            last_id: 0,
        };
        state.push(false, WELCOME_MESSAGE.to_string(), at);
        state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == Phase::Sending
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Prior turns sent to the service; the leading welcome or reset message
    /// is not part of the dialogue.
    pub fn context(&self) -> Vec<ContextTurn> {
        self.messages
            .iter()
            .skip(1)
            .map(ChatMessage::to_turn)
            .collect()
    }

    /// Returns `false` when the action is not valid in the current phase; the
    /// state is left untouched in that case.
    pub fn apply(&mut self, action: ChatAction) -> bool {
        match (self.phase, action) {
            (Phase::Idle, ChatAction::Submit { text, at }) => {
                if text.trim().is_empty() {
                    return false;
                }
                self.push(true, text, at);
                self.phase = Phase::Sending;
                true
            }
            (Phase::Sending, ChatAction::AssistantReply { content, at }) => {
                self.push(false, content, at);
                true
            }
            (Phase::Sending, ChatAction::ExchangeFailed { reason, at }) => {
                self.push(false, FALLBACK_MESSAGE.to_string(), at);
                self.notifications.push(Notification::error(ERROR_TITLE, reason));
                true
            }
            (Phase::Sending, ChatAction::ExchangeFinished) => {
                self.phase = Phase::Idle;
                true
            }
            (Phase::Idle, ChatAction::Reset { at }) => {
                self.messages.clear();
                self.push(false, RESET_MESSAGE.to_string(), at);
                true
            }
            _ => false,
        }
    }

    fn push(&mut self, is_user: bool, content: String, at: DateTime<Local>) {
        let id = self.next_id(at);
        self.messages.push(ChatMessage {
            id,
            is_user,
            content,
            timestamp: at.format("%H:%M:%S").to_string(),
        });
    }

    /// Millisecond timestamp, bumped past the previous id when two messages
    /// land in the same millisecond.
    fn next_id(&mut self, at: DateTime<Local>) -> String {
        let id = at.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn submit(text: &str) -> ChatAction {
        ChatAction::Submit { text: text.to_string(), at: Local::now() }
    }

    #[test]
    fn starts_with_welcome_message() {
        let state = ChatState::new(Local::now());
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].content, WELCOME_MESSAGE);
        assert!(state.context().is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn submit_appends_one_user_message_and_enters_sending() {
        let mut state = ChatState::new(Local::now());
        assert!(state.apply(submit("现代简约风格的客厅")));
        assert_eq!(state.messages().len(), 2);
        assert!(state.messages()[1].is_user);
        assert!(state.is_sending());
    }

    #[test]
    fn blank_or_overlapping_submissions_are_rejected() {
        let mut state = ChatState::new(Local::now());
        assert!(!state.apply(submit("   \n\t")));
        assert_eq!(state.messages().len(), 1);

        assert!(state.apply(submit("卧室")));
        let before = state.messages().to_vec();
        assert!(!state.apply(submit("厨房")));
        assert_eq!(state.messages(), before.as_slice());
        assert!(state.is_sending());
    }

    #[test]
    fn failure_appends_fallback_and_notification() {
        let mut state = ChatState::new(Local::now());
        state.apply(submit("书房"));
        state.apply(ChatAction::ExchangeFailed { reason: "boom".into(), at: Local::now() });
        state.apply(ChatAction::ExchangeFinished);

        assert_eq!(state.messages().last().unwrap().content, FALLBACK_MESSAGE);
        let notes = state.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].description, "boom");
        assert!(state.take_notifications().is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn replies_are_ignored_outside_sending() {
        let mut state = ChatState::new(Local::now());
        assert!(!state.apply(ChatAction::AssistantReply { content: "x".into(), at: Local::now() }));
        assert!(!state.apply(ChatAction::ExchangeFinished));
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn reset_leaves_exactly_one_message() {
        let mut state = ChatState::new(Local::now());
        state.apply(submit("客厅"));
        state.apply(ChatAction::AssistantReply { content: "好的".into(), at: Local::now() });
        assert!(!state.apply(ChatAction::Reset { at: Local::now() }));

        state.apply(ChatAction::ExchangeFinished);
        assert!(state.apply(ChatAction::Reset { at: Local::now() }));
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].content, RESET_MESSAGE);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let at = Local::now();
        let mut state = ChatState::new(at);
        for _ in 0..5 {
            state.apply(ChatAction::Submit { text: "x".into(), at });
            state.apply(ChatAction::AssistantReply { content: "y".into(), at });
            state.apply(ChatAction::ExchangeFinished);
        }
        let ids: HashSet<_> = state
            .messages()
            .iter()
            .map(|m| m.id.clone())
            .collect();
        assert_eq!(ids.len(), state.messages().len());
    }

    #[test]
    fn context_skips_leading_message_and_maps_roles() {
        let mut state = ChatState::new(Local::now());
        state.apply(submit("客厅"));
        state.apply(ChatAction::AssistantReply { content: "已生成".into(), at: Local::now() });
        let ctx = state.context();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].role, "user");
        assert_eq!(ctx[1].role, "assistant");
    }
}
