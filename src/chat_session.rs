use serde::{Deserialize, Serialize};
use crate::manager_gemini::models::{Content, Role};

const GREETING: &str = "嗨👋 我是你的運勢小助手，可以幫你分析今日運勢喔！";
const SUGGESTION_HEADER: &str = "☀️ 天氣與穿搭建議：";
pub const NO_REPLY: &str = "[No content]";
pub const NO_SUGGESTION: &str = "小助手沒有想到建議呢！";

/// Conversation state owned by the widget and sent along with each chat request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub history: Vec<Content>,
}

/// Everything that may happen to a conversation
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    UserMessage(String),
    ModelReply(String),
    WeatherSuggestion(String),
    Reset,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh conversation opened by the assistant's greeting
    pub fn new() -> Self {
        Self { history: vec![Content::new(Role::Model, GREETING)] }
    }

    /// Returns the session that results from the event
    ///
    /// # Arguments
    ///
    /// * 'event' - what happened
    pub fn apply(mut self, event: ChatEvent) -> Self {
        match event {
            ChatEvent::UserMessage(text) => self.history.push(Content::new(Role::User, &text)),
            ChatEvent::ModelReply(text) => self.history.push(Content::new(Role::Model, &text)),
            ChatEvent::WeatherSuggestion(text) => {
                let text = format!("{}\n{}", SUGGESTION_HEADER, text);
                self.history.push(Content::new(Role::Model, &text));
            }
            ChatEvent::Reset => return Self::new(),
        }

        self
    }

    /// The conversation to send upstream: the history followed by the prompt as a user turn
    ///
    /// # Arguments
    ///
    /// * 'prompt' - the prompt to append
    pub fn conversation_with(&self, prompt: &str) -> Vec<Content> {
        let mut contents = self.history.clone();
        contents.push(Content::new(Role::User, prompt));
        contents
    }
}
