use serde::{Deserialize, Serialize};
use sheetqa_core::error::AppError;

/// Wire-shaped chat message: `role` is the literal string the completion
/// API expects (system|user|assistant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

pub trait ChatModel {
    fn complete(&self, model: &str, messages: &[ChatTurn]) -> Result<String, AppError>;
}

pub mod openai_chat;
