use serde::{Deserialize, Serialize};
use sheetqa_core::error::AppError;

use super::{ChatModel, ChatTurn};
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: OpenAiClient,
}

impl OpenAiChat {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatModel for OpenAiChat {
    fn complete(&self, model: &str, messages: &[ChatTurn]) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.client.base_url());
        let req = ChatRequest {
            model,
            messages,
            // Grounded answers must be reproducible; no sampling spread.
            temperature: 0.0,
        };

        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(60))
            .set("Authorization", &self.client.bearer())
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("QA_CHAT_FAILED", "Failed to encode chat request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: ChatResponse = r.into_json().map_err(|e| {
                    AppError::new("QA_CHAT_FAILED", "Failed to decode chat response")
                        .with_details(e.to_string())
                })?;
                // A blank completion is not an error here; the answer shaper
                // owns the empty-answer policy.
                let text = v
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default();
                Ok(text.trim().to_string())
            }
            Ok(r) => Err(AppError::new("QA_CHAT_FAILED", "Chat request failed")
                .with_details(format!("status={}", r.status()))),
            Err(e) => Err(
                AppError::new("QA_CHAT_FAILED", "Failed to call chat endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
