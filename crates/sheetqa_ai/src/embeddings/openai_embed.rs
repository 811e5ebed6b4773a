use serde::{Deserialize, Serialize};
use sheetqa_core::error::AppError;

use super::Embedder;
use crate::openai::OpenAiClient;

/// Upper bound on bytes sent per embeddings request.
const MAX_INPUT_BYTES: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
}

/// Clip oversized input to the request limit without splitting a UTF-8
/// character. Enriched queries carry caller-supplied conversation text, so
/// the limit can land mid-character.
fn bounded_input(input: &str) -> &str {
    if input.len() <= MAX_INPUT_BYTES {
        return input;
    }
    let mut end = MAX_INPUT_BYTES;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let input = bounded_input(input);

        let url = format!("{}/v1/embeddings", self.client.base_url());
        let req = EmbeddingsRequest { model, input };
        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(10))
            .set("Authorization", &self.client.bearer())
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("QA_EMBEDDINGS_FAILED", "Failed to encode embeddings request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: EmbeddingsResponse = r.into_json().map_err(|e| {
                    AppError::new("QA_EMBEDDINGS_FAILED", "Failed to decode embeddings response")
                        .with_details(e.to_string())
                })?;
                let vector = v
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .unwrap_or_default();
                if vector.is_empty() {
                    return Err(AppError::new(
                        "QA_EMBEDDINGS_FAILED",
                        "Embeddings response was empty",
                    ));
                }
                Ok(vector)
            }
            Ok(r) => Err(
                AppError::new("QA_EMBEDDINGS_FAILED", "Embeddings request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(
                AppError::new("QA_EMBEDDINGS_FAILED", "Failed to call embeddings endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
