mod extract;
mod router;

pub use extract::{extract_modify_event, extract_new_event};
pub use router::route_request;

use crate::error::{llm_error, AppResult};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::gemini::Client as GeminiClient;
use serde::de::DeserializeOwned;
use serde_json::from_str;
use tracing::error;

/// A chat-completion model the router and extractors talk to
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one prompt and return the raw response text
    async fn complete(&self, preamble: &str, prompt: &str) -> AppResult<String>;
}

/// Gemini-backed chat model
pub struct GeminiChat {
    client: GeminiClient,
    model: String,
}

impl GeminiChat {
    /// Create a new client for the given API key and model name
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: GeminiClient::new(api_key),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn complete(&self, preamble: &str, prompt: &str) -> AppResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(preamble)
            .temperature(0.0)
            .build();

        agent
            .chat(prompt.to_string(), Vec::<Message>::new())
            .await
            .map_err(|e| llm_error(&format!("Chat request failed: {}", e)))
    }
}

/// Attempt to parse a JSON object of type `T` out of a model response
///
/// The model is instructed to answer with bare JSON, but responses sometimes
/// arrive wrapped in prose or code fences, so the outermost `{...}` span is
/// tried first and the whole response second.
pub fn extract_json_object<T: DeserializeOwned>(response: &str) -> AppResult<T> {
    if let Some(json_start) = response.find('{') {
        if let Some(json_end) = response.rfind('}') {
            if json_start < json_end {
                let json_str = &response[json_start..=json_end];
                match from_str::<T>(json_str) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        error!("Failed to parse JSON from response: {}", e);
                        error!("JSON string: {}", json_str);
                    }
                }
            }
        }
    }

    // Try to parse the entire response as JSON (in case it's already clean JSON)
    match from_str::<T>(response) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!("Could not extract valid JSON from response: {}", response);
            Err(llm_error(&format!(
                "Could not extract valid JSON from the model response: {}",
                e
            )))
        }
    }
}
