//! OpenAI-compatible chat-completions backend for message generation.

use std::time::Duration;

use async_trait::async_trait;
use doorman_core::EventKind;
use serde::{Deserialize, Serialize};

use crate::composer::{GeneratorError, MessageGenerator, MessagePrompt};

/// Default chat-completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Default model for greeting generation.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Greetings are short; cap the completion accordingly.
const MAX_TOKENS: u32 = 50;

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One-shot chat-completion client for greeting/farewell text.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        // The composer bounds each call separately; this client timeout
        // is a backstop for connection establishment.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn user_prompt(prompt: &MessagePrompt) -> String {
        match prompt.kind {
            EventKind::Arrival => {
                let who = if prompt.first_time {
                    "who is using the system for the first time"
                } else {
                    "who has returned"
                };
                format!(
                    "Generate a short, friendly welcome message for {} {}. \
                     Make it witty and engaging but keep it under 20 words.",
                    prompt.identity, who
                )
            }
            EventKind::Departure => format!(
                "Generate a short, friendly goodbye message for {}. \
                 Make it warm and personal but keep it under 20 words.",
                prompt.identity
            ),
        }
    }
}

#[async_trait]
impl MessageGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &MessagePrompt) -> Result<String, GeneratorError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a friendly AI assistant generating welcome and goodbye messages.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(prompt),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GeneratorError::EmptyResponse)
    }
}
