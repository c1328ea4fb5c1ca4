use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{CONFIG, Provider};
use crate::error::SibylError;
use crate::providers::{ProviderAdapter, SYSTEM_PROMPT, upstream_error, user_turn};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    fn build_request<'a>(model: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: CONFIG.max_tokens,
            temperature: CONFIG.temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn answer(
        &self,
        question: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<String, SibylError> {
        let user = user_turn(question, context);
        let body =
            Self::build_request(model.unwrap_or(Provider::OpenAi.default_model()), &user);

        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SibylError::ExternalCall(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SibylError::ExternalCall(upstream_error(resp).await));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| SibylError::ExternalCall(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SibylError::ExternalCall("response contained no choices".to_string()))
    }
}
