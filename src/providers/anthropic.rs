use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{CONFIG, Provider};
use crate::error::SibylError;
use crate::providers::{ProviderAdapter, SYSTEM_PROMPT, upstream_error, user_turn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicAdapter {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    fn build_request<'a>(model: &'a str, user: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model,
            max_tokens: CONFIG.max_tokens,
            temperature: CONFIG.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'static str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn answer(
        &self,
        question: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<String, SibylError> {
        let user = user_turn(question, context);
        let body =
            Self::build_request(model.unwrap_or(Provider::Anthropic.default_model()), &user);

        let resp = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| SibylError::ExternalCall(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SibylError::ExternalCall(upstream_error(resp).await));
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| SibylError::ExternalCall(e.to_string()))?;
        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| {
                SibylError::ExternalCall("response contained no text content".to_string())
            })
    }
}
