//! Provider adapters: one implementation per AI backend behind a uniform
//! ask-question contract, constructed through the factory.

pub mod anthropic;
pub mod factory;
pub mod openai;
pub mod truncate;

use async_trait::async_trait;

use crate::config::Provider;
use crate::error::SibylError;

pub use factory::create_adapter;

/// System instruction sent on every exchange, regardless of backend.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant analyzing webpage content.";

/// Character budget applied to webpage context before it is embedded in the
/// user turn.
pub const CONTEXT_CHAR_BUDGET: usize = 4000;

/// A single AI backend's calling convention behind a uniform contract.
///
/// Implementations make exactly one attempt, bounded by the shared client's
/// request timeout, and convert every backend/network/parse failure into
/// [`SibylError::ExternalCall`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Answer `question` grounded in `context`, using `model` or the
    /// provider's default when absent.
    async fn answer(
        &self,
        question: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<String, SibylError>;
}

/// Build the single user turn embedding the truncated context.
pub(crate) fn user_turn(question: &str, context: &str) -> String {
    let truncated = truncate::truncate(context, CONTEXT_CHAR_BUDGET);
    format!("Context: {truncated}\n\nQuestion: {question}")
}

/// Normalize a non-2xx upstream response into an error message, preferring
/// the provider's own `error.message` field when the body carries one.
pub(crate) async fn upstream_error(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(|m| format!("{status}: {m}"))
            .unwrap_or_else(|| format!("upstream returned status {status}")),
        Err(_) => format!("upstream returned status {status}"),
    }
}
