use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Runtime configuration, resolved once from defaults merged with
/// `SIBYL_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub bind: String,
    pub loglevel: String,
    pub proxy: Option<Url>,
    /// Max output tokens requested from every provider.
    pub max_tokens: u32,
    /// Sampling temperature shared by every provider.
    pub temperature: f32,
    /// Whole-request bound on outbound provider calls.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:sibyl.db".to_string(),
            bind: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            proxy: None,
            max_tokens: 1000,
            temperature: 0.7,
            request_timeout_secs: 60,
        }
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("SIBYL_"))
        .extract()
        .expect("invalid SIBYL_* configuration")
});

/// Closed set of supported AI backends. The adapter factory must stay in
/// lockstep with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Anthropic];

    /// Parse a caller-supplied identifier, normalizing case. Unknown
    /// identifiers are `None`, not an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Allow-list of model names accepted for this provider.
    pub fn supported_models(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-4", "gpt-3.5-turbo"],
            Self::Anthropic => &["claude-3-sonnet-20240229"],
        }
    }

    /// Fallback model when neither the caller nor the credential names one.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Anthropic => "claude-3-sonnet-20240229",
        }
    }

    pub fn supports_model(self, model: &str) -> bool {
        self.supported_models().contains(&model)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
