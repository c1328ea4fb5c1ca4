use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Provider;
use crate::db::models::ApiKeyRecord;
use crate::db::sqlite::CredentialStore;
use crate::error::SibylError;
use crate::providers::create_adapter;

/// Credential resolution as seen by the orchestration core. The SQLite store
/// implements it; tests substitute counting stubs.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn find_valid(
        &self,
        provider: Provider,
        user_id: Option<&str>,
    ) -> Result<Option<ApiKeyRecord>, SibylError>;
}

#[async_trait]
impl CredentialLookup for CredentialStore {
    async fn find_valid(
        &self,
        provider: Provider,
        user_id: Option<&str>,
    ) -> Result<Option<ApiKeyRecord>, SibylError> {
        CredentialStore::find_valid(self, provider, user_id).await
    }
}

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub context: String,
    pub provider: String,
    pub model: Option<String>,
    pub user_id: Option<String>,
}

/// Orchestrates one ask-question exchange:
/// validate provider, validate model, resolve credential, resolve adapter,
/// select the effective model, invoke. Validation failures short-circuit
/// before any credential lookup or network call.
#[derive(Clone)]
pub struct QuestionService {
    credentials: Arc<dyn CredentialLookup>,
    client: reqwest::Client,
}

impl QuestionService {
    pub fn new(credentials: Arc<dyn CredentialLookup>, client: reqwest::Client) -> Self {
        Self {
            credentials,
            client,
        }
    }

    pub async fn ask(&self, req: AskRequest) -> Result<String, SibylError> {
        let provider = Provider::parse(&req.provider)
            .ok_or_else(|| SibylError::UnsupportedProvider(req.provider.clone()))?;

        if let Some(model) = req.model.as_deref()
            && !provider.supports_model(model)
        {
            return Err(SibylError::UnsupportedModel {
                provider,
                model: model.to_string(),
            });
        }

        let credential = self
            .credentials
            .find_valid(provider, req.user_id.as_deref())
            .await?
            .ok_or_else(|| {
                warn!(provider = %provider, "no valid credential for ask request");
                SibylError::NoValidCredential(provider)
            })?;

        // Providers and adapters stay in lockstep; a miss here is an
        // internal configuration fault, not caller input.
        let adapter = create_adapter(provider.as_str(), &credential.key, self.client.clone())
            .ok_or(SibylError::AdapterInit(provider))?;

        let effective_model = req.model.as_deref().unwrap_or(&credential.model);
        debug!(provider = %provider, model = %effective_model, "dispatching question");

        adapter
            .answer(&req.question, &req.context, Some(effective_model))
            .await
    }
}
