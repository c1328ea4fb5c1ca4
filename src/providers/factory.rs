use crate::providers::ProviderAdapter;
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::openai::OpenAiAdapter;

/// Construct the adapter for a provider identifier, lowercase-normalized.
/// Unknown identifiers yield `None`; the caller decides how to surface that.
/// New backends register one more arm here without touching orchestration.
pub fn create_adapter(
    provider_id: &str,
    api_key: &str,
    client: reqwest::Client,
) -> Option<Box<dyn ProviderAdapter>> {
    match provider_id.to_ascii_lowercase().as_str() {
        "openai" => Some(Box::new(OpenAiAdapter::new(client, api_key))),
        "anthropic" => Some(Box::new(AnthropicAdapter::new(client, api_key))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;

    #[test]
    fn known_identifiers_construct_their_adapter() {
        let client = reqwest::Client::new();
        let adapter = create_adapter("openai", "sk-test", client.clone()).unwrap();
        assert_eq!(adapter.provider(), Provider::OpenAi);
        let adapter = create_adapter("Anthropic", "sk-test", client).unwrap();
        assert_eq!(adapter.provider(), Provider::Anthropic);
    }

    #[test]
    fn unknown_identifier_is_none_not_an_error() {
        assert!(create_adapter("palm", "sk-test", reqwest::Client::new()).is_none());
    }

    #[test]
    fn every_cataloged_provider_has_an_adapter() {
        for provider in Provider::ALL {
            assert!(
                create_adapter(provider.as_str(), "sk-test", reqwest::Client::new()).is_some()
            );
        }
    }
}
