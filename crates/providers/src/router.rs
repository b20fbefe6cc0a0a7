//! Provider router - selects the correct LLM provider based on config.

use std::collections::HashMap;
use std::sync::Arc;

use stackwright_config::AppConfig;
use stackwright_core::provider::Provider;

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Canonical ids of Claude models carry this prefix (the Bedrock naming).
const ANTHROPIC_MODEL_PREFIX: &str = "anthropic.";

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Pick the provider for a canonical model id and translate the id into
    /// the one that provider expects.
    ///
    /// `anthropic.claude-3-5-sonnet-20241022-v2:0` goes to the native
    /// Anthropic provider as `claude-3-5-sonnet-20241022` when one is
    /// registered; everything else goes to the default provider unchanged.
    pub fn resolve(&self, model_id: &str) -> Option<(Arc<dyn Provider>, String)> {
        if model_id.starts_with(ANTHROPIC_MODEL_PREFIX)
            && let Some(provider) = self.get("anthropic")
        {
            return Some((provider, anthropic_api_model(model_id)));
        }

        self.default().map(|p| (p, model_id.to_string()))
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// `anthropic.claude-3-haiku-20240307-v1:0` → `claude-3-haiku-20240307`.
pub fn anthropic_api_model(model_id: &str) -> String {
    let name = model_id
        .strip_prefix(ANTHROPIC_MODEL_PREFIX)
        .unwrap_or(model_id);
    match name.rsplit_once("-v") {
        Some((base, version)) if version.contains(':') => base.to_string(),
        _ => name.to_string(),
    }
}

/// Build providers from configuration.
///
/// Registers every `[providers.*]` entry, the default provider, and the
/// native Anthropic provider when the configured model is a Claude model.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let provider: Arc<dyn Provider> = if name == "anthropic" {
            let mut p = AnthropicProvider::new(&api_key);
            if let Some(url) = &provider_config.api_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        } else {
            let base_url = provider_config
                .api_url
                .clone()
                .unwrap_or_else(|| default_base_url(name));
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key))
        };

        router.register(name.clone(), provider);
    }

    let api_key = config.api_key.clone().unwrap_or_default();

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let provider: Arc<dyn Provider> = if config.default_provider == "anthropic" {
            Arc::new(AnthropicProvider::new(&api_key))
        } else {
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &default_base_url(&config.default_provider),
                &api_key,
            ))
        };
        router.register(config.default_provider.clone(), provider);
    }

    if config.model_id().starts_with(ANTHROPIC_MODEL_PREFIX) && router.get("anthropic").is_none() {
        router.register("anthropic", Arc::new(AnthropicProvider::new(&api_key)));
    }

    router
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwright_config::ProviderConfig;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openrouter");
        let provider = Arc::new(OpenAiCompatProvider::openrouter("sk-test"));
        router.register("openrouter", provider);

        assert!(router.get("openrouter").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn anthropic_ids_are_translated() {
        assert_eq!(
            anthropic_api_model("anthropic.claude-3-5-sonnet-20241022-v2:0"),
            "claude-3-5-sonnet-20241022"
        );
        assert_eq!(
            anthropic_api_model("anthropic.claude-3-haiku-20240307-v1:0"),
            "claude-3-haiku-20240307"
        );
        assert_eq!(anthropic_api_model("claude-3-5-haiku-latest"), "claude-3-5-haiku-latest");
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["openai"]);

        let (provider, model) = router.resolve(&config.model_id()).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(model, "gpt-4o-mini");
    }

    #[test]
    fn claude_model_routes_to_anthropic() {
        let config = AppConfig {
            default_model: "sonnet".into(),
            ..AppConfig::default()
        };
        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["anthropic", "openai"]);

        let (provider, model) = router.resolve(&config.model_id()).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(model, "claude-3-5-sonnet-20241022");

        // GPT models still go to the default provider
        let (provider, _) = router.resolve("gpt-4o").unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig {
            default_provider: "ollama".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "ollama".into(),
            ProviderConfig {
                api_url: Some("http://gpu-box:11434/v1".into()),
                ..ProviderConfig::default()
            },
        );

        let router = build_from_config(&config);
        assert_eq!(router.default().unwrap().name(), "ollama");
    }
}
