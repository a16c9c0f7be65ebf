use reqwest::Client;

use vireo_core::RoleOptions;

use super::{take_string, ClientConfig};

/// Placeholder key for local servers that ignore authentication but whose
/// client surface still requires one.
const LOCAL_PLACEHOLDER_KEY: &str = "lm-studio";

/// Generic OpenAI-compatible client: LM Studio, vLLM, Ollama, or any cloud
/// endpoint speaking the same wire format.
#[derive(Debug)]
pub struct OpenAiCompatibleClient {
    http: Client,
    pub config: ClientConfig,
}

impl OpenAiCompatibleClient {
    /// Prefers an explicit base URL from the options; `probed` carries a
    /// discovered local server when the caller had to fall back. With a
    /// resolved base, the key and streaming flag get local-server defaults.
    pub(crate) fn from_options(
        http: Client,
        mut options: RoleOptions,
        probed: Option<String>,
    ) -> Self {
        let base_url = take_string(&mut options, "base_url");
        let mut config = ClientConfig::from_options(options);

        if let Some(base) = base_url.or(config.api_base.take()).or(probed) {
            config.api_base = Some(base);
            if config.api_key.is_none() {
                config.api_key = Some(LOCAL_PLACEHOLDER_KEY.to_string());
            }
            if config.streaming.is_none() {
                config.streaming = Some(true);
            }
        }

        Self { http, config }
    }

    pub fn transport(&self) -> &Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probed_base_gets_local_defaults() {
        let mut options = RoleOptions::new();
        options.insert("model", "llama-3.1-8b");

        let client = OpenAiCompatibleClient::from_options(
            Client::new(),
            options,
            Some("http://localhost:1234/v1".to_string()),
        );
        assert_eq!(client.config.api_base.as_deref(), Some("http://localhost:1234/v1"));
        assert_eq!(client.config.api_key.as_deref(), Some("lm-studio"));
        assert_eq!(client.config.streaming, Some(true));
    }

    #[test]
    fn test_explicit_base_url_wins_over_probe() {
        let mut options = RoleOptions::new();
        options.insert("base_url", "https://api.openai.com/v1");
        options.insert("api_key", "sk-real");
        options.insert("streaming", false);

        let client = OpenAiCompatibleClient::from_options(
            Client::new(),
            options,
            Some("http://localhost:1234/v1".to_string()),
        );
        assert_eq!(client.config.api_base.as_deref(), Some("https://api.openai.com/v1"));
        // Explicit settings are not clobbered by local-server defaults.
        assert_eq!(client.config.api_key.as_deref(), Some("sk-real"));
        assert_eq!(client.config.streaming, Some(false));
    }

    #[test]
    fn test_no_base_resolved_leaves_options_untouched() {
        let mut options = RoleOptions::new();
        options.insert("model", "gpt-4o-mini");
        options.insert("api_key", "sk-cloud");

        let client = OpenAiCompatibleClient::from_options(Client::new(), options, None);
        assert!(client.config.api_base.is_none());
        assert_eq!(client.config.api_key.as_deref(), Some("sk-cloud"));
        assert_eq!(client.config.streaming, None);
    }
}
