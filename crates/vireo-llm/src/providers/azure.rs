use reqwest::Client;

use vireo_core::RoleOptions;

use super::{take_string, ClientConfig};

/// Client for an Azure-hosted OpenAI deployment. Same wire surface as
/// OpenAI, but addressed by resource endpoint + deployment instead of a
/// plain base URL.
#[derive(Debug)]
pub struct AzureClient {
    http: Client,
    pub config: ClientConfig,
    pub azure_endpoint: Option<String>,
    pub azure_deployment: Option<String>,
    pub api_version: Option<String>,
}

impl AzureClient {
    /// All options pass through. The endpoint may come from the ambient
    /// environment when the role options omit it.
    pub(crate) fn from_options(
        http: Client,
        mut options: RoleOptions,
        env_endpoint: Option<&str>,
    ) -> Self {
        let azure_endpoint =
            take_string(&mut options, "azure_endpoint").or_else(|| env_endpoint.map(str::to_owned));
        let azure_deployment = take_string(&mut options, "azure_deployment");
        let api_version = take_string(&mut options, "api_version");

        Self {
            http,
            config: ClientConfig::from_options(options),
            azure_endpoint,
            azure_deployment,
            api_version,
        }
    }

    pub fn transport(&self) -> &Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_options_wins_over_env() {
        let mut options = RoleOptions::new();
        options.insert("azure_endpoint", "https://mine.openai.azure.com");
        options.insert("azure_deployment", "gpt-4o");
        options.insert("api_version", "2024-06-01");
        options.insert("model", "gpt-4o");

        let client =
            AzureClient::from_options(Client::new(), options, Some("https://ambient.example"));
        assert_eq!(
            client.azure_endpoint.as_deref(),
            Some("https://mine.openai.azure.com")
        );
        assert_eq!(client.azure_deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(client.api_version.as_deref(), Some("2024-06-01"));
        assert_eq!(client.config.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_endpoint_falls_back_to_environment() {
        let client = AzureClient::from_options(
            Client::new(),
            RoleOptions::new(),
            Some("https://ambient.example"),
        );
        assert_eq!(client.azure_endpoint.as_deref(), Some("https://ambient.example"));
    }
}
