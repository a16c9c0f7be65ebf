use reqwest::Client;

use vireo_core::RoleOptions;

use super::{take_string, ClientConfig};

/// Reasoning-specialized client. The provider expects `api_base`, so an
/// incoming `base_url` is renamed before construction.
#[derive(Debug)]
pub struct DeepSeekClient {
    http: Client,
    pub config: ClientConfig,
}

impl DeepSeekClient {
    pub(crate) fn from_options(http: Client, mut options: RoleOptions) -> Self {
        let base_url = take_string(&mut options, "base_url");
        let mut config = ClientConfig::from_options(options);
        if base_url.is_some() {
            config.api_base = base_url;
        }

        Self { http, config }
    }

    pub fn transport(&self) -> &Client {
        &self.http
    }
}
