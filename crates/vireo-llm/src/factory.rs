use std::path::Path;

use tracing::debug;

use vireo_core::config::{load_config, merged_options};
use vireo_core::error::{Result, VireoError};
use vireo_core::{Role, RoleOptions};

use crate::probe::EndpointProber;
use crate::providers::{
    AzureClient, ClientConfig, DashscopeClient, DeepSeekClient, OpenAiCompatibleClient,
    DEFAULT_MAX_RETRIES,
};

/// Ambient environment inputs that influence provider selection, snapshotted
/// at the call boundary so selection itself stays pure.
#[derive(Debug, Clone, Default)]
pub struct SelectContext {
    pub azure_endpoint: Option<String>,
}

impl SelectContext {
    pub fn from_env() -> Self {
        Self {
            azure_endpoint: std::env::var("AZURE_OPENAI_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

/// Provider family, decided by an ordered predicate list over the merged
/// options. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Azure,
    Dashscope,
    DeepSeek,
    OpenAiCompatible,
}

impl ProviderKind {
    pub fn select(role: Role, options: &RoleOptions, ctx: &SelectContext) -> Self {
        if options.get("azure_endpoint").is_some() || ctx.azure_endpoint.is_some() {
            return ProviderKind::Azure;
        }
        if options
            .get_str("base_url")
            .is_some_and(|url| url.contains("dashscope."))
        {
            return ProviderKind::Dashscope;
        }
        if role == Role::Reasoning {
            return ProviderKind::DeepSeek;
        }
        ProviderKind::OpenAiCompatible
    }
}

/// A configured chat-completion client, one variant per provider family.
#[derive(Debug)]
pub enum ChatClient {
    Azure(AzureClient),
    Dashscope(DashscopeClient),
    DeepSeek(DeepSeekClient),
    OpenAiCompatible(OpenAiCompatibleClient),
}

impl ChatClient {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ChatClient::Azure(_) => ProviderKind::Azure,
            ChatClient::Dashscope(_) => ProviderKind::Dashscope,
            ChatClient::DeepSeek(_) => ProviderKind::DeepSeek,
            ChatClient::OpenAiCompatible(_) => ProviderKind::OpenAiCompatible,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        match self {
            ChatClient::Azure(c) => &c.config,
            ChatClient::Dashscope(c) => &c.config,
            ChatClient::DeepSeek(c) => &c.config,
            ChatClient::OpenAiCompatible(c) => &c.config,
        }
    }

    pub fn transport(&self) -> &reqwest::Client {
        match self {
            ChatClient::Azure(c) => c.transport(),
            ChatClient::Dashscope(c) => c.transport(),
            ChatClient::DeepSeek(c) => c.transport(),
            ChatClient::OpenAiCompatible(c) => c.transport(),
        }
    }

    /// Configured model name, when one is set.
    pub fn model(&self) -> Option<&str> {
        self.config().model.as_deref()
    }
}

/// Resolve a role's layered configuration and construct its client.
///
/// Configuration is loaded fresh on every call; memoization happens one
/// level up, in the registry.
pub async fn resolve_client(
    config_path: &Path,
    role: Role,
    prober: &EndpointProber,
) -> Result<ChatClient> {
    let doc = load_config(config_path)?;
    let mut options = merged_options(&doc, role)?;

    if options.is_empty() {
        // Last resort: a locally running inference server.
        match prober.probe().await {
            Some(base) => {
                options.insert("api_base", base);
                options.insert("api_key", "lm-studio");
                options.insert("streaming", true);
            }
            None => return Err(VireoError::ConfigMissing(role)),
        }
    }

    options.set_default("max_retries", DEFAULT_MAX_RETRIES as i64);

    // Shapes transport construction only; never forwarded as a client option.
    let verify_ssl = options.take_flag("verify_ssl", true);
    let http = build_transport(verify_ssl)?;

    let ctx = SelectContext::from_env();
    let kind = ProviderKind::select(role, &options, &ctx);
    debug!(role = %role, kind = ?kind, "provider selected");

    let client = match kind {
        ProviderKind::Azure => ChatClient::Azure(AzureClient::from_options(
            http,
            options,
            ctx.azure_endpoint.as_deref(),
        )),
        ProviderKind::Dashscope => {
            ChatClient::Dashscope(DashscopeClient::from_options(http, options, role))
        }
        ProviderKind::DeepSeek => ChatClient::DeepSeek(DeepSeekClient::from_options(http, options)),
        ProviderKind::OpenAiCompatible => {
            let probed = if options.get("base_url").is_none() && options.get("api_base").is_none() {
                prober.probe().await
            } else {
                None
            };
            ChatClient::OpenAiCompatible(OpenAiCompatibleClient::from_options(http, options, probed))
        }
    };

    Ok(client)
}

fn build_transport(verify_ssl: bool) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if !verify_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
        .build()
        .map_err(|e| VireoError::Transport(e.to_string()))
}
