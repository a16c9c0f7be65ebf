use reqwest::Client;
use serde::Serialize;

use vireo_core::{Role, RoleOptions};

use super::{take_string, ClientConfig};

/// Request-body extras the Dashscope-compatible endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtraBody {
    pub enable_thinking: bool,
}

/// Client for a Dashscope-compatible endpoint, selected when the configured
/// `base_url` points at a dashscope domain.
#[derive(Debug)]
pub struct DashscopeClient {
    http: Client,
    pub config: ClientConfig,
    pub base_url: Option<String>,
    pub extra_body: ExtraBody,
}

impl DashscopeClient {
    /// Thinking mode is tied to the role: reasoning gets it, every other
    /// role has it explicitly off.
    pub(crate) fn from_options(http: Client, mut options: RoleOptions, role: Role) -> Self {
        let base_url = take_string(&mut options, "base_url");

        Self {
            http,
            config: ClientConfig::from_options(options),
            base_url,
            extra_body: ExtraBody {
                enable_thinking: role == Role::Reasoning,
            },
        }
    }

    pub fn transport(&self) -> &Client {
        &self.http
    }
}
