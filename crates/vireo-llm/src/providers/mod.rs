pub mod azure;
pub mod dashscope;
pub mod deepseek;
pub mod openai;

pub use azure::AzureClient;
pub use dashscope::DashscopeClient;
pub use deepseek::DeepSeekClient;
pub use openai::OpenAiCompatibleClient;

use vireo_core::RoleOptions;

/// Retries handed to every constructed client when the configuration does
/// not say otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Options every provider understands, split out of the merged role options.
/// Keys the translation does not recognize stay in `extra` and ride along
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub streaming: Option<bool>,
    pub max_retries: u32,
    pub extra: RoleOptions,
}

impl ClientConfig {
    /// Split the well-known options out of a merged role configuration.
    pub fn from_options(mut options: RoleOptions) -> Self {
        let model = take_string(&mut options, "model");
        let api_key = take_string(&mut options, "api_key");
        let api_base = take_string(&mut options, "api_base");
        let streaming = options.take("streaming").map(|v| v.truthy());
        let max_retries = options
            .take("max_retries")
            .and_then(|v| v.as_i64())
            .map(|n| n.max(0) as u32)
            .unwrap_or(DEFAULT_MAX_RETRIES);

        Self {
            model,
            api_key,
            api_base,
            streaming,
            max_retries,
            extra: options,
        }
    }
}

/// Remove an option and render it as a string, whatever scalar it was.
pub(crate) fn take_string(options: &mut RoleOptions, key: &str) -> Option<String> {
    options.take(key).map(|v| v.to_string())
}
