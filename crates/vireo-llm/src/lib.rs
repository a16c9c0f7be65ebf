pub mod factory;
pub mod probe;
pub mod providers;
pub mod registry;

pub use factory::{resolve_client, ChatClient, ProviderKind, SelectContext};
pub use probe::EndpointProber;
pub use providers::{
    AzureClient, ClientConfig, DashscopeClient, DeepSeekClient, OpenAiCompatibleClient,
};
pub use registry::ModelRegistry;
