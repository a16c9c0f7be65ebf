use thiserror::Error;

use crate::role::Role;

#[derive(Debug, Error)]
pub enum VireoError {
    #[error("unknown model role: {0}")]
    UnknownRole(String),

    #[error("invalid configuration for role {role}: expected a mapping, found {found}")]
    ConfigType { role: Role, found: String },

    #[error("no configuration found for model role {0} and no local server detected")]
    ConfigMissing(Role),

    #[error("config error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, VireoError>;
