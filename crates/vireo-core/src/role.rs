use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VireoError;

/// Purpose-bound slot a chat client fills.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reasoning,
    Basic,
    Vision,
    Code,
}

impl Role {
    /// Every role, in a fixed order.
    pub const ALL: [Role; 4] = [Role::Reasoning, Role::Basic, Role::Vision, Role::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reasoning => "reasoning",
            Role::Basic => "basic",
            Role::Vision => "vision",
            Role::Code => "code",
        }
    }

    /// Top-level key for this role in the configuration file.
    pub fn config_key(&self) -> &'static str {
        match self {
            Role::Reasoning => "REASONING_MODEL",
            Role::Basic => "BASIC_MODEL",
            Role::Vision => "VISION_MODEL",
            Role::Code => "CODE_MODEL",
        }
    }

    /// Prefix for per-role environment overrides (e.g. `BASIC_MODEL__api_key`).
    pub fn env_prefix(&self) -> String {
        format!("{}__", self.config_key())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = VireoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reasoning" => Ok(Role::Reasoning),
            "basic" => Ok(Role::Basic),
            "vision" => Ok(Role::Vision),
            "code" => Ok(Role::Code),
            other => Err(VireoError::UnknownRole(other.to_string())),
        }
    }
}
