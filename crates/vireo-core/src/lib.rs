pub mod config;
pub mod error;
pub mod role;

pub use config::{load_config, merged_options, ConfigDoc, OptionValue, RoleOptions};
pub use error::{Result, VireoError};
pub use role::Role;
