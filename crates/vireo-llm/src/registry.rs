use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use vireo_core::config::{load_config, merged_options};
use vireo_core::error::{Result, VireoError};
use vireo_core::Role;

use crate::factory::{resolve_client, ChatClient};
use crate::probe::EndpointProber;

/// Role-keyed client registry.
///
/// Construct one at startup and thread it through call sites; each role's
/// client is built at most once for the registry's lifetime and handed out
/// as the same `Arc` on every call.
pub struct ModelRegistry {
    config_path: PathBuf,
    prober: EndpointProber,
    cells: HashMap<Role, OnceCell<Arc<ChatClient>>>,
}

impl ModelRegistry {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self::with_prober(config_path, EndpointProber::from_env())
    }

    /// Registry with an injected prober (tests, fixed deployments).
    pub fn with_prober(config_path: impl Into<PathBuf>, prober: EndpointProber) -> Self {
        Self {
            config_path: config_path.into(),
            prober,
            cells: Role::ALL
                .iter()
                .map(|role| (*role, OnceCell::new()))
                .collect(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Client for `role`, building it on first use.
    ///
    /// Concurrent first callers await the same in-flight construction. A
    /// failed construction leaves the slot empty, so a later call retries.
    pub async fn get_client(&self, role: Role) -> Result<Arc<ChatClient>> {
        let cell = self
            .cells
            .get(&role)
            .ok_or_else(|| VireoError::UnknownRole(role.to_string()))?;

        cell.get_or_try_init(|| async {
            let client = resolve_client(&self.config_path, role, &self.prober).await?;
            info!(role = %role, provider = ?client.kind(), "chat client constructed");
            Ok(Arc::new(client))
        })
        .await
        .cloned()
    }

    /// Which model name is configured per role, from the file and the
    /// environment only — no probing, no default injection.
    ///
    /// Never fails: any internal problem is logged and an empty map is
    /// returned, so status listings cannot destabilize their callers.
    pub fn configured_models(&self) -> BTreeMap<Role, Vec<String>> {
        match self.try_configured_models() {
            Ok(models) => models,
            Err(e) => {
                warn!(error = %e, "failed to read model configuration");
                BTreeMap::new()
            }
        }
    }

    fn try_configured_models(&self) -> Result<BTreeMap<Role, Vec<String>>> {
        let doc = load_config(&self.config_path)?;
        let mut models: BTreeMap<Role, Vec<String>> = BTreeMap::new();

        for role in Role::ALL {
            let options = merged_options(&doc, role)?;
            if let Some(model) = options.get_str("model") {
                models.entry(role).or_default().push(model.to_string());
            }
        }

        Ok(models)
    }
}
