//! Configuration for one CLI invocation

use std::path::Path;

use jackup_core::{
    Config, ConfigResolver, JsonProfileStore, LockManager, ProfileSyncController,
};
use tracing::debug;

use crate::error::Result;

/// The resolved configuration and the collaborators built from it.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
}

impl Context {
    /// Load `explicit` if given, otherwise discover the config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let resolver = ConfigResolver::new();
        let config = match explicit {
            Some(path) => resolver.load(path)?,
            None => resolver.resolve()?,
        };
        debug!(
            config = %config.config_path.display(),
            dir = %config.dir.display(),
            "Resolved configuration"
        );
        Ok(Self { config })
    }

    pub fn store(&self) -> JsonProfileStore {
        JsonProfileStore::for_config(&self.config)
    }

    pub fn locks(&self) -> LockManager {
        LockManager::new(&self.config.dir)
    }

    pub fn controller(&self) -> ProfileSyncController {
        ProfileSyncController::from_config(&self.config)
    }
}
