use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    store::{FieldSchemaStore, FileStorage, KeyValueStorage},
    validation::init_pattern_cache,
};

#[derive(Clone)]
pub struct AppState {
    /// Serializes schema operations so each request's read-modify-write runs
    /// to completion before the next one starts
    pub store: Arc<Mutex<FieldSchemaStore>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.storage.dir).map_err(|err| {
            anyhow::anyhow!(
                "cannot create storage directory {}: {}",
                config.storage.dir.display(),
                err
            )
        })?;
        let storage = Arc::new(FileStorage::new(config.storage.dir.clone()));
        Ok(Self::with_storage(config, storage))
    }

    /// State backed by an arbitrary storage collaborator
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStorage>) -> Self {
        init_pattern_cache(config.validation.pattern_cache_capacity);
        Self {
            store: Arc::new(Mutex::new(FieldSchemaStore::new(storage))),
            config,
        }
    }
}
