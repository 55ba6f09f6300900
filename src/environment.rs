use std::sync::Arc;

use log::Logger;

use crate::config::Config;
use crate::errors::StoreError;
use crate::journal::Journal;
use crate::persistence::ReviewStorage;
use crate::store::{FileStore, Store};

/// Everything a running journal needs from the outside world.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: Arc<dyn Store>,
    pub config: Config,
}

impl Environment {
    pub fn new(logger: Arc<Logger>, store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            logger,
            store,
            config,
        }
    }

    /// Creates an environment backed by files in the configured data
    /// directory.
    pub fn with_file_store(logger: Arc<Logger>, config: Config) -> Result<Self, StoreError> {
        let store = Arc::new(FileStore::new(config.data_dir().clone())?);

        Ok(Self::new(logger, store, config))
    }

    pub fn storage(&self) -> ReviewStorage {
        ReviewStorage::new(self.store.clone(), self.config.storage_key(), &self.logger)
    }

    /// Loads the journal this environment points at.
    pub fn open_journal(&self) -> Journal {
        Journal::open(self.storage(), &self.logger)
    }
}
