use std::sync::Arc;

use log::{debug, o, warn, Logger};

use crate::collection::ReviewCollection;
use crate::errors::{CorruptionError, ReviewError};
use crate::migration::{self, Envelope, CURRENT_VERSION};
use crate::review::Review;
use crate::store::Store;

/// The key reviews are stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "wineReviews";

/// Appended to the key to find where unreadable values are set aside.
pub const SET_ASIDE_SUFFIX: &str = "corrupt";

/// Mirrors a [`ReviewCollection`] into a [`Store`] under one key.
///
/// The store is never authoritative: `save` overwrites whatever is
/// there with the full collection.
#[derive(Clone)]
pub struct ReviewStorage {
    store: Arc<dyn Store>,
    key: String,
    logger: Logger,
}

impl ReviewStorage {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>, logger: &Logger) -> Self {
        let key = key.into();
        let logger = logger.new(o!("storage_key" => key.clone()));

        ReviewStorage { store, key, logger }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored collection. Nothing stored is an empty
    /// collection; anything stored that can't be read as reviews, even
    /// after migration, is [`ReviewError::Corrupt`].
    pub fn load(&self) -> Result<ReviewCollection, ReviewError> {
        debug!(self.logger, "Loading reviews...");

        let raw = match self.store.get_item(&self.key)? {
            Some(raw) => raw,
            None => {
                debug!(self.logger, "No stored reviews");
                return Ok(ReviewCollection::new());
            }
        };

        let envelope = Envelope::parse(&raw)?;

        for m in migration::pending(envelope.version) {
            debug!(self.logger, "Migrating stored reviews"; "from_version" => m.from, "migration" => m.description);
        }

        let reviews = envelope
            .upgrade()?
            .reviews
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value::<Review>(record)
                    .map_err(|source| CorruptionError::MalformedReview { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(self.logger, "Loaded reviews"; "count" => reviews.len());

        Ok(ReviewCollection::from_stored(reviews)?)
    }

    /// Overwrites the stored value with the whole collection.
    pub fn save(&self, collection: &ReviewCollection) -> Result<(), ReviewError> {
        let envelope = Envelope {
            version: CURRENT_VERSION,
            reviews: collection.iter().collect::<Vec<&Review>>(),
        };

        let raw = serde_json::to_string(&envelope)
            .map_err(|source| CorruptionError::Malformed { source })?;

        self.store.set_item(&self.key, &raw)?;

        debug!(self.logger, "Saved reviews"; "count" => collection.len(), "bytes" => raw.len());

        Ok(())
    }

    /// Moves the stored value to the first free key of the form
    /// `<key>.corrupt`, `<key>.corrupt.1`, ... and returns that key.
    /// Earlier set-aside values are never replaced. Nothing stored is
    /// `None`.
    pub fn set_aside(&self) -> Result<Option<String>, ReviewError> {
        let raw = match self.store.get_item(&self.key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let mut backup = format!("{}.{}", self.key, SET_ASIDE_SUFFIX);
        let mut n = 0;

        while self.store.get_item(&backup)?.is_some() {
            n += 1;
            backup = format!("{}.{}.{}", self.key, SET_ASIDE_SUFFIX, n);
        }

        self.store.set_item(&backup, &raw)?;
        self.store.remove_item(&self.key)?;

        warn!(self.logger, "Set aside unreadable reviews"; "backup_key" => backup.as_str(), "bytes" => raw.len());

        Ok(Some(backup))
    }
}
