//! Load-time schema evolution for stored reviews.
//!
//! The stored value is either a bare JSON array of reviews, as written
//! before the schema was versioned, or an envelope carrying a
//! `version` next to the `reviews`. Each [`Migration`] lifts records
//! from one version to the next; loading runs every migration from the
//! stored version up to [`CURRENT_VERSION`].
//!
//! New fields get a migration that backfills a default. Defaults are
//! applied here, at load time, and never when writing. Every migration
//! leaves already-migrated records untouched, so the whole chain runs on
//! every load: a record stored at the current version that still lacks
//! a default is repaired the same way a legacy one is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CorruptionError;
use crate::review::ANONYMOUS;

/// The version written by this build.
pub const CURRENT_VERSION: u32 = 2;

/// The implied version of a bare array.
pub const LEGACY_VERSION: u32 = 1;

/// A single step in the migration chain.
pub struct Migration {
    /// The version this step upgrades from.
    pub from: u32,

    /// What the step does, for logging.
    pub description: &'static str,

    step: fn(Map<String, Value>) -> Map<String, Value>,
}

impl Migration {
    /// Applies this step to each record. Records that aren't objects are
    /// passed through for deserialization to reject.
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        records
            .into_iter()
            .map(|record| match record {
                Value::Object(map) => Value::Object((self.step)(map)),
                other => other,
            })
            .collect()
    }
}

/// Every migration, oldest first.
pub static MIGRATIONS: &[Migration] = &[Migration {
    from: 1,
    description: "backfill missing nicknames",
    step: backfill_nickname,
}];

/// The stored value, split into its version and its raw records.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub reviews: Vec<T>,
}

impl Envelope<Value> {
    /// Parses a stored value in any known shape.
    pub fn parse(raw: &str) -> Result<Self, CorruptionError> {
        let value: Value = serde_json::from_str(raw)?;

        match value {
            Value::Array(reviews) => Ok(Envelope {
                version: LEGACY_VERSION,
                reviews,
            }),
            other => Ok(serde_json::from_value(other)?),
        }
    }

    /// Runs the migration chain, leaving the records at
    /// [`CURRENT_VERSION`].
    pub fn upgrade(self) -> Result<Self, CorruptionError> {
        if self.version > CURRENT_VERSION {
            return Err(CorruptionError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }

        let reviews = MIGRATIONS
            .iter()
            .fold(self.reviews, |records, m| m.apply(records));

        Ok(Envelope {
            version: CURRENT_VERSION,
            reviews,
        })
    }
}

/// The migrations that change the schema of records stored at
/// `version`.
pub fn pending(version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.from >= version)
}

/// Gives every record without a usable nickname the anonymous one.
fn backfill_nickname(mut record: Map<String, Value>) -> Map<String, Value> {
    let populated = matches!(record.get("nickname"), Some(Value::String(s)) if !s.is_empty());

    if !populated {
        record.insert("nickname".to_owned(), Value::String(ANONYMOUS.to_owned()));
    }

    record
}
