use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The submission had no image reference.
    #[error("Please select an image")]
    MissingImage,

    /// The submission failed validation.
    #[error("Invalid review: {}", FieldList(.fields))]
    Invalid { fields: Vec<Field> },

    /// A review with the same ID is already in the collection.
    #[error("Duplicate review ID {0}")]
    DuplicateId(String),

    /// The stored collection could not be understood.
    #[error("Stored reviews are corrupt")]
    Corrupt {
        #[from]
        source: CorruptionError,
    },

    /// The storage medium failed.
    #[error("Storage error")]
    Store {
        #[from]
        source: StoreError,
    },

    /// The selected image could not be read.
    #[error("Could not read image {path:?}")]
    ImageRead { path: PathBuf, source: io::Error },

    /// The selected file is not an image.
    #[error("{path:?} is not an image (detected {mime_type})")]
    NotAnImage { path: PathBuf, mime_type: String },
}

/// Enumerates errors returned by the store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an I/O error from the underlying medium.
    #[error("Storage I/O error")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Represents a write that would exceed the medium's capacity.
    #[error("Storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Represents a key that cannot be mapped onto the medium.
    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Enumerates the ways a stored collection can be unreadable.
#[derive(Debug, Error)]
pub enum CorruptionError {
    /// The stored value is not JSON of the expected outer shape.
    #[error("Malformed stored value")]
    Malformed {
        #[from]
        source: serde_json::Error,
    },

    /// The stored value was written by a newer schema.
    #[error("Unsupported schema version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A record does not have the shape of a review.
    #[error("Malformed review at index {index}")]
    MalformedReview {
        index: usize,
        source: serde_json::Error,
    },

    /// Two stored records share an ID.
    #[error("Duplicate stored review ID {0}")]
    DuplicateId(String),
}

/// Enumerates errors in the process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Must define {0} environment variable")]
    Missing(&'static str),

    /// An environment variable is set but unusable.
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// A user-editable field of a review.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Name,
    Nickname,
    Rating,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Name => "name",
            Field::Nickname => "nickname",
            Field::Rating => "rating",
        };

        f.write_str(s)
    }
}

struct FieldList<'a>(&'a [Field]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{}", field)?;
        }

        Ok(())
    }
}
