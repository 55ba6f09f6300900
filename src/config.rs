use std::env;
use std::path::PathBuf;

use crate::errors::ConfigError;
use crate::persistence::DEFAULT_KEY;

pub const DATA_DIR_VARIABLE: &str = "VINO_DATA_DIR";
pub const STORAGE_KEY_VARIABLE: &str = "VINO_STORAGE_KEY";

/// Returns the value of the named environment variable if it exists.
pub fn get_variable(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Returns the value of the named environment variable, or `None` if
/// it isn't set or is blank.
pub fn get_optional_variable(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Settings for a journal, read from the environment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The directory standing in for the browser's storage origin.
    pub(crate) data_dir: PathBuf,

    /// The key the reviews are stored under.
    pub(crate) storage_key: String,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, storage_key: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage_key: storage_key.into(),
        }
    }

    /// Reads the configuration. Call `dotenv::dotenv()` first to pick up
    /// a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = get_variable(DATA_DIR_VARIABLE)?;

        if data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: DATA_DIR_VARIABLE,
                reason: "must not be blank".to_owned(),
            });
        }

        let storage_key =
            get_optional_variable(STORAGE_KEY_VARIABLE).unwrap_or_else(|| DEFAULT_KEY.to_owned());

        Ok(Config::new(data_dir, storage_key))
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}
