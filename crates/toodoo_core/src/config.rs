//! Core configuration.
//!
//! # Responsibility
//! - Hold the deployment-tunable constants used by the stores.
//! - Validate values once, before a store is constructed.
//!
//! # Invariants
//! - `max_title_chars` is never zero.
//! - Persistence keys are non-empty and distinct.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default title bound, in chars.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 100;
/// Key holding the serialized task collection.
pub const DEFAULT_TASKS_KEY: &str = "todos";
/// Key holding the serialized user profile.
pub const DEFAULT_PROFILE_KEY: &str = "toodoo-user";
/// Minimum trimmed length accepted for an onboarding name.
pub const DEFAULT_MIN_USER_NAME_CHARS: usize = 2;

/// Tunables shared by `TaskStore`, `ProfileStore` and the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub max_title_chars: usize,
    pub tasks_key: String,
    pub profile_key: String,
    pub min_user_name_chars: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            tasks_key: DEFAULT_TASKS_KEY.to_string(),
            profile_key: DEFAULT_PROFILE_KEY.to_string(),
            min_user_name_chars: DEFAULT_MIN_USER_NAME_CHARS,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON config document. Absent fields keep their defaults.
    ///
    /// # Errors
    /// - Returns `ConfigError::Parse` on malformed JSON.
    /// - Returns the first validation error otherwise.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with a different title bound.
    pub fn with_max_title_chars(mut self, max_title_chars: usize) -> Self {
        self.max_title_chars = max_title_chars;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_title_chars == 0 {
            return Err(ConfigError::ZeroTitleBound);
        }
        if self.tasks_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey("tasks_key"));
        }
        if self.profile_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey("profile_key"));
        }
        if self.tasks_key == self.profile_key {
            return Err(ConfigError::SharedKey(self.tasks_key.clone()));
        }
        Ok(())
    }
}

/// Configuration rejected by [`CoreConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    ZeroTitleBound,
    EmptyKey(&'static str),
    SharedKey(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config document: {message}"),
            Self::ZeroTitleBound => write!(f, "max_title_chars must be greater than zero"),
            Self::EmptyKey(field) => write!(f, "{field} must not be empty"),
            Self::SharedKey(key) => {
                write!(f, "tasks_key and profile_key must differ, both are `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}
