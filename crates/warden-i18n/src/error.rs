use std::fmt;

use thiserror::Error;

/// Errors produced by the i18n subsystem.
///
/// The resolution path never propagates these to callers of `message` /
/// `plural` — it always returns some string. The `get_*` variants surface
/// the first error alongside the best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I18nError {
    #[error("message key cannot be empty")]
    EmptyKey,

    #[error("message default text cannot be empty for key '{0}'")]
    EmptyDefault(String),

    #[error("message key '{0}' is already registered")]
    DuplicateKey(String),

    #[error("invalid YAML in locale file '{file}': {reason}")]
    InvalidYaml { file: String, reason: String },

    #[error("failed to read locale file '{0}'")]
    FileRead(String),

    #[error("locale '{0}' not found")]
    LocaleNotFound(String),

    #[error("locale manager not initialized")]
    ManagerNotInit,

    #[error("locale manager already initialized with different arguments")]
    AlreadyInitialized,

    #[error("translation key '{key}' not found in '{lang}'")]
    KeyNotFound { key: String, lang: String },

    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("unexpected parameter '{0}'")]
    ExtraParameter(String),

    #[error("no plural form available for key '{0}'")]
    PluralMissing(String),

    #[error("recursive fallback chain detected for language '{0}'")]
    RecursiveFallback(String),
}

/// A single locale file that failed to load.
///
/// Non-strict loading collects these and carries on; strict loading aborts
/// at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub file: String,
    pub error: I18nError,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load locale file {}: {}", self.file, self.error)
    }
}
