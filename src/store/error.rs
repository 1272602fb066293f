use std::path::PathBuf;

use thiserror::Error;

/// Failures of a string store operation.
///
/// Validation variants carry the exact message returned to HTTP clients.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("value cannot be empty")]
    EmptyValue,

    #[error("Key already exists")]
    KeyExists(String),

    #[error("Key and lang are required")]
    MissingKeyOrLang,

    #[error("Key cannot be empty")]
    EmptyKey,

    #[error("Language not found")]
    UnknownLanguage(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StoreError::Write { .. } | StoreError::Read { .. })
    }
}
