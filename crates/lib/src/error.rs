use thiserror::Error;

/// Failures raised by a [`crate::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Reading key {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Writing key {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record at key {key}: {source}")]
    MalformedRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn read(key: &str, source: std::io::Error) -> Self {
        StoreError::Read {
            key: key.to_string(),
            source,
        }
    }

    pub fn write(key: &str, source: std::io::Error) -> Self {
        StoreError::Write {
            key: key.to_string(),
            source,
        }
    }

    pub fn malformed(key: &str, source: serde_json::Error) -> Self {
        StoreError::MalformedRecord {
            key: key.to_string(),
            source,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, StoreError::MalformedRecord { .. })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Raised when parsing one of the wire enums from an unknown string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
