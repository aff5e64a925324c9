//! Centralized error types for the indexer

use crate::domain::models::EntityKind;
use thiserror::Error;

/// Main indexer error type
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("no {kind} to index at height {height}")]
    NothingToIndex { kind: EntityKind, height: u64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid provider data for {address}: {reason}")]
    InvalidProviderData { address: String, reason: String },
}

impl IndexerError {
    /// True when a height had nothing to index and the caller should advance.
    pub fn is_nothing_to_index(&self) -> bool {
        matches!(self, IndexerError::NothingToIndex { .. })
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("malformed {column} in stored row: {reason}")]
    MalformedRow { column: &'static str, reason: String },

    /// Failure reported by a non-relational backend, passed through verbatim.
    #[error("{0}")]
    Backend(String),
}

/// Errors surfaced by the chain RPC provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("server error {status} on connection")]
    ServerError { status: u16 },

    #[error("request rejected with status {status}: {message}")]
    ClientError { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether the upstream answered with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ProviderError::ServerError { .. })
    }
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Result type alias for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Helper to convert sqlx errors
impl From<sqlx::Error> for IndexerError {
    fn from(err: sqlx::Error) -> Self {
        IndexerError::Storage(StorageError::Database(err))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
