//! Pocket Indexer Library
//!
//! Synchronizes chain state into PostgreSQL one block height at a time and
//! serves height-scoped, paginated reads of the indexed entities.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;

// Re-export commonly used types
pub use crate::adapters::{MemoryStorage, PocketProvider, PostgresDriver};
pub use crate::config::IndexerConfig;
pub use crate::core::{
    CountOptions, EntityProvider, IndexerError, IndexerResult, Page, ProviderError,
    ReadByAddressOptions, ReadListOptions, StorageError, StoragePort,
};
pub use crate::domain::{IndexOutcome, Indexer};
pub use crate::domain::models::{
    validate_address, Account, AccountType, App, Balance, EntityKind, ProviderAccount,
    ProviderApp,
};
