//! Core domain abstractions and types
//!
//! This module contains the ports, query types and error definitions the
//! indexer is built on. It is independent of any specific database or RPC
//! transport.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{IndexerError, IndexerResult, ProviderError, ProviderResult, StorageError};
pub use traits::{EntityProvider, StoragePort};
pub use types::{
    CountOptions, Page, ReadByAddressOptions, ReadListOptions, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
