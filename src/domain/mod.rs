//! Domain layer - business logic and domain models
//!
//! This layer contains the indexing step and the entity model,
//! independent of infrastructure concerns like databases or RPC clients.

pub mod indexer;
pub mod models;

// Re-export commonly used items
pub use indexer::{IndexOutcome, Indexer};
pub use models::*;
