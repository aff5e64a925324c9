//! Adapters layer - Infrastructure implementations
//!
//! This layer contains the infrastructure adapters that implement the port
//! traits defined in the core layer: storage backends and the chain RPC
//! provider.

pub mod pocket;
pub mod storage;

// Re-export commonly used adapters
pub use pocket::PocketProvider;
pub use storage::{MemoryStorage, PostgresDriver};
