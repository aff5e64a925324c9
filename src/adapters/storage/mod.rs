//! Storage adapters
//!
//! Backends implementing the StoragePort trait: the PostgreSQL driver used in
//! production and an in-memory store with the same read semantics.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PostgresDriver;
