//! Mapping store implementations.
//!
//! # Stores
//!
//! - [`PgMappingStore`] - PostgreSQL-backed store with schema-level constraints
//! - [`MemoryMappingStore`] - In-process store with the same guarantees, for tests and tooling

pub mod memory_mapping_store;
pub mod pg_mapping_store;

pub use memory_mapping_store::MemoryMappingStore;
pub use pg_mapping_store::PgMappingStore;
