//! Store trait definitions for the domain layer.
//!
//! The [`MappingStore`] trait abstracts persistence of URL mappings. Implementations
//! live in `crate::infrastructure::persistence`; a `mockall` mock is generated for
//! unit tests.
//!
//! # Testing
//!
//! See `tests/repository_mapping.rs` for the PostgreSQL contract tests.

pub mod mapping_store;

pub use mapping_store::MappingStore;

#[cfg(test)]
pub use mapping_store::MockMappingStore;
