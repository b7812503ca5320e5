//! Domain layer containing business entities and the store contract.
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//!
//! # Architecture
//!
//! - [`entities`] - The URL mapping record and its creation input
//! - [`schema`] - Field formats shared by every store and the allocator
//! - [`repositories`] - The [`repositories::MappingStore`] trait implemented by
//!   `crate::infrastructure::persistence`
//!
//! # Shortening Flow
//!
//! 1. [`crate::application::services::ShortenerService`] validates the URL
//! 2. A candidate code is drawn and checked with [`repositories::MappingStore::exists`]
//! 3. The mapping is written with [`repositories::MappingStore::insert`]; the store's
//!    uniqueness constraint is the final guard against concurrent writers

pub mod entities;
pub mod repositories;
pub mod schema;
