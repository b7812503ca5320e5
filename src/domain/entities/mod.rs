//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`UrlMapping`] - A persisted short code to URL mapping
//! - [`NewUrlMapping`] - Input for creating a mapping (no store-assigned id yet)

pub mod url_mapping;

pub use url_mapping::{NewUrlMapping, UrlMapping};
