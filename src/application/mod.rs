//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::MappingStore`] trait and
//! provide the operation surface used by HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Short code allocation and resolution

pub mod services;
