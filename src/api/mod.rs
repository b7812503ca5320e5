//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into [`crate::application::services::ShortenerService`]
//! calls and formats responses according to the API contract.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request processing middleware
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
