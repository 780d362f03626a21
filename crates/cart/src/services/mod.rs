//! External service clients.
//!
//! # Services
//!
//! - `storefront_api` - Stock and catalog lookups against the storefront
//!   REST API

pub mod storefront_api;

pub use storefront_api::{ApiError, StorefrontApiClient};
