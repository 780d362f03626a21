//! Shoebox Cart - shopping-cart state container for a headless storefront.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the authoritative in-memory cart and mediates every
//!   mutation through stock validation
//! - Collaborators are injected behind ports: [`StockOracle`] and [`Catalog`]
//!   for remote lookups, [`CartSlot`] for the persistent snapshot cell
//! - [`CartObserver`]s receive the new snapshot after each successful
//!   mutation and the failure kind after each failed one
//! - [`StorefrontApiClient`] is the production adapter for the stock and
//!   catalog endpoints; [`FileSlot`] mirrors the cart to a JSON file
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shoebox_cart::{CartConfig, CartStore, FileSlot, StorefrontApiClient, TracingNotifier};
//! use shoebox_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let api = Arc::new(StorefrontApiClient::new(&config.api)?);
//! let slot = Arc::new(FileSlot::new(&config.cart_path));
//!
//! let mut store = CartStore::new(api.clone(), api, slot);
//! store.subscribe(Arc::new(TracingNotifier));
//!
//! store.add_item(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod ports;
pub mod services;
pub mod slot;
pub mod store;

pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::CartError;
pub use models::{Cart, LineItem, Product, StockRecord};
pub use notify::TracingNotifier;
pub use ports::{Catalog, CartObserver, CartSlot, PortError, SlotError, StockOracle};
pub use services::{ApiError, StorefrontApiClient};
pub use slot::{FileSlot, MemorySlot};
pub use store::CartStore;
