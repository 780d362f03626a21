//! Ports through which the store reaches its collaborators.
//!
//! The store never talks to HTTP or the filesystem directly; it is handed
//! implementations of these traits at construction. Production adapters
//! live in [`services`](crate::services) and [`slot`](crate::slot).

use async_trait::async_trait;
use shoebox_core::ProductId;
use thiserror::Error;

use crate::error::CartError;
use crate::models::{Cart, Product, StockRecord};

/// Error returned by the remote lookup ports.
#[derive(Debug, Error)]
pub enum PortError {
    /// The product id does not resolve.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The backend failed (network, non-2xx, malformed body).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Read-only lookup of available quantity per product.
///
/// Queried on every add and quantity update; results are never cached.
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Fetch the current stock record for a product.
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, PortError>;
}

/// Read-only lookup of product metadata per product.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch catalog metadata for a product.
    async fn product(&self, product_id: ProductId) -> Result<Product, PortError>;
}

/// Error accessing the persistent snapshot slot.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Reading the cell failed.
    #[error("snapshot read failed: {0}")]
    Read(String),

    /// Writing the cell failed.
    #[error("snapshot write failed: {0}")]
    Write(String),
}

/// A single string-valued storage cell holding the serialized cart.
///
/// Implementations bind to one fixed key or path at construction. The store
/// calls `load` once at startup and overwrites the whole cell with `store`
/// after every successful mutation.
pub trait CartSlot: Send + Sync {
    /// Read the cell. `Ok(None)` means no snapshot has been written yet.
    fn load(&self) -> Result<Option<String>, SlotError>;

    /// Overwrite the cell with a new snapshot.
    fn store(&self, snapshot: &str) -> Result<(), SlotError>;
}

/// Callbacks invoked by the store after each operation.
pub trait CartObserver: Send + Sync {
    /// A mutation succeeded; `cart` is the new snapshot.
    fn cart_changed(&self, cart: &Cart);

    /// A mutation failed; the cart is unchanged.
    fn operation_failed(&self, error: &CartError);
}
