//! Failure taxonomy for cart operations.

use thiserror::Error;

/// Failure kind reported by a cart operation.
///
/// Operations return exactly these kinds; the detailed cause (a failed
/// lookup, a decode error) is logged by the adapter that hit it and is not
/// part of the operation result. Every failure leaves the cart unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds the reported available stock.
    #[error("requested quantity exceeds available stock")]
    OutOfStock,

    /// Adding a product to the cart failed.
    #[error("failed to add product to cart")]
    AddFailed,

    /// The product to remove is not in the cart.
    #[error("failed to remove product from cart")]
    RemoveFailed,

    /// Updating a product's quantity failed.
    #[error("failed to update product quantity")]
    UpdateFailed,
}

impl CartError {
    /// Storefront-facing notification message for this failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Could not add the product to your cart",
            Self::RemoveFailed => "Could not remove the product from your cart",
            Self::UpdateFailed => "Could not update the product quantity",
        }
    }
}
