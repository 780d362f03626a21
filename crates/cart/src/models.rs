//! Cart domain model: products, line items, and the cart itself.
//!
//! The persisted snapshot format is a JSON array of [`LineItem`] objects
//! with all fields included; serializing and reloading a [`Cart`]
//! reproduces the same ids, amounts, and order.

use serde::{Deserialize, Serialize};
use shoebox_core::{CurrencyCode, Price, ProductId};

/// Product metadata as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Primary image URL.
    pub image_url: Option<String>,
}

/// One product and its requested quantity in the cart.
///
/// Product metadata is flattened into the line item so the persisted
/// snapshot is self-contained. At most one line item exists per product id
/// within a cart, and `amount` is at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Requested quantity.
    pub amount: u32,
}

impl LineItem {
    /// Create a line item from catalog metadata and a quantity.
    #[must_use]
    pub fn new(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image_url: product.image_url,
            amount,
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Available stock for a product as reported by the stock endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Catalog product ID.
    pub id: ProductId,
    /// Quantity available for new orders.
    pub amount: u32,
}

/// The ordered collection of line items for the current session.
///
/// Insertion order is the order items were added and is preserved across
/// mutations and snapshot round-trips. The cart is owned exclusively by
/// [`CartStore`](crate::CartStore); everything else sees read-only
/// snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// All line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up the line item for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id == product_id)
    }

    pub(crate) fn get_mut(&mut self, product_id: ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.id == product_id)
    }

    pub(crate) fn push(&mut self, line: LineItem) {
        self.items.push(line);
    }

    /// Remove the line item for a product, preserving the order of all
    /// others. Returns whether a line was removed.
    pub(crate) fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != product_id);
        self.items.len() != before
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|line| line.amount).sum()
    }

    /// Sum of all line totals. All items in a cart share one currency; an
    /// empty cart reports a zero subtotal in the default currency.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |line| line.price.currency_code);
        let amount = self
            .items
            .iter()
            .map(|line| line.line_total().amount)
            .sum();
        Price::new(amount, currency)
    }
}
