//! The cart state container.
//!
//! [`CartStore`] owns the authoritative in-memory [`Cart`] and keeps it
//! mirrored to a persistent snapshot slot. Every mutation is validated
//! against the stock oracle before any state changes; failed operations
//! leave both the cart and the slot untouched.

use std::sync::Arc;

use shoebox_core::ProductId;
use tracing::warn;

use crate::error::CartError;
use crate::models::{Cart, LineItem};
use crate::ports::{Catalog, CartObserver, CartSlot, StockOracle};

/// Authoritative cart state, mirrored to a persistent slot.
///
/// Mutations run one at a time: methods take `&mut self` and the owner is
/// expected to serialize user-triggered operations, so no internal locking
/// is needed. Operations may suspend while awaiting the stock or catalog
/// lookup; they run to completion or failure, with no cancellation or
/// timeout policy of their own.
pub struct CartStore {
    cart: Cart,
    stock: Arc<dyn StockOracle>,
    catalog: Arc<dyn Catalog>,
    slot: Arc<dyn CartSlot>,
    observers: Vec<Arc<dyn CartObserver>>,
}

impl CartStore {
    /// Create a store, seeding the cart from the persistent slot.
    ///
    /// An absent snapshot yields an empty cart. An unreadable or unparsable
    /// snapshot is logged and discarded rather than failing construction.
    #[must_use]
    pub fn new(
        stock: Arc<dyn StockOracle>,
        catalog: Arc<dyn Catalog>,
        slot: Arc<dyn CartSlot>,
    ) -> Self {
        let cart = match slot.load() {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!("discarding unparsable cart snapshot: {e}");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!("failed to read cart snapshot: {e}");
                Cart::new()
            }
        };

        Self {
            cart,
            stock,
            catalog,
            slot,
            observers: Vec::new(),
        }
    }

    /// Register an observer for snapshot changes and operation failures.
    pub fn subscribe(&mut self, observer: Arc<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// The current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of a product to the cart.
    ///
    /// Increments the existing line item if the product is already in the
    /// cart, otherwise fetches catalog metadata and appends a new line with
    /// amount 1. The requested quantity is validated against the stock
    /// oracle first.
    ///
    /// # Errors
    ///
    /// `OutOfStock` when one more unit would exceed the available stock;
    /// `AddFailed` on any stock or catalog lookup failure. The cart is
    /// unchanged on every failure path.
    pub async fn add_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let current = self.cart.get(product_id).map_or(0, |line| line.amount);

        let available = match self.stock.stock(product_id).await {
            Ok(record) => record.amount,
            Err(e) => {
                warn!(product_id = %product_id, "stock lookup failed: {e}");
                return self.fail(CartError::AddFailed);
            }
        };

        let desired = current.saturating_add(1);
        if desired > available {
            return self.fail(CartError::OutOfStock);
        }

        let mut next = self.cart.clone();
        if let Some(line) = next.get_mut(product_id) {
            line.amount = desired;
        } else {
            let product = match self.catalog.product(product_id).await {
                Ok(product) => product,
                Err(e) => {
                    warn!(product_id = %product_id, "catalog lookup failed: {e}");
                    return self.fail(CartError::AddFailed);
                }
            };
            next.push(LineItem::new(product, 1));
        }

        self.commit(next);
        Ok(())
    }

    /// Remove a product's line item from the cart.
    ///
    /// # Errors
    ///
    /// `RemoveFailed` when the product is not in the cart.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if self.cart.get(product_id).is_none() {
            return self.fail(CartError::RemoveFailed);
        }

        let mut next = self.cart.clone();
        next.remove(product_id);
        self.commit(next);
        Ok(())
    }

    /// Set a product's quantity to exactly `amount`.
    ///
    /// Zero and negative amounts are ignored without error; callers route
    /// those to [`remove_item`](Self::remove_item) instead. An amount for a
    /// product that is not in the cart is also a silent no-op, with no
    /// stock lookup made.
    ///
    /// # Errors
    ///
    /// `OutOfStock` when `amount` exceeds the available stock;
    /// `UpdateFailed` on a stock lookup failure. The cart is unchanged on
    /// every failure path.
    pub async fn update_amount(
        &mut self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        if amount <= 0 {
            return Ok(());
        }
        if self.cart.get(product_id).is_none() {
            return Ok(());
        }

        let available = match self.stock.stock(product_id).await {
            Ok(record) => record.amount,
            Err(e) => {
                warn!(product_id = %product_id, "stock lookup failed: {e}");
                return self.fail(CartError::UpdateFailed);
            }
        };

        if amount > i64::from(available) {
            return self.fail(CartError::OutOfStock);
        }

        // amount is positive and bounded by available, so it fits in u32.
        let Ok(requested) = u32::try_from(amount) else {
            return self.fail(CartError::UpdateFailed);
        };

        let mut next = self.cart.clone();
        if let Some(line) = next.get_mut(product_id) {
            line.amount = requested;
        }
        self.commit(next);
        Ok(())
    }

    /// Publish a new cart: swap it in, mirror it to the slot, notify
    /// observers.
    ///
    /// A slot write failure does not roll back the in-memory cart; the
    /// failure is logged and the next successful mutation rewrites the
    /// whole snapshot.
    fn commit(&mut self, next: Cart) {
        self.cart = next;

        match serde_json::to_string(&self.cart) {
            Ok(snapshot) => {
                if let Err(e) = self.slot.store(&snapshot) {
                    warn!("failed to persist cart snapshot: {e}");
                }
            }
            Err(e) => warn!("failed to serialize cart snapshot: {e}"),
        }

        for observer in &self.observers {
            observer.cart_changed(&self.cart);
        }
    }

    fn fail(&self, error: CartError) -> Result<(), CartError> {
        for observer in &self.observers {
            observer.operation_failed(&error);
        }
        Err(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shoebox_core::{CurrencyCode, Price};

    use super::*;
    use crate::models::{Product, StockRecord};
    use crate::ports::PortError;
    use crate::slot::MemorySlot;

    struct FakeStock {
        levels: HashMap<i32, u32>,
        fail: bool,
        calls: AtomicU32,
    }

    impl FakeStock {
        fn with_levels(levels: &[(i32, u32)]) -> Self {
            Self {
                levels: levels.iter().copied().collect(),
                fail: false,
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                levels: HashMap::new(),
                fail: true,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StockOracle for FakeStock {
        async fn stock(&self, product_id: ProductId) -> Result<StockRecord, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Backend("stock endpoint unreachable".into()));
            }
            self.levels
                .get(&product_id.as_i32())
                .map(|&amount| StockRecord {
                    id: product_id,
                    amount,
                })
                .ok_or(PortError::NotFound(product_id))
        }
    }

    struct FakeCatalog {
        fail: bool,
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn product(&self, product_id: ProductId) -> Result<Product, PortError> {
            if self.fail {
                return Err(PortError::Backend("catalog endpoint unreachable".into()));
            }
            Ok(Product {
                id: product_id,
                title: format!("Sneaker {product_id}"),
                price: Price::new(Decimal::new(1999, 2), CurrencyCode::USD),
                image_url: None,
            })
        }
    }

    #[derive(Default)]
    struct Recording {
        changes: Mutex<Vec<Cart>>,
        failures: Mutex<Vec<CartError>>,
    }

    impl CartObserver for Recording {
        fn cart_changed(&self, cart: &Cart) {
            self.changes.lock().unwrap().push(cart.clone());
        }

        fn operation_failed(&self, error: &CartError) {
            self.failures.lock().unwrap().push(*error);
        }
    }

    struct Harness {
        store: CartStore,
        stock: Arc<FakeStock>,
        slot: Arc<MemorySlot>,
        observer: Arc<Recording>,
    }

    fn harness(levels: &[(i32, u32)]) -> Harness {
        harness_with(
            Arc::new(FakeStock::with_levels(levels)),
            Arc::new(FakeCatalog { fail: false }),
            Arc::new(MemorySlot::new()),
        )
    }

    fn harness_with(
        stock: Arc<FakeStock>,
        catalog: Arc<FakeCatalog>,
        slot: Arc<MemorySlot>,
    ) -> Harness {
        let mut store = CartStore::new(stock.clone(), catalog, slot.clone());
        let observer = Arc::new(Recording::default());
        store.subscribe(observer.clone());
        Harness {
            store,
            stock,
            slot,
            observer,
        }
    }

    fn id(raw: i32) -> ProductId {
        ProductId::new(raw)
    }

    fn persisted(slot: &MemorySlot) -> Cart {
        serde_json::from_str(&slot.snapshot().expect("snapshot written")).unwrap()
    }

    #[tokio::test]
    async fn test_add_new_item_appends_with_amount_one() {
        let mut h = harness(&[(1, 5)]);

        h.store.add_item(id(1)).await.unwrap();

        let items = h.store.cart().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id(1));
        assert_eq!(items[0].amount, 1);
    }

    #[tokio::test]
    async fn test_add_existing_item_increments_only_that_line() {
        let mut h = harness(&[(1, 10), (2, 10)]);
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(2)).await.unwrap();

        h.store.add_item(id(1)).await.unwrap();

        assert_eq!(h.store.cart().get(id(1)).unwrap().amount, 2);
        assert_eq!(h.store.cart().get(id(2)).unwrap().amount, 1);
        assert_eq!(h.store.cart().len(), 2);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_fails_out_of_stock() {
        let mut h = harness(&[(1, 2)]);
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(1)).await.unwrap();

        let result = h.store.add_item(id(1)).await;

        assert_eq!(result, Err(CartError::OutOfStock));
        assert_eq!(h.store.cart().get(id(1)).unwrap().amount, 2);
        assert_eq!(
            h.observer.failures.lock().unwrap().as_slice(),
            &[CartError::OutOfStock]
        );
    }

    #[tokio::test]
    async fn test_add_new_item_with_zero_stock_fails_out_of_stock() {
        let mut h = harness(&[(1, 0)]);

        let result = h.store.add_item(id(1)).await;

        assert_eq!(result, Err(CartError::OutOfStock));
        assert!(h.store.cart().is_empty());
        assert!(h.slot.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_add_with_stock_failure_fails_add() {
        let mut h = harness_with(
            Arc::new(FakeStock::failing()),
            Arc::new(FakeCatalog { fail: false }),
            Arc::new(MemorySlot::new()),
        );

        let result = h.store.add_item(id(1)).await;

        assert_eq!(result, Err(CartError::AddFailed));
        assert!(h.store.cart().is_empty());
        assert!(h.slot.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_add_with_catalog_failure_fails_add_without_partial_state() {
        let mut h = harness_with(
            Arc::new(FakeStock::with_levels(&[(1, 5)])),
            Arc::new(FakeCatalog { fail: true }),
            Arc::new(MemorySlot::new()),
        );

        let result = h.store.add_item(id(1)).await;

        assert_eq!(result, Err(CartError::AddFailed));
        assert!(h.store.cart().is_empty());
        assert!(h.slot.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails_add() {
        let mut h = harness(&[(1, 5)]);

        let result = h.store.add_item(id(99)).await;

        assert_eq!(result, Err(CartError::AddFailed));
        assert!(h.store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_present_item_preserves_order_and_fields() {
        let mut h = harness(&[(1, 10), (2, 10), (3, 10)]);
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(2)).await.unwrap();
        h.store.add_item(id(3)).await.unwrap();
        h.store.add_item(id(3)).await.unwrap();

        h.store.remove_item(id(2)).unwrap();

        let ids: Vec<i32> = h.store.cart().items().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(h.store.cart().get(id(3)).unwrap().amount, 2);
    }

    #[tokio::test]
    async fn test_remove_absent_item_fails_remove() {
        let mut h = harness(&[(1, 5)]);
        h.store.add_item(id(1)).await.unwrap();
        let before = h.store.cart().clone();

        let result = h.store.remove_item(id(7));

        assert_eq!(result, Err(CartError::RemoveFailed));
        assert_eq!(h.store.cart(), &before);
        assert_eq!(
            h.observer.failures.lock().unwrap().as_slice(),
            &[CartError::RemoveFailed]
        );
    }

    #[tokio::test]
    async fn test_update_zero_and_negative_amounts_are_noops() {
        let mut h = harness(&[(1, 5)]);
        h.store.add_item(id(1)).await.unwrap();
        let calls_before = h.stock.calls();

        h.store.update_amount(id(1), 0).await.unwrap();
        h.store.update_amount(id(1), -5).await.unwrap();

        assert_eq!(h.store.cart().get(id(1)).unwrap().amount, 1);
        // No stock lookup is made for ignored amounts.
        assert_eq!(h.stock.calls(), calls_before);
        assert!(h.observer.failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_absent_item_is_noop_without_stock_lookup() {
        let mut h = harness(&[(1, 5)]);
        let calls_before = h.stock.calls();

        h.store.update_amount(id(9), 3).await.unwrap();

        assert!(h.store.cart().is_empty());
        assert_eq!(h.stock.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_update_sets_amount_absolutely() {
        let mut h = harness(&[(1, 10), (2, 10)]);
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(2)).await.unwrap();

        h.store.update_amount(id(1), 7).await.unwrap();

        assert_eq!(h.store.cart().get(id(1)).unwrap().amount, 7);
        assert_eq!(h.store.cart().get(id(2)).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_fails_out_of_stock() {
        let mut h = harness(&[(1, 4)]);
        h.store.add_item(id(1)).await.unwrap();

        let result = h.store.update_amount(id(1), 5).await;

        assert_eq!(result, Err(CartError::OutOfStock));
        assert_eq!(h.store.cart().get(id(1)).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_update_with_stock_failure_fails_update() {
        let stock = Arc::new(FakeStock::with_levels(&[(1, 5)]));
        let slot = Arc::new(MemorySlot::new());
        let mut h = harness_with(stock, Arc::new(FakeCatalog { fail: false }), slot);
        h.store.add_item(id(1)).await.unwrap();

        // Swap in a failing oracle by rebuilding the store over the same slot.
        let mut store = CartStore::new(
            Arc::new(FakeStock::failing()),
            Arc::new(FakeCatalog { fail: false }),
            h.slot.clone(),
        );

        let result = store.update_amount(id(1), 2).await;

        assert_eq!(result, Err(CartError::UpdateFailed));
        assert_eq!(store.cart().get(id(1)).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_successful_mutations_persist_snapshot() {
        let mut h = harness(&[(1, 10), (2, 10)]);

        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(2)).await.unwrap();
        h.store.update_amount(id(1), 4).await.unwrap();

        assert_eq!(&persisted(&h.slot), h.store.cart());

        h.store.remove_item(id(1)).unwrap();
        assert_eq!(&persisted(&h.slot), h.store.cart());
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_rewrite_snapshot() {
        let mut h = harness(&[(1, 1)]);
        h.store.add_item(id(1)).await.unwrap();
        let snapshot_before = h.slot.snapshot();

        let _ = h.store.add_item(id(1)).await;

        assert_eq!(h.slot.snapshot(), snapshot_before);
    }

    #[tokio::test]
    async fn test_store_seeds_cart_from_slot() {
        let h = {
            let mut h = harness(&[(1, 10)]);
            h.store.add_item(id(1)).await.unwrap();
            h.store.add_item(id(1)).await.unwrap();
            h
        };

        let reloaded = CartStore::new(
            Arc::new(FakeStock::with_levels(&[(1, 10)])),
            Arc::new(FakeCatalog { fail: false }),
            h.slot.clone(),
        );

        assert_eq!(reloaded.cart(), h.store.cart());
    }

    #[tokio::test]
    async fn test_store_starts_empty_on_corrupt_snapshot() {
        let slot = Arc::new(MemorySlot::with_value("not json"));

        let store = CartStore::new(
            Arc::new(FakeStock::with_levels(&[])),
            Arc::new(FakeCatalog { fail: false }),
            slot,
        );

        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_observers_receive_each_new_snapshot() {
        let mut h = harness(&[(1, 10)]);

        h.store.add_item(id(1)).await.unwrap();
        h.store.add_item(id(1)).await.unwrap();

        let changes = h.observer.changes.lock().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].get(id(1)).unwrap().amount, 1);
        assert_eq!(changes[1].get(id(1)).unwrap().amount, 2);
    }

    // Scenario from the storefront acceptance list: an empty cart and a
    // stock of 5 for product 1.
    #[tokio::test]
    async fn test_scenario_first_add() {
        let mut h = harness(&[(1, 5)]);

        h.store.add_item(id(1)).await.unwrap();

        let items = h.store.cart().items();
        assert_eq!(items.len(), 1);
        assert_eq!((items[0].id, items[0].amount), (id(1), 1));
    }
}
