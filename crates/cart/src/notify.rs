//! Default observer that surfaces cart events through tracing.

use tracing::{debug, warn};

use crate::error::CartError;
use crate::models::Cart;
use crate::ports::CartObserver;

/// Observer that logs snapshot changes and maps each failure kind to its
/// storefront-facing message.
///
/// UIs supply their own observer to render notifications; this one is the
/// default wiring for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl CartObserver for TracingNotifier {
    fn cart_changed(&self, cart: &Cart) {
        debug!(
            items = cart.len(),
            quantity = cart.total_quantity(),
            "cart updated"
        );
    }

    fn operation_failed(&self, error: &CartError) {
        warn!("{}", error.user_message());
    }
}
