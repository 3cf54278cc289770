//! The shopping cart store.
//!
//! [`CartStore`] owns the ordered line items, mirrors them into a
//! [`BlobStore`] after every change (write-through), tells subscribed views
//! to re-render, and runs the checkout:
//!
//! ```text
//! Idle ─▶ Validating ─┬─▶ Rejected ─▶ Idle         (cart unchanged)
//!                     └─▶ Accepted ─▶ Cleared ─▶ Idle
//! ```
//!
//! Persistence problems never surface as errors: an unreadable cart loads
//! as empty and a failed write is logged and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::catalog::Catalog;
use crate::checkout::{CheckoutForm, OrderReceipt, OrderSink, OrderSummary};
use crate::error::{ShopError, ShopResult};
use crate::notify::{Celebration, Notifier};
use crate::schedule::Scheduler;
use crate::storage::BlobStore;
use crate::types::{LineItem, Product, ProductId, MAX_DISCOUNT_PERCENT};
use crate::view::CartView;

/// Key the cart is persisted under
pub const DEFAULT_STORAGE_KEY: &str = "senvision-cart";

/// Delay between an accepted checkout and its confirmation message
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_millis(500);

const REMOVED_MESSAGE: &str = "Produit retiré du panier";
const CLEARED_MESSAGE: &str = "Panier vidé";

/// Cart store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub storage_key: String,
    pub confirmation_delay: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            confirmation_delay: DEFAULT_CONFIRMATION_DELAY,
        }
    }
}

/// Cart operations shared by the real store and test doubles
pub trait Cart {
    /// Line items in insertion order
    fn items(&self) -> &[LineItem];

    /// Add one unit of `product`.
    ///
    /// The `quantity` argument is accepted but not applied: a new product
    /// starts at 1 and an existing one goes up by exactly 1. Returns the
    /// product's resulting quantity.
    fn add_item(&mut self, product: &Product, quantity: u32) -> u32;

    /// Drop the product's line; unknown ids are ignored
    fn remove_item(&mut self, id: &ProductId);

    /// Set a line's quantity; anything below 1 removes the line
    fn set_quantity(&mut self, id: &ProductId, quantity: i64);

    fn clear(&mut self);

    fn contains(&self, id: &ProductId) -> bool {
        self.items().iter().any(|i| &i.id == id)
    }

    fn quantity_of(&self, id: &ProductId) -> Option<u32> {
        self.items().iter().find(|i| &i.id == id).map(|i| i.quantity)
    }

    /// Canonical per-unit price of a line
    fn effective_price(&self, item: &LineItem) -> f64 {
        item.effective_price()
    }

    fn total(&self) -> f64 {
        self.items()
            .iter()
            .map(|i| self.effective_price(i) * f64::from(i.quantity))
            .sum()
    }

    /// Sum of quantities, not the number of distinct products
    fn item_count(&self) -> u64 {
        self.items().iter().map(|i| u64::from(i.quantity)).sum()
    }

    fn view(&self) -> CartView {
        CartView::from_items(self.items())
    }
}

/// Handle returned by [`CartStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ViewCallback = Box<dyn FnMut(&CartView)>;

/// Authoritative cart for one page session
pub struct CartStore<S: BlobStore> {
    items: Vec<LineItem>,
    store: S,
    config: CartConfig,
    notifier: Arc<dyn Notifier>,
    subscribers: Vec<(SubscriptionId, ViewCallback)>,
    next_subscription: u64,
    confirmations: Scheduler<OrderSummary>,
}

impl<S: BlobStore> CartStore<S> {
    /// Load the cart from `store` with default settings
    pub fn open(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, CartConfig::default())
    }

    pub fn with_config(store: S, notifier: Arc<dyn Notifier>, config: CartConfig) -> Self {
        let items = load_items(&store, &config.storage_key);
        tracing::debug!(lines = items.len(), key = %config.storage_key, "cart loaded");

        Self {
            items,
            store,
            config,
            notifier,
            subscribers: Vec::new(),
            next_subscription: 0,
            confirmations: Scheduler::new(),
        }
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The persisted form: a JSON array of line items
    pub fn to_json(&self) -> ShopResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Register a view callback.
    ///
    /// The callback runs immediately with the current view, then after
    /// every change.
    pub fn subscribe(&mut self, mut callback: impl FnMut(&CartView) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        callback(&self.view());
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Add a product by id, looking it up in `catalog`
    pub fn add_from_catalog<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        id: &ProductId,
    ) -> ShopResult<u32> {
        let product = catalog
            .find_by_id(id)
            .ok_or_else(|| ShopError::ProductNotFound(id.to_string()))?;
        Ok(self.add_item(&product, 1))
    }

    /// Open the order summary; refuses an empty cart
    pub fn begin_checkout(&self) -> ShopResult<CartView> {
        if self.items.is_empty() {
            self.notifier.notify(&ShopError::EmptyCart.to_string());
            return Err(ShopError::EmptyCart);
        }
        Ok(self.view())
    }

    /// Place the order.
    ///
    /// On success the order has been handed to `sink`, the cart is empty
    /// (in memory and in storage), `form` is reset, and the confirmation
    /// message is scheduled `confirmation_delay` from now. On any error the
    /// cart and the form are left as they were.
    pub fn checkout(
        &mut self,
        form: &mut CheckoutForm,
        sink: &dyn OrderSink,
        celebration: &dyn Celebration,
    ) -> ShopResult<OrderReceipt> {
        self.begin_checkout()?;

        tracing::debug!("checkout validating");
        let customer = match form.validate() {
            Ok(customer) => customer,
            Err(err) => {
                tracing::debug!(error = %err, "checkout rejected");
                return Err(err);
            }
        };

        let summary = OrderSummary::build(&self.items, customer, Local::now());
        if let Err(err) = sink.submit(&summary) {
            tracing::warn!(error = %err, "order submission failed");
            return Err(err);
        }
        tracing::info!(
            lines = summary.lines.len(),
            total = summary.total,
            "checkout accepted"
        );

        celebration.celebrate();
        self.clear();
        form.reset();

        let confirmation = self
            .confirmations
            .schedule(self.config.confirmation_delay, summary.clone());
        Ok(OrderReceipt {
            summary,
            confirmation,
        })
    }

    /// Advance virtual time; returns the orders whose confirmation is due
    pub fn advance(&mut self, by: Duration) -> Vec<OrderSummary> {
        self.confirmations.advance(by)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.confirmations.next_deadline()
    }

    pub fn cancel_confirmation(&mut self, receipt: &OrderReceipt) -> bool {
        self.confirmations.cancel(receipt.confirmation).is_some()
    }

    /// Cancel all deferred work, as on page unload
    pub fn teardown(&mut self) -> usize {
        let cancelled = self.confirmations.cancel_all();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cart torn down with pending confirmations");
        }
        cancelled
    }

    fn persist(&self) {
        let json = match self.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize cart");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.config.storage_key, &json) {
            tracing::warn!(error = %err, key = %self.config.storage_key, "failed to persist cart");
        }
    }

    fn refresh(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let view = self.view();
        for (_, callback) in &mut self.subscribers {
            callback(&view);
        }
    }

    /// Persist, then re-render
    fn commit(&mut self) {
        self.persist();
        self.refresh();
    }
}

impl<S: BlobStore> Cart for CartStore<S> {
    fn items(&self) -> &[LineItem] {
        &self.items
    }

    fn add_item(&mut self, product: &Product, _quantity: u32) -> u32 {
        let quantity = match self.items.iter_mut().find(|i| i.id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                item.quantity
            }
            None => {
                self.items.push(LineItem::from_product(product));
                1
            }
        };
        tracing::debug!(id = %product.id, quantity, "item added");

        self.commit();
        self.notifier
            .notify(&format!("{} ajouté au panier", product.name));
        quantity
    }

    fn remove_item(&mut self, id: &ProductId) {
        self.items.retain(|i| &i.id != id);
        tracing::debug!(%id, "item removed");

        self.commit();
        self.notifier.notify(REMOVED_MESSAGE);
    }

    fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove_item(id);
            return;
        }

        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            return;
        };
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        tracing::debug!(%id, quantity = item.quantity, "quantity updated");

        self.commit();
    }

    fn clear(&mut self) {
        self.items.clear();
        tracing::debug!("cart cleared");

        self.commit();
        self.notifier.notify(CLEARED_MESSAGE);
    }
}

/// Read the persisted cart, falling back to empty on any problem
fn load_items<S: BlobStore>(store: &S, key: &str) -> Vec<LineItem> {
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, key, "cart storage unreadable, starting empty");
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&json) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, key, "persisted cart is corrupt, starting empty");
            return Vec::new();
        }
    };

    let raw = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<LineItem>(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(error = %err, index, "dropping unreadable persisted line");
                None
            }
        })
        .collect();
    sanitize(raw)
}

/// Re-establish the cart invariants on data read from storage
fn sanitize(raw: Vec<LineItem>) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::with_capacity(raw.len());
    for mut item in raw {
        if item.quantity < 1 {
            tracing::warn!(id = %item.id, "dropping persisted line with zero quantity");
            continue;
        }
        if items.iter().any(|i| i.id == item.id) {
            tracing::warn!(id = %item.id, "dropping duplicate persisted line");
            continue;
        }
        item.discount_percent = item.discount_percent.min(MAX_DISCOUNT_PERCENT);
        items.push(item);
    }
    items
}
