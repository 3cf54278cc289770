//! SenVision Cart Core Library
//!
//! Shopping cart state, read model and simulated checkout for the SenVision
//! eyewear storefront.
//!
//! ## Overview
//!
//! The cart is a small ordered list of line items, unique by product id,
//! kept in sync with a key-value blob store (the browser's `localStorage`
//! on the real site). Every view of the cart (header badge, dropdown,
//! offcanvas panel, order summary) is rendered from a [`CartView`]
//! snapshot, so rendering never touches cart state.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use senvision_core::{Cart, CartStore, MemoryStore, Product, ToastBoard};
//!
//! let toasts = Arc::new(ToastBoard::default());
//! let mut cart = CartStore::open(MemoryStore::new(), toasts.clone());
//!
//! cart.add_item(&Product::new(1, "Ray-Ban Aviator", 85_000).with_promotion(15), 1);
//! println!("{} article(s), {}", cart.item_count(), senvision_core::format_amount(cart.total()));
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod notify;
pub mod schedule;
pub mod storage;
pub mod types;
pub mod view;

// Re-exports
pub use cart::{Cart, CartConfig, CartStore, SubscriptionId, DEFAULT_STORAGE_KEY};
pub use catalog::{Catalog, ListingCatalog};
pub use checkout::{
    CheckoutForm, CustomerDetails, LogOrderSink, OrderLine, OrderReceipt, OrderSink,
    OrderSummary,
};
pub use error::{CustomerField, ShopError, ShopResult};
pub use notify::{Celebration, NoCelebration, Notifier, Silent, Toast, ToastBoard};
pub use schedule::{Scheduler, TaskId};
pub use storage::{BlobStore, MemoryStore, RedbStore};
pub use types::*;
pub use view::{format_amount, render_all, render_view, CartView, LineView, RenderedCart};
