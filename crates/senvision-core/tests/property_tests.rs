//! Property-based tests for CartStore operations
//!
//! Uses proptest to verify the cart invariants hold under arbitrary
//! sequences of user actions.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use senvision_core::{
    Cart, CartStore, LineItem, MemoryStore, Product, ProductId, Silent, DEFAULT_STORAGE_KEY,
};

// ============================================================================
// Strategy Generators
// ============================================================================

/// Catalog products with small ids so sequences revisit the same product
fn product_strategy() -> impl Strategy<Value = Product> {
    (0i64..8, 0u64..200_000, 0u8..=100, "[a-zA-Z ]{1,20}").prop_map(
        |(id, price, promotion, name)| Product::new(id, name, price).with_promotion(promotion),
    )
}

/// Operations a shopper can perform on the cart
#[derive(Debug, Clone)]
enum CartOp {
    Add(Product, u32),
    Remove(i64),
    SetQuantity(i64, i64),
    Clear,
}

fn cart_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<CartOp>> {
    prop::collection::vec(
        prop_oneof![
            4 => (product_strategy(), 1u32..10).prop_map(|(p, q)| CartOp::Add(p, q)),
            1 => (0i64..8).prop_map(CartOp::Remove),
            2 => (0i64..8, -2i64..20).prop_map(|(id, q)| CartOp::SetQuantity(id, q)),
            1 => Just(CartOp::Clear),
        ],
        0..max_ops,
    )
}

fn new_cart(store: Arc<MemoryStore>) -> CartStore<Arc<MemoryStore>> {
    CartStore::open(store, Arc::new(Silent))
}

fn apply(cart: &mut impl Cart, op: &CartOp) {
    match op {
        CartOp::Add(product, quantity) => {
            cart.add_item(product, *quantity);
        }
        CartOp::Remove(id) => cart.remove_item(&ProductId::Number(*id)),
        CartOp::SetQuantity(id, quantity) => cart.set_quantity(&ProductId::Number(*id), *quantity),
        CartOp::Clear => cart.clear(),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Each distinct product added once contributes exactly one unit
    #[test]
    fn distinct_adds_count_once_each(ids in prop::collection::hash_set(any::<i64>(), 0..30)) {
        let mut cart = new_cart(Arc::new(MemoryStore::new()));
        for id in &ids {
            cart.add_item(&Product::new(*id, "Lunettes", 1000), 1);
        }
        prop_assert_eq!(cart.item_count() as usize, ids.len());
        prop_assert_eq!(cart.items().len(), ids.len());
    }

    /// Re-adding a product always increments by one, whatever quantity is asked
    #[test]
    fn repeated_add_increments_by_one(requested in prop::collection::vec(0u32..1000, 1..20)) {
        let mut cart = new_cart(Arc::new(MemoryStore::new()));
        let product = Product::new(1, "Ray-Ban", 85_000);

        for (i, quantity) in requested.iter().enumerate() {
            let resulting = cart.add_item(&product, *quantity);
            prop_assert_eq!(resulting as usize, i + 1);
        }
        prop_assert_eq!(cart.items().len(), 1);
    }

    /// Removing a product that is not in the cart changes nothing
    #[test]
    fn remove_non_member_is_noop(ops in cart_ops_strategy(30)) {
        let mut cart = new_cart(Arc::new(MemoryStore::new()));
        for op in &ops {
            apply(&mut cart, op);
        }
        let before: Vec<LineItem> = cart.items().to_vec();

        cart.remove_item(&ProductId::Number(999));
        prop_assert_eq!(cart.items(), before.as_slice());
    }

    /// Setting a quantity below one removes the product
    #[test]
    fn non_positive_quantity_removes(ops in cart_ops_strategy(30), id in 0i64..8, quantity in -5i64..1) {
        let mut cart = new_cart(Arc::new(MemoryStore::new()));
        for op in &ops {
            apply(&mut cart, op);
        }

        cart.set_quantity(&ProductId::Number(id), quantity);
        prop_assert!(!cart.contains(&ProductId::Number(id)));
    }

    /// Ids stay unique and quantities positive; storage mirrors memory
    #[test]
    fn invariants_hold_after_any_sequence(ops in cart_ops_strategy(60)) {
        let store = Arc::new(MemoryStore::new());
        let mut cart = new_cart(store.clone());

        for op in &ops {
            apply(&mut cart, op);

            let mut seen = HashSet::new();
            for item in cart.items() {
                prop_assert!(seen.insert(item.id.clone()), "duplicate id {}", item.id);
                prop_assert!(item.quantity >= 1);
                prop_assert!(item.discount_percent <= 100);
            }

            if let Some(raw) = store.raw(DEFAULT_STORAGE_KEY) {
                let persisted: Vec<LineItem> = serde_json::from_str(&raw).unwrap();
                prop_assert_eq!(persisted.as_slice(), cart.items());
            }
        }
    }

    /// Reloading from storage yields the same cart
    #[test]
    fn reload_round_trip(ops in cart_ops_strategy(40)) {
        let store = Arc::new(MemoryStore::new());
        let mut cart = new_cart(store.clone());
        for op in &ops {
            apply(&mut cart, op);
        }

        let reloaded = new_cart(store);
        prop_assert_eq!(reloaded.items(), cart.items());
        prop_assert_eq!(reloaded.item_count(), cart.item_count());
    }

    /// The total is the sum of discounted line totals
    #[test]
    fn total_matches_line_totals(ops in cart_ops_strategy(40)) {
        let mut cart = new_cart(Arc::new(MemoryStore::new()));
        for op in &ops {
            apply(&mut cart, op);
        }

        let expected: f64 = cart
            .items()
            .iter()
            .map(|i| {
                let unit = if i.discount_percent > 0 {
                    i.unit_price as f64 * (1.0 - f64::from(i.discount_percent) / 100.0)
                } else {
                    i.unit_price as f64
                };
                unit * f64::from(i.quantity)
            })
            .sum();
        prop_assert!((cart.total() - expected).abs() < 1e-6);
        prop_assert!((cart.view().total - expected).abs() < 1e-6);
    }
}
