//! Single-session cart: at most one line per product, in insertion order.
//!
//! Adding a product that is already in the cart merges into its line; updating a
//! quantity replaces it, and a quantity of zero or less removes the line. Reads hand
//! out immutable views or owned snapshots, so nothing outside this module can break
//! the one-line-per-product rule.

use log::debug;
use rust_decimal::Decimal;

use crate::types::{LineItem, Product, ProductId};

/// Cart contents plus derived totals, captured in one read.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub item_count: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `quantity` units of `product` into the cart.
    ///
    /// An existing line keeps the unit price it was created with. A zero quantity
    /// changes nothing. No stock check happens here.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!("cart add ignored product_id={} quantity=0", product.id);
            return;
        }
        match self.position(product.id) {
            Some(i) => {
                let line = &mut self.items[i];
                let merged = line.quantity().saturating_add(quantity);
                line.set_quantity(merged);
                debug!("cart merge product_id={} quantity={}", product.id, merged);
            }
            None => {
                self.items.push(LineItem::new(product, quantity));
                debug!(
                    "cart add product_id={} quantity={} unit_price={}",
                    product.id, quantity, product.price
                );
            }
        }
    }

    /// Remove the line for `product_id`. Returns true if a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let Some(i) = self.position(product_id) else {
            return false;
        };
        self.items.remove(i);
        debug!("cart remove product_id={}", product_id);
        true
    }

    /// Set the line's quantity to exactly `quantity`; zero or less removes it.
    /// Returns true if the product was in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        let Some(i) = self.position(product_id) else {
            return false;
        };
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.items[i].set_quantity(quantity);
        debug!("cart update product_id={} quantity={}", product_id, quantity);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Owned copy of the current lines.
    pub fn items(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Sum of quantities, not the number of lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity())).sum()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items(),
            total: self.total(),
            item_count: self.item_count(),
        }
    }

    /// Move every line out, leaving the cart empty.
    pub(crate) fn take_items(&mut self) -> Vec<LineItem> {
        std::mem::take(&mut self.items)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items.iter().position(|i| i.product_id() == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryId;
    use std::str::FromStr;

    fn product(id: u64, price: &str) -> Product {
        Product {
            id: ProductId(id),
            name: format!("p{}", id),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            category_id: CategoryId(1),
            stock_quantity: 10,
            image_url: String::new(),
        }
    }

    #[test]
    fn adding_same_product_twice_merges_and_keeps_first_price() {
        let mut cart = Cart::new();
        let mut p = product(1, "8.50");
        cart.add_item(&p, 2);
        p.price = Decimal::from(20);
        cart.add_item(&p, 3);
        assert_eq!(cart.len(), 1);
        let line = cart.get(ProductId(1)).unwrap();
        assert_eq!(line.quantity(), 5);
        assert_eq!(line.unit_price(), Decimal::from_str("8.50").unwrap());
    }

    #[test]
    fn add_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "1"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_to_zero_or_negative_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "1"), 2);
        cart.add_item(&product(2, "1"), 2);
        assert!(cart.update_quantity(ProductId(1), 0));
        assert!(cart.update_quantity(ProductId(2), -5));
        assert!(cart.is_empty());
    }

    #[test]
    fn update_replaces_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "2"), 2);
        assert!(cart.update_quantity(ProductId(1), 7));
        assert_eq!(cart.get(ProductId(1)).unwrap().quantity(), 7);
        assert_eq!(cart.total(), Decimal::from(14));
    }

    #[test]
    fn update_or_remove_absent_product_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "2"), 2);
        let before = cart.items();
        assert!(!cart.update_quantity(ProductId(9), 3));
        assert!(!cart.remove_item(ProductId(9)));
        assert_eq!(cart.items(), before);
    }

    #[test]
    fn totals_and_item_count() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "8.50"), 2);
        cart.add_item(&product(2, "6.75"), 1);
        assert_eq!(cart.total(), Decimal::from_str("23.75").unwrap());
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.len(), 2);
        let snap = cart.snapshot();
        assert_eq!(snap.total, cart.total());
        assert_eq!(snap.item_count, 3);
    }

    #[test]
    fn single_line_reports_quantity_as_count() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "1"), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn snapshot_is_detached_from_cart() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "1"), 1);
        let snap = cart.items();
        cart.update_quantity(ProductId(1), 4);
        assert_eq!(snap[0].quantity(), 1);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut cart = Cart::new();
        for id in [3, 1, 2] {
            cart.add_item(&product(id, "1"), 1);
        }
        cart.add_item(&product(1, "1"), 1);
        let ids: Vec<u64> = cart.iter().map(|i| i.product_id().0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn take_items_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, "1"), 1);
        let taken = cart.take_items();
        assert_eq!(taken.len(), 1);
        assert!(cart.is_empty());
    }
}
