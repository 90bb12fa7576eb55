//! Append-only order history.
//!
//! Owns every placed order and allocates identifiers: the next id is one past the
//! largest id held, or [`FIRST_ORDER_ID`] when the history is empty. Views are
//! ordered newest first by creation time, ties broken by id.

use std::cmp::Reverse;

use rust_decimal::Decimal;

use crate::error::OrderError;
use crate::types::{Order, OrderId, OrderStatus};

/// Id given to the first order of an empty history.
pub const FIRST_ORDER_ID: OrderId = OrderId(1001);

/// Default size of the recent-orders view.
pub const DEFAULT_RECENT_ORDERS: usize = 5;

/// Aggregates over the whole history.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderStats {
    pub total_orders: usize,
    /// Includes cancelled orders.
    pub total_spent: Decimal,
    pub total_spent_excluding_cancelled: Decimal,
}

#[derive(Clone, Debug, Default)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails once the largest id held is `u64::MAX`; ids never wrap.
    pub fn next_id(&self) -> Result<OrderId, OrderError> {
        match self.orders.iter().map(Order::id).max() {
            None => Ok(FIRST_ORDER_ID),
            Some(OrderId(max)) => max
                .checked_add(1)
                .map(OrderId)
                .ok_or(OrderError::IdOutOfRange(OrderId(max))),
        }
    }

    /// Append an order whose id came from [`OrderHistory::next_id`].
    pub(crate) fn push(&mut self, order: Order) {
        self.orders.push(order);
    }

    /// Append an order built elsewhere. Its id must not be taken and must leave
    /// room for the next allocated id.
    pub(crate) fn insert(&mut self, order: Order) -> Result<(), OrderError> {
        if order.id().0 == u64::MAX {
            return Err(OrderError::IdOutOfRange(order.id()));
        }
        if self.contains(order.id()) {
            return Err(OrderError::DuplicateOrder(order.id()));
        }
        self.orders.push(order);
        Ok(())
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.iter().any(|o| o.id() == id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id() == id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// All orders, newest first.
    pub fn newest_first(&self) -> Vec<Order> {
        let mut orders = self.orders.clone();
        orders.sort_by_key(|o| Reverse((o.created_at(), o.id())));
        orders
    }

    /// At most `n` orders, newest first.
    pub fn recent(&self, n: usize) -> Vec<Order> {
        let mut orders = self.newest_first();
        orders.truncate(n);
        orders
    }

    pub fn total_spent(&self) -> Decimal {
        self.orders.iter().map(Order::total_amount).sum()
    }

    pub fn total_spent_excluding_cancelled(&self) -> Decimal {
        self.orders
            .iter()
            .filter(|o| o.status() != OrderStatus::Cancelled)
            .map(Order::total_amount)
            .sum()
    }

    pub fn stats(&self) -> OrderStats {
        OrderStats {
            total_orders: self.len(),
            total_spent: self.total_spent(),
            total_spent_excluding_cancelled: self.total_spent_excluding_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryId, CustomerDetails, LineItem, Product, ProductId};
    use chrono::{Duration, TimeZone, Utc};

    fn order(id: u64, minutes: i64, price: i64) -> Order {
        let product = Product {
            id: ProductId(1),
            name: "p".into(),
            description: String::new(),
            price: Decimal::from(price),
            category_id: CategoryId(1),
            stock_quantity: 1,
            image_url: String::new(),
        };
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        Order::new(
            OrderId(id),
            CustomerDetails::new("Jan", "jan@x.com", "Main St 1"),
            vec![LineItem::new(&product, 1)],
            base + Duration::minutes(minutes),
        )
    }

    #[test]
    fn first_id_is_seed_then_max_plus_one() {
        let mut history = OrderHistory::new();
        assert_eq!(history.next_id(), Ok(FIRST_ORDER_ID));
        history.push(order(1001, 0, 1));
        assert_eq!(history.next_id(), Ok(OrderId(1002)));
        history.insert(order(5000, 1, 1)).unwrap();
        assert_eq!(history.next_id(), Ok(OrderId(5001)));
    }

    #[test]
    fn insert_rejects_id_without_successor() {
        let mut history = OrderHistory::new();
        let err = history.insert(order(u64::MAX, 0, 1)).unwrap_err();
        assert_eq!(err, OrderError::IdOutOfRange(OrderId(u64::MAX)));
        assert!(history.is_empty());
        history.insert(order(u64::MAX - 1, 0, 1)).unwrap();
        assert_eq!(history.next_id(), Ok(OrderId(u64::MAX)));
    }

    #[test]
    fn next_id_never_wraps() {
        let mut history = OrderHistory::new();
        history.push(order(u64::MAX, 0, 1));
        assert_eq!(history.next_id(), Err(OrderError::IdOutOfRange(OrderId(u64::MAX))));
    }

    #[test]
    fn insert_rejects_taken_id() {
        let mut history = OrderHistory::new();
        history.push(order(1001, 0, 1));
        let err = history.insert(order(1001, 1, 1)).unwrap_err();
        assert_eq!(err, OrderError::DuplicateOrder(OrderId(1001)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn newest_first_sorts_by_time_then_id() {
        let mut history = OrderHistory::new();
        history.push(order(1001, 5, 1));
        history.push(order(1002, 10, 1));
        history.push(order(1003, 10, 1));
        history.push(order(1004, 1, 1));
        let ids: Vec<u64> = history.newest_first().iter().map(|o| o.id().0).collect();
        assert_eq!(ids, vec![1003, 1002, 1001, 1004]);
        let recent: Vec<u64> = history.recent(2).iter().map(|o| o.id().0).collect();
        assert_eq!(recent, vec![1003, 1002]);
        assert_eq!(history.recent(10).len(), 4);
    }

    #[test]
    fn spend_with_and_without_cancelled() {
        let mut history = OrderHistory::new();
        history.push(order(1001, 0, 10));
        history.push(order(1002, 1, 5));
        history.get_mut(OrderId(1002)).unwrap().set_status(OrderStatus::Cancelled);
        let stats = history.stats();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_spent, Decimal::from(15));
        assert_eq!(stats.total_spent_excluding_cancelled, Decimal::from(10));
    }
}
