//! Order lifecycle manager: the synchronous, in-memory core.
//!
//! Owns the session's cart and the order history. Every mutation takes `&mut self`
//! and runs to completion without suspending, so turning a cart into an order
//! (allocate id, copy lines, record, clear cart) is one indivisible step for any
//! caller that serializes access, as [`crate::service::OrderService`] does.

use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::cart::{Cart, CartSnapshot};
use crate::error::OrderError;
use crate::history::{OrderHistory, OrderStats};
use crate::lifecycle::TransitionPolicy;
use crate::types::{CustomerDetails, LineItem, Order, OrderId, OrderStatus, Product, ProductId};

/// Cart plus order history for one customer session.
///
/// Use the cart methods to build a draft, [`OrderManager::create_order`] to place it,
/// and [`OrderManager::update_status`] / [`OrderManager::cancel_order`] to move
/// placed orders through their lifecycle.
#[derive(Debug, Default)]
pub struct OrderManager {
    cart: Cart,
    history: OrderHistory,
    policy: TransitionPolicy,
}

impl OrderManager {
    /// Empty cart, empty history, strict transitions.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TransitionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn history(&self) -> &OrderHistory {
        &self.history
    }

    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        self.cart.add_item(product, quantity);
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> bool {
        self.cart.remove_item(product_id)
    }

    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        self.cart.update_quantity(product_id, quantity)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn cart_items(&self) -> Vec<LineItem> {
        self.cart.items()
    }

    pub fn cart_total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn cart_item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn cart_snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// Places the cart as a new `Pending` order and empties the cart.
    ///
    /// Returns `Err` and changes nothing if the cart is empty or a customer field
    /// is blank.
    pub fn create_order(&mut self, customer: CustomerDetails) -> Result<Order, OrderError> {
        if self.cart.is_empty() {
            debug!("order rejected: cart is empty");
            return Err(OrderError::EmptyCart);
        }
        customer.validate()?;
        let id = self.history.next_id()?;
        let order = Order::new(id, customer, self.cart.take_items(), Utc::now());
        info!(
            "order created order_id={} lines={} items={} total={}",
            id,
            order.items().len(),
            order.item_count(),
            order.total_amount()
        );
        self.history.push(order.clone());
        Ok(order)
    }

    /// Moves an order to `status`, subject to the transition policy.
    /// Returns the previous status.
    pub fn update_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderError> {
        let policy = self.policy;
        let order = self
            .history
            .get_mut(order_id)
            .ok_or(OrderError::NotFound(order_id))?;
        let from = order.status();
        if !policy.allows(from, status) {
            debug!(
                "status change rejected order_id={} from={} to={}",
                order_id, from, status
            );
            return Err(OrderError::IllegalTransition {
                order_id,
                from,
                to: status,
            });
        }
        order.set_status(status);
        info!("order status changed order_id={} from={} to={}", order_id, from, status);
        Ok(from)
    }

    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<OrderStatus, OrderError> {
        self.update_status(order_id, OrderStatus::Cancelled)
    }

    /// Records an order created outside this session (e.g. by a client of the
    /// remote order resource). The cart is not touched.
    pub fn import_order(&mut self, order: Order) -> Result<(), OrderError> {
        order.validate()?;
        let id = order.id();
        self.history.insert(order)?;
        info!("order imported order_id={}", id);
        Ok(())
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.history.get(order_id)
    }

    /// Every order, newest first.
    pub fn order_history(&self) -> Vec<Order> {
        self.history.newest_first()
    }

    pub fn recent_orders(&self, n: usize) -> Vec<Order> {
        self.history.recent(n)
    }

    pub fn total_orders_count(&self) -> usize {
        self.history.len()
    }

    /// Sum of every order's total, cancelled orders included.
    pub fn total_spent(&self) -> Decimal {
        self.history.total_spent()
    }

    pub fn total_spent_excluding_cancelled(&self) -> Decimal {
        self.history.total_spent_excluding_cancelled()
    }

    pub fn stats(&self) -> OrderStats {
        self.history.stats()
    }
}
